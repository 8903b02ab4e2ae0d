//! Host-side turn model for bot invoke handling.
//!
//! A host decodes the transport payload into an [`InboundActivity`], wraps it
//! in a [`TurnContext`] together with an [`ActivitySender`], and drives it
//! through a [`MiddlewareSet`]. Middleware answer invoke requests by sending
//! an [`OutboundActivity::InvokeResponse`].

pub mod activity;
pub mod context;
pub mod error;
pub mod middleware;

pub use {
    activity::{INVOKE, INVOKE_RESPONSE, InboundActivity, InvokeResponse, OutboundActivity},
    context::{ActivitySender, BufferedSender, TurnContext},
    error::{Error, Result},
    middleware::{Middleware, MiddlewareSet, Next, NoopHandler, TurnHandler},
};
