//! Router for messaging-extension invoke activities.
//!
//! An [`ActivityRouter`] sits in a bot's middleware chain. For every invoke
//! activity it picks a route from the activity name, checks the payload's
//! `commandId` against its filter, calls the matching capability from its
//! [`CapabilitySet`], and answers with an `invokeResponse` envelope:
//!
//! | activity name | capability | success body |
//! |---|---|---|
//! | `composeExtension/query` | `on_query` | `{ composeExtension: result }` |
//! | `composeExtension/querySettingUrl` | `on_query_settings_url` | config result with an `openApp` action |
//! | `composeExtension/setting` | `on_settings` | none |
//! | `composeExtension/queryLink` | `on_query_link` | `{ composeExtension: result }` |
//! | `composeExtension/submitAction` | `on_submit_action` | `{ composeExtension: result }` |
//! | `composeExtension/submitAction` (`edit`) | `on_bot_message_preview_edit` | `{ task: result }` |
//! | `composeExtension/submitAction` (`send`) | `on_bot_message_preview_send` | `result` |
//! | `composeExtension/fetchTask`, `task/fetch` | `on_fetch_task` | `{ task: result }` or `{ composeExtension: result }` |
//! | `composeExtension/onCardButtonClicked` | `on_card_button_clicked` | none, chain continues |
//! | `composeExtension/selectItem` | `on_select_item` | `{ composeExtension: result }` |
//! | `adaptiveCard/action` | `on_action_execute` | `result` |
//!
//! Capability failures are answered with status 500 and the failure value
//! as body. Anything the router does not answer is passed to the next
//! middleware.

pub mod capability;
pub mod config;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod models;
pub mod observe;
pub mod route;
pub mod router;

pub use {
    capability::CapabilitySet,
    config::MessagingExtensionConfig,
    error::{CapabilityError, CapabilityResult, Error, Result},
    filter::CommandFilter,
    observe::{NoopObserver, TracingObserver, TurnObserver},
    route::RouteKey,
    router::{ActivityRouter, RouteOutcome},
};
