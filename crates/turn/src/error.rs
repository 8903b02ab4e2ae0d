use std::error::Error as StdError;

/// Crate-wide result type for turn operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors raised by the host side of a turn.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The host failed to deliver an outbound activity.
    #[error("failed to send activity: {context}: {source}")]
    Send {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// A middleware in the chain failed.
    #[error("middleware {name} failed: {source}")]
    Middleware {
        name: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// The terminal turn handler failed.
    #[error("turn handler failed: {message}")]
    Handler { message: String },

    /// JSON (de)serialization failed.
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn send(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Send {
            context: context.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn middleware(
        name: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Middleware {
            name: name.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn handler(message: impl std::fmt::Display) -> Self {
        Self::Handler {
            message: message.to_string(),
        }
    }
}
