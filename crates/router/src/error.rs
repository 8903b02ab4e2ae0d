use std::error::Error as StdError;

use serde_json::Value;

use crate::route::RouteKey;

/// Crate-wide result type for router operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result of a single capability call.
pub type CapabilityResult<T> = std::result::Result<T, CapabilityError>;

/// Errors the router itself cannot turn into an invoke response.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The activity payload does not decode into the route's payload model.
    #[error("malformed {route} payload: {source}")]
    MalformedPayload {
        route: RouteKey,
        #[source]
        source: serde_json::Error,
    },

    /// Router configuration could not be parsed.
    #[error("invalid router configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The host failed while sending or running the rest of the chain.
    #[error(transparent)]
    Turn(#[from] msgext_turn::Error),

    /// JSON (de)serialization failed.
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

/// Failure value produced by a capability.
///
/// The body is echoed verbatim as the `body` of a status 500 invoke
/// response, whatever JSON shape the capability chose.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("capability failed: {body}")]
pub struct CapabilityError {
    body: Value,
}

impl CapabilityError {
    #[must_use]
    pub fn new(body: impl Into<Value>) -> Self {
        Self { body: body.into() }
    }

    /// Capture an error's message as a string body.
    #[must_use]
    pub fn from_error(err: impl StdError) -> Self {
        Self::new(err.to_string())
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }
}

impl From<Value> for CapabilityError {
    fn from(body: Value) -> Self {
        Self { body }
    }
}

impl From<&str> for CapabilityError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for CapabilityError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<anyhow::Error> for CapabilityError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{err:#}"))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn bodies_pass_through_unchanged() {
        assert_eq!(CapabilityError::from("error").body(), &json!("error"));
        assert_eq!(
            CapabilityError::from(json!({ "code": 42 })).into_body(),
            json!({ "code": 42 })
        );
        assert_eq!(CapabilityError::new(json!(null)).body(), &Value::Null);
    }

    #[test]
    fn errors_become_their_message() {
        let err = CapabilityError::from_error(std::io::Error::other("disk gone"));
        assert_eq!(err.body(), &json!("disk gone"));

        let err = CapabilityError::from(anyhow::anyhow!("inner").context("outer"));
        assert_eq!(err.body(), &json!("outer: inner"));
        assert_eq!(err.to_string(), "capability failed: \"outer: inner\"");
    }
}
