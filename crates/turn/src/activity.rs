use {
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

use crate::Result;

/// Activity type carried by every invoke request.
pub const INVOKE: &str = "invoke";

/// Activity type of the envelope that answers an invoke request.
pub const INVOKE_RESPONSE: &str = "invokeResponse";

/// An inbound activity as delivered by the host transport.
///
/// Only the fields invoke routing reads are decoded; everything else the
/// transport sends is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InboundActivity {
    #[serde(rename = "type")]
    pub activity_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Default for InboundActivity {
    fn default() -> Self {
        Self {
            activity_type: INVOKE.into(),
            name: None,
            value: None,
        }
    }
}

impl InboundActivity {
    /// Build an invoke activity with the given name and payload.
    pub fn invoke(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value),
            ..Self::default()
        }
    }

    /// Decode an activity from the raw JSON posted by the transport.
    pub fn from_json(payload: Value) -> Result<Self> {
        Ok(serde_json::from_value(payload)?)
    }
}

/// Body and status of an invoke response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    pub status: u16,
}

impl InvokeResponse {
    pub const STATUS_OK: u16 = 200;
    pub const STATUS_FAILED: u16 = 500;

    pub fn ok(body: Option<Value>) -> Self {
        Self {
            body,
            status: Self::STATUS_OK,
        }
    }

    /// A failed response echoing `body` untouched.
    pub fn failed(body: Value) -> Self {
        Self {
            body: Some(body),
            status: Self::STATUS_FAILED,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Self::STATUS_OK
    }
}

/// An activity handed to the host for delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundActivity {
    InvokeResponse { value: InvokeResponse },
}

impl OutboundActivity {
    pub fn invoke_response(value: InvokeResponse) -> Self {
        Self::InvokeResponse { value }
    }

    pub fn as_invoke_response(&self) -> Option<&InvokeResponse> {
        match self {
            Self::InvokeResponse { value } => Some(value),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn decodes_transport_payload() {
        let activity = InboundActivity::from_json(json!({
            "type": "invoke",
            "id": "a-1",
            "name": "composeExtension/query",
            "value": { "commandId": "search" },
            "channelId": "msteams",
            "from": { "id": "29:abc" }
        }))
        .unwrap();

        assert_eq!(activity, InboundActivity::invoke(
            "composeExtension/query",
            json!({ "commandId": "search" })
        ));
    }

    #[test]
    fn null_value_is_absent() {
        let activity =
            InboundActivity::from_json(json!({ "name": "task/fetch", "value": null })).unwrap();
        assert_eq!(activity.activity_type, INVOKE);
        assert!(activity.value.is_none());
    }

    #[test]
    fn invoke_response_wire_shape() {
        let ok = OutboundActivity::invoke_response(InvokeResponse::ok(Some(json!({ "a": 1 }))));
        assert_eq!(serde_json::to_value(&ok).unwrap()["type"], INVOKE_RESPONSE);
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({ "type": "invokeResponse", "value": { "body": { "a": 1 }, "status": 200 } })
        );

        let empty = OutboundActivity::invoke_response(InvokeResponse::ok(None));
        assert_eq!(
            serde_json::to_value(&empty).unwrap(),
            json!({ "type": "invokeResponse", "value": { "status": 200 } })
        );

        let failed = OutboundActivity::invoke_response(InvokeResponse::failed(json!("error")));
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({ "type": "invokeResponse", "value": { "body": "error", "status": 500 } })
        );
    }
}
