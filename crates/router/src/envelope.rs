//! Invoke response envelopes.
//!
//! Pure functions: a capability outcome plus the route's [`BodyShape`] in,
//! an `invokeResponse` activity out.

use {
    msgext_turn::{InvokeResponse, OutboundActivity},
    serde_json::{Map, Value, json},
};

use crate::{
    error::{CapabilityError, CapabilityResult},
    route::BodyShape,
};

/// Envelope for either outcome of a capability call.
pub fn build(shape: BodyShape, outcome: CapabilityResult<Value>) -> OutboundActivity {
    match outcome {
        Ok(result) => success(shape, result),
        Err(err) => failure(err),
    }
}

/// Status 200 envelope around the shaped result.
pub fn success(shape: BodyShape, result: Value) -> OutboundActivity {
    OutboundActivity::invoke_response(InvokeResponse::ok(success_body(shape, result)))
}

/// Status 500 envelope echoing the failure value.
pub fn failure(err: CapabilityError) -> OutboundActivity {
    OutboundActivity::invoke_response(InvokeResponse::failed(err.into_body()))
}

pub fn success_body(shape: BodyShape, result: Value) -> Option<Value> {
    match shape {
        BodyShape::ComposeExtension => Some(json!({ "composeExtension": result })),
        BodyShape::SettingsConfig => Some(json!({
            "composeExtension": {
                "type": "config",
                "suggestedActions": { "actions": [open_app_action(result)] },
            }
        })),
        BodyShape::Empty => None,
        BodyShape::Task => Some(json!({ "task": result })),
        BodyShape::Unwrapped => Some(result),
        BodyShape::TaskOrComposeExtension => {
            let is_task = matches!(
                result.get("type").and_then(Value::as_str),
                Some("continue" | "message")
            );
            if is_task {
                Some(json!({ "task": result }))
            } else {
                Some(json!({ "composeExtension": result }))
            }
        },
    }
}

/// `{ "type": "openApp" }` overlaid with the fields of `result`.
fn open_app_action(result: Value) -> Value {
    let mut action = Map::new();
    action.insert("type".into(), Value::String("openApp".into()));
    if let Value::Object(fields) = result {
        action.extend(fields);
    }
    Value::Object(action)
}
