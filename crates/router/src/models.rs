//! Payload and result models of the messaging-extension invoke protocol.
//!
//! Every model tolerates missing or `null` fields on input and omits empty
//! ones on output, so payloads from older clients still decode. Payload
//! models keep the fields they do not model in `extra`, so a capability
//! sees everything the client sent.

use {
    serde::{Deserialize, Deserializer, Serialize},
    serde_json::{Map, Value},
};

fn null_as_default<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: Default + Deserialize<'de>,
    D: Deserializer<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Inbound payloads ────────────────────────────────────────────────────────

/// Payload of `composeExtension/query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MessagingExtensionQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
    #[serde(
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub parameters: Vec<MessagingExtensionParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_options: Option<QueryOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MessagingExtensionQuery {
    /// Value of the named query parameter.
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingExtensionParameter {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub value: Value,
}

/// Paging window requested by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

/// Payload of `composeExtension/queryLink`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppBasedLinkQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of `composeExtension/submitAction` and `composeExtension/fetchTask`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MessagingExtensionAction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_message_preview_action: Option<String>,
    #[serde(
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub bot_activity_preview: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MessagingExtensionAction {
    pub fn preview_action(&self) -> Option<BotMessagePreviewAction> {
        self.bot_message_preview_action
            .as_deref()
            .and_then(BotMessagePreviewAction::parse)
    }
}

/// Secondary discriminant of `composeExtension/submitAction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotMessagePreviewAction {
    Edit,
    Send,
}

impl BotMessagePreviewAction {
    /// Exact, case-sensitive match on the wire value.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "edit" => Some(Self::Edit),
            "send" => Some(Self::Send),
            _ => None,
        }
    }
}

/// Payload of `adaptiveCard/action`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveCardRequestValue {
    #[serde(deserialize_with = "null_as_default")]
    pub action: AdaptiveCardInvokeAction,
    /// Raw trigger; see [`AdaptiveCardRequestValue::trigger`].
    #[serde(rename = "trigger", skip_serializing_if = "Option::is_none")]
    pub raw_trigger: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AdaptiveCardRequestValue {
    /// The trigger, when it is one the protocol defines.
    pub fn trigger(&self) -> Option<ActionTrigger> {
        self.raw_trigger.as_deref().and_then(ActionTrigger::parse)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveCardInvokeAction {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub action_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionTrigger {
    Automatic,
    Manual,
}

impl ActionTrigger {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "automatic" => Some(Self::Automatic),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

// ── Capability results ──────────────────────────────────────────────────────

/// Result shown in the compose extension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MessagingExtensionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_layout: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub result_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_actions: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_preview: Option<Value>,
}

impl MessagingExtensionResult {
    /// A `result` listing the given attachments.
    pub fn list(attachments: Vec<Value>) -> Self {
        Self {
            attachment_layout: Some("list".into()),
            result_type: Some("result".into()),
            attachments,
            ..Self::default()
        }
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self {
            result_type: Some("message".into()),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Ask the client to preview `activity` before the bot posts it.
    pub fn bot_message_preview(activity: Value) -> Self {
        Self {
            result_type: Some("botMessagePreview".into()),
            activity_preview: Some(activity),
            ..Self::default()
        }
    }
}

/// Where the client opens the extension's settings page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUrl {
    pub title: String,
    pub value: String,
}

/// Task module dialog definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskModuleTaskInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_bot_id: Option<String>,
}

/// Task module answer: open (or keep open) a dialog, or show a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TaskModuleResponse {
    Continue { value: TaskModuleTaskInfo },
    Message { value: String },
}

/// Result of a fetch-task capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FetchTaskResponse {
    Task(TaskModuleResponse),
    ComposeExtension(MessagingExtensionResult),
}

impl From<TaskModuleResponse> for FetchTaskResponse {
    fn from(response: TaskModuleResponse) -> Self {
        Self::Task(response)
    }
}

impl From<MessagingExtensionResult> for FetchTaskResponse {
    fn from(result: MessagingExtensionResult) -> Self {
        Self::ComposeExtension(result)
    }
}

/// Body returned from a universal action (`adaptiveCard/action`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AdaptiveCardResponseBody {
    #[serde(rename = "application/vnd.microsoft.card.adaptive")]
    AdaptiveCard {
        #[serde(rename = "statusCode")]
        status_code: u16,
        value: Value,
    },
    #[serde(rename = "application/vnd.microsoft.activity.message")]
    Message {
        #[serde(rename = "statusCode")]
        status_code: u16,
        value: String,
    },
    #[serde(rename = "application/vnd.microsoft.error")]
    InvalidRequest {
        #[serde(rename = "statusCode")]
        status_code: u16,
        value: Value,
    },
}

impl AdaptiveCardResponseBody {
    /// Replace the invoking card with `card`.
    pub fn card(card: Value) -> Self {
        Self::AdaptiveCard {
            status_code: 200,
            value: card,
        }
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self::Message {
            status_code: 200,
            value: text.into(),
        }
    }

    pub fn invalid_request(error: Value) -> Self {
        Self::InvalidRequest {
            status_code: 400,
            value: error,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn query_parameters() {
        let query: MessagingExtensionQuery = serde_json::from_value(json!({
            "commandId": "search",
            "parameters": [{ "name": "query", "value": "rust" }],
            "queryOptions": { "skip": 0, "count": 25 }
        }))
        .unwrap();

        assert_eq!(query.command_id.as_deref(), Some("search"));
        assert_eq!(query.parameter("query"), Some(&json!("rust")));
        assert_eq!(query.parameter("missing"), None);
        assert_eq!(query.query_options.unwrap().count, Some(25));
    }

    #[test]
    fn preview_action_is_case_sensitive() {
        let action = MessagingExtensionAction {
            bot_message_preview_action: Some("edit".into()),
            ..MessagingExtensionAction::default()
        };
        assert_eq!(action.preview_action(), Some(BotMessagePreviewAction::Edit));

        let action = MessagingExtensionAction {
            bot_message_preview_action: Some("Send".into()),
            ..MessagingExtensionAction::default()
        };
        assert_eq!(action.preview_action(), None);
    }

    #[test]
    fn result_omits_empty_fields() {
        assert_eq!(
            serde_json::to_value(MessagingExtensionResult::default()).unwrap(),
            json!({})
        );
        assert_eq!(
            serde_json::to_value(MessagingExtensionResult::message("hi")).unwrap(),
            json!({ "type": "message", "text": "hi" })
        );
        assert_eq!(
            serde_json::to_value(MessagingExtensionResult::list(vec![json!({ "a": 1 })])).unwrap(),
            json!({ "attachmentLayout": "list", "type": "result", "attachments": [{ "a": 1 }] })
        );
    }

    #[test]
    fn task_module_responses_are_tagged() {
        let response = TaskModuleResponse::Continue {
            value: TaskModuleTaskInfo {
                title: Some("Pick".into()),
                url: Some("https://example.com/pick".into()),
                ..TaskModuleTaskInfo::default()
            },
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "type": "continue", "value": { "title": "Pick", "url": "https://example.com/pick" } })
        );

        let fetch: FetchTaskResponse = TaskModuleResponse::Message {
            value: "done".into(),
        }
        .into();
        assert_eq!(
            serde_json::to_value(&fetch).unwrap(),
            json!({ "type": "message", "value": "done" })
        );
    }

    #[test]
    fn fetch_task_decodes_either_shape() {
        let task: FetchTaskResponse =
            serde_json::from_value(json!({ "type": "continue", "value": {} })).unwrap();
        assert!(matches!(task, FetchTaskResponse::Task(_)));

        let config: FetchTaskResponse =
            serde_json::from_value(json!({ "type": "config", "suggestedActions": {} })).unwrap();
        assert!(matches!(config, FetchTaskResponse::ComposeExtension(_)));
    }

    #[test]
    fn adaptive_card_bodies() {
        assert_eq!(
            serde_json::to_value(AdaptiveCardResponseBody::message("A message")).unwrap(),
            json!({
                "type": "application/vnd.microsoft.activity.message",
                "statusCode": 200,
                "value": "A message"
            })
        );
        assert_eq!(
            serde_json::to_value(AdaptiveCardResponseBody::invalid_request(json!({ "message": "bad" })))
                .unwrap(),
            json!({
                "type": "application/vnd.microsoft.error",
                "statusCode": 400,
                "value": { "message": "bad" }
            })
        );

        let request: AdaptiveCardRequestValue = serde_json::from_value(json!({
            "action": { "type": "Action.Execute", "verb": "approve", "data": { "id": 7 } },
            "trigger": "manual"
        }))
        .unwrap();
        assert_eq!(request.action.verb.as_deref(), Some("approve"));
        assert_eq!(request.trigger(), Some(ActionTrigger::Manual));
    }

    #[test]
    fn null_collections_decode_as_empty() {
        let query: MessagingExtensionQuery =
            serde_json::from_value(json!({ "commandId": "c", "parameters": null })).unwrap();
        assert!(query.parameters.is_empty());
        assert_eq!(query.command_id.as_deref(), Some("c"));

        let action: MessagingExtensionAction =
            serde_json::from_value(json!({ "botActivityPreview": null, "data": null })).unwrap();
        assert!(action.bot_activity_preview.is_empty());
        assert!(action.data.is_none());

        let request: AdaptiveCardRequestValue =
            serde_json::from_value(json!({ "action": null })).unwrap();
        assert_eq!(request.action, AdaptiveCardInvokeAction::default());
    }

    #[test]
    fn unknown_trigger_is_kept_raw() {
        let request: AdaptiveCardRequestValue = serde_json::from_value(json!({
            "action": { "type": "Action.Execute" },
            "trigger": "auto"
        }))
        .unwrap();
        assert_eq!(request.trigger(), None);
        assert_eq!(request.raw_trigger.as_deref(), Some("auto"));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "action": { "type": "Action.Execute" }, "trigger": "auto" })
        );
    }

    #[test]
    fn unmodelled_fields_are_kept() {
        let payload = json!({
            "url": "https://x",
            "commandId": "c",
            "locale": "en-US"
        });
        let query: AppBasedLinkQuery = serde_json::from_value(payload.clone()).unwrap();
        assert_eq!(query.url.as_deref(), Some("https://x"));
        assert_eq!(query.extra.get("locale"), Some(&json!("en-US")));
        assert_eq!(serde_json::to_value(&query).unwrap(), payload);

        let action: MessagingExtensionAction = serde_json::from_value(json!({
            "commandId": "c",
            "requestId": "r-1",
            "data": { "choice": 2 }
        }))
        .unwrap();
        assert_eq!(action.extra.get("requestId"), Some(&json!("r-1")));
        assert_eq!(action.data, Some(json!({ "choice": 2 })));
    }
}
