//! Route table of the invoke router.
//!
//! Classification maps an activity name (plus the preview discriminant for
//! `composeExtension/submitAction`) to a [`RouteKey`]; each key carries a
//! static [`RouteDescriptor`] saying how it is guarded, how its success
//! body is shaped, and whether the chain continues afterwards.

use std::fmt;

use serde_json::Value;

use crate::models::BotMessagePreviewAction;

/// Activity names of the invoke sub-protocol.
pub mod names {
    pub const QUERY: &str = "composeExtension/query";
    pub const QUERY_SETTING_URL: &str = "composeExtension/querySettingUrl";
    pub const SETTING: &str = "composeExtension/setting";
    pub const QUERY_LINK: &str = "composeExtension/queryLink";
    pub const SUBMIT_ACTION: &str = "composeExtension/submitAction";
    pub const FETCH_TASK: &str = "composeExtension/fetchTask";
    /// Emitted instead of [`FETCH_TASK`] when a fetch resumes after a
    /// config or auth flow.
    pub const TASK_FETCH: &str = "task/fetch";
    pub const CARD_BUTTON_CLICKED: &str = "composeExtension/onCardButtonClicked";
    pub const SELECT_ITEM: &str = "composeExtension/selectItem";
    pub const ADAPTIVE_CARD_ACTION: &str = "adaptiveCard/action";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKey {
    Query,
    QuerySettingUrl,
    Setting,
    QueryLink,
    SubmitAction,
    BotMessagePreviewEdit,
    BotMessagePreviewSend,
    FetchTask,
    CardButtonClicked,
    SelectItem,
    ActionExecute,
}

/// Which payloads a route accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Payload `commandId` must pass the router's command filter.
    CommandId,
    /// Every payload is accepted.
    Unfiltered,
}

/// How a capability's successful result becomes the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyShape {
    /// `{ "composeExtension": result }`
    ComposeExtension,
    /// `{ "composeExtension": { "type": "config", "suggestedActions": { "actions": [{ "type": "openApp", ..result }] } } }`
    SettingsConfig,
    /// No body.
    Empty,
    /// `{ "task": result }`
    Task,
    /// `result` as is.
    Unwrapped,
    /// `{ "task": result }` for `continue`/`message` results, otherwise
    /// `{ "composeExtension": result }`.
    TaskOrComposeExtension,
}

/// What happens to the rest of the chain once a route answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Terminal,
    ContinueChain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub guard: Guard,
    pub body: BodyShape,
    pub dispatch: Dispatch,
}

impl RouteKey {
    pub const ALL: &'static [RouteKey] = &[
        Self::Query,
        Self::QuerySettingUrl,
        Self::Setting,
        Self::QueryLink,
        Self::SubmitAction,
        Self::BotMessagePreviewEdit,
        Self::BotMessagePreviewSend,
        Self::FetchTask,
        Self::CardButtonClicked,
        Self::SelectItem,
        Self::ActionExecute,
    ];

    /// Pick the route for an activity, or `None` when the name is not part
    /// of the sub-protocol.
    pub fn classify(name: &str, payload: Option<&Value>) -> Option<Self> {
        let route = match name {
            names::QUERY => Self::Query,
            names::QUERY_SETTING_URL => Self::QuerySettingUrl,
            names::SETTING => Self::Setting,
            names::QUERY_LINK => Self::QueryLink,
            names::SUBMIT_ACTION => {
                let preview = payload
                    .and_then(|p| p.get("botMessagePreviewAction"))
                    .and_then(Value::as_str)
                    .and_then(BotMessagePreviewAction::parse);
                match preview {
                    Some(BotMessagePreviewAction::Edit) => Self::BotMessagePreviewEdit,
                    Some(BotMessagePreviewAction::Send) => Self::BotMessagePreviewSend,
                    None => Self::SubmitAction,
                }
            },
            names::FETCH_TASK | names::TASK_FETCH => Self::FetchTask,
            names::CARD_BUTTON_CLICKED => Self::CardButtonClicked,
            names::SELECT_ITEM => Self::SelectItem,
            names::ADAPTIVE_CARD_ACTION => Self::ActionExecute,
            _ => return None,
        };
        Some(route)
    }

    /// Canonical activity name of the route.
    pub fn activity_name(self) -> &'static str {
        match self {
            Self::Query => names::QUERY,
            Self::QuerySettingUrl => names::QUERY_SETTING_URL,
            Self::Setting => names::SETTING,
            Self::QueryLink => names::QUERY_LINK,
            Self::SubmitAction | Self::BotMessagePreviewEdit | Self::BotMessagePreviewSend => {
                names::SUBMIT_ACTION
            },
            Self::FetchTask => names::FETCH_TASK,
            Self::CardButtonClicked => names::CARD_BUTTON_CLICKED,
            Self::SelectItem => names::SELECT_ITEM,
            Self::ActionExecute => names::ADAPTIVE_CARD_ACTION,
        }
    }

    /// Name of the capability the route invokes.
    pub fn capability(self) -> &'static str {
        match self {
            Self::Query => "onQuery",
            Self::QuerySettingUrl => "onQuerySettingsUrl",
            Self::Setting => "onSettings",
            Self::QueryLink => "onQueryLink",
            Self::SubmitAction => "onSubmitAction",
            Self::BotMessagePreviewEdit => "onBotMessagePreviewEdit",
            Self::BotMessagePreviewSend => "onBotMessagePreviewSend",
            Self::FetchTask => "onFetchTask",
            Self::CardButtonClicked => "onCardButtonClicked",
            Self::SelectItem => "onSelectItem",
            Self::ActionExecute => "onActionExecute",
        }
    }

    pub const fn descriptor(self) -> RouteDescriptor {
        use {BodyShape::*, Dispatch::*, Guard::*};

        let (guard, body, dispatch) = match self {
            Self::Query => (CommandId, ComposeExtension, Terminal),
            Self::QuerySettingUrl => (CommandId, SettingsConfig, Terminal),
            Self::Setting => (CommandId, Empty, Terminal),
            Self::QueryLink => (Unfiltered, ComposeExtension, Terminal),
            Self::SubmitAction => (CommandId, ComposeExtension, Terminal),
            Self::BotMessagePreviewEdit => (CommandId, Task, Terminal),
            Self::BotMessagePreviewSend => (CommandId, Unwrapped, Terminal),
            Self::FetchTask => (CommandId, TaskOrComposeExtension, Terminal),
            // Answers the invoke and still lets later middleware see the click.
            Self::CardButtonClicked => (Unfiltered, Empty, ContinueChain),
            Self::SelectItem => (Unfiltered, ComposeExtension, Terminal),
            Self::ActionExecute => (Unfiltered, Unwrapped, Terminal),
        };
        RouteDescriptor {
            guard,
            body,
            dispatch,
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.capability())
    }
}
