//! The optional capabilities a router can call.
//!
//! Each capability is an independently optional async function. An absent
//! capability is not an error: its route falls through to the next
//! middleware.

use std::{fmt, future::Future, sync::Arc};

use {
    futures::future::BoxFuture,
    msgext_turn::TurnContext,
    serde::{Serialize, de::DeserializeOwned},
    serde_json::Value,
};

use crate::{
    error::{CapabilityError, CapabilityResult, Error, Result},
    models::{
        AdaptiveCardRequestValue, AdaptiveCardResponseBody, AppBasedLinkQuery, FetchTaskResponse,
        MessagingExtensionAction, MessagingExtensionQuery, MessagingExtensionResult, SettingsUrl,
        TaskModuleResponse,
    },
    route::RouteKey,
};

pub type CapabilityFuture<T> = BoxFuture<'static, CapabilityResult<T>>;

/// A capability receiving the turn and the route's payload.
pub type Capability<P, R> = Arc<dyn Fn(TurnContext, P) -> CapabilityFuture<R> + Send + Sync>;

/// A capability receiving only the turn.
pub type ContextCapability<R> = Arc<dyn Fn(TurnContext) -> CapabilityFuture<R> + Send + Sync>;

fn capability<P, R, F, Fut>(f: F) -> Capability<P, R>
where
    P: 'static,
    R: 'static,
    F: Fn(TurnContext, P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CapabilityResult<R>> + Send + 'static,
{
    Arc::new(move |ctx: TurnContext, payload: P| -> CapabilityFuture<R> {
        Box::pin(f(ctx, payload))
    })
}

fn context_capability<R, F, Fut>(f: F) -> ContextCapability<R>
where
    R: 'static,
    F: Fn(TurnContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CapabilityResult<R>> + Send + 'static,
{
    Arc::new(move |ctx: TurnContext| -> CapabilityFuture<R> { Box::pin(f(ctx)) })
}

/// The application's capabilities, registered one by one.
///
/// ```
/// use msgext_router::{
///     CapabilitySet, RouteKey,
///     models::{MessagingExtensionResult, TaskModuleResponse},
/// };
///
/// let capabilities = CapabilitySet::new()
///     .on_query(|_ctx, query| async move {
///         let term = query
///             .parameter("query")
///             .and_then(|value| value.as_str())
///             .unwrap_or_default()
///             .to_string();
///         Ok(MessagingExtensionResult::message(term))
///     })
///     .on_fetch_task(|_ctx, _action| async move {
///         Ok(TaskModuleResponse::Message { value: "done".into() }.into())
///     });
///
/// assert_eq!(capabilities.routes(), vec![RouteKey::Query, RouteKey::FetchTask]);
/// ```
#[derive(Clone, Default)]
pub struct CapabilitySet {
    on_query: Option<Capability<MessagingExtensionQuery, MessagingExtensionResult>>,
    on_query_settings_url: Option<ContextCapability<SettingsUrl>>,
    on_settings: Option<ContextCapability<()>>,
    on_query_link: Option<Capability<AppBasedLinkQuery, MessagingExtensionResult>>,
    on_submit_action: Option<Capability<MessagingExtensionAction, MessagingExtensionResult>>,
    on_bot_message_preview_edit: Option<Capability<MessagingExtensionAction, TaskModuleResponse>>,
    on_bot_message_preview_send:
        Option<Capability<MessagingExtensionAction, MessagingExtensionResult>>,
    on_fetch_task: Option<Capability<MessagingExtensionAction, FetchTaskResponse>>,
    on_card_button_clicked: Option<Capability<Value, ()>>,
    on_select_item: Option<Capability<Value, MessagingExtensionResult>>,
    on_action_execute: Option<Capability<AdaptiveCardRequestValue, AdaptiveCardResponseBody>>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search queries (`composeExtension/query`).
    pub fn on_query<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(TurnContext, MessagingExtensionQuery) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CapabilityResult<MessagingExtensionResult>> + Send + 'static,
    {
        self.on_query = Some(capability(f));
        self
    }

    /// Settings page location (`composeExtension/querySettingUrl`).
    pub fn on_query_settings_url<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(TurnContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CapabilityResult<SettingsUrl>> + Send + 'static,
    {
        self.on_query_settings_url = Some(context_capability(f));
        self
    }

    /// Settings updates (`composeExtension/setting`).
    pub fn on_settings<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(TurnContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CapabilityResult<()>> + Send + 'static,
    {
        self.on_settings = Some(context_capability(f));
        self
    }

    /// Link unfurling (`composeExtension/queryLink`).
    pub fn on_query_link<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(TurnContext, AppBasedLinkQuery) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CapabilityResult<MessagingExtensionResult>> + Send + 'static,
    {
        self.on_query_link = Some(capability(f));
        self
    }

    /// Action submissions without a preview action.
    pub fn on_submit_action<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(TurnContext, MessagingExtensionAction) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CapabilityResult<MessagingExtensionResult>> + Send + 'static,
    {
        self.on_submit_action = Some(capability(f));
        self
    }

    /// Action submissions with `botMessagePreviewAction` set to `edit`.
    pub fn on_bot_message_preview_edit<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(TurnContext, MessagingExtensionAction) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CapabilityResult<TaskModuleResponse>> + Send + 'static,
    {
        self.on_bot_message_preview_edit = Some(capability(f));
        self
    }

    /// Action submissions with `botMessagePreviewAction` set to `send`.
    pub fn on_bot_message_preview_send<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(TurnContext, MessagingExtensionAction) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CapabilityResult<MessagingExtensionResult>> + Send + 'static,
    {
        self.on_bot_message_preview_send = Some(capability(f));
        self
    }

    /// Task module fetches (`composeExtension/fetchTask` and `task/fetch`).
    ///
    /// Return a [`TaskModuleResponse`] to open a dialog or show a message,
    /// or a [`MessagingExtensionResult`] for `config`/`auth` flows.
    pub fn on_fetch_task<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(TurnContext, MessagingExtensionAction) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CapabilityResult<FetchTaskResponse>> + Send + 'static,
    {
        self.on_fetch_task = Some(capability(f));
        self
    }

    /// Card button clicks. Not filtered by command, so every registered
    /// router with this capability sees the click; cards should carry
    /// their own identifier in the payload.
    pub fn on_card_button_clicked<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(TurnContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CapabilityResult<()>> + Send + 'static,
    {
        self.on_card_button_clicked = Some(capability(f));
        self
    }

    /// Item selection from a result list. Not filtered by command.
    pub fn on_select_item<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(TurnContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CapabilityResult<MessagingExtensionResult>> + Send + 'static,
    {
        self.on_select_item = Some(capability(f));
        self
    }

    /// Universal actions (`adaptiveCard/action`). Not filtered by command.
    pub fn on_action_execute<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(TurnContext, AdaptiveCardRequestValue) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CapabilityResult<AdaptiveCardResponseBody>> + Send + 'static,
    {
        self.on_action_execute = Some(capability(f));
        self
    }

    /// Whether the capability behind `route` is registered.
    pub fn has(&self, route: RouteKey) -> bool {
        match route {
            RouteKey::Query => self.on_query.is_some(),
            RouteKey::QuerySettingUrl => self.on_query_settings_url.is_some(),
            RouteKey::Setting => self.on_settings.is_some(),
            RouteKey::QueryLink => self.on_query_link.is_some(),
            RouteKey::SubmitAction => self.on_submit_action.is_some(),
            RouteKey::BotMessagePreviewEdit => self.on_bot_message_preview_edit.is_some(),
            RouteKey::BotMessagePreviewSend => self.on_bot_message_preview_send.is_some(),
            RouteKey::FetchTask => self.on_fetch_task.is_some(),
            RouteKey::CardButtonClicked => self.on_card_button_clicked.is_some(),
            RouteKey::SelectItem => self.on_select_item.is_some(),
            RouteKey::ActionExecute => self.on_action_execute.is_some(),
        }
    }

    /// Routes with a registered capability.
    pub fn routes(&self) -> Vec<RouteKey> {
        RouteKey::ALL
            .iter()
            .copied()
            .filter(|route| self.has(*route))
            .collect()
    }

    /// Start the capability behind `route`.
    ///
    /// Returns `Ok(None)` when the capability is absent. Routes with a typed
    /// payload require a JSON object and decode it before the call; card
    /// clicks and item selection get the payload as is. The returned future
    /// yields the result encoded as JSON.
    pub fn invoke(
        &self,
        route: RouteKey,
        ctx: &TurnContext,
        payload: &Value,
    ) -> Result<Option<CapabilityFuture<Value>>> {
        let ctx = ctx.clone();
        match route {
            RouteKey::Query => call(route, self.on_query.as_ref(), ctx, payload),
            RouteKey::QuerySettingUrl => Ok(call_with_context(
                self.on_query_settings_url.as_ref(),
                ctx,
            )),
            RouteKey::Setting => Ok(call_with_context(self.on_settings.as_ref(), ctx)),
            RouteKey::QueryLink => call(route, self.on_query_link.as_ref(), ctx, payload),
            RouteKey::SubmitAction => call(route, self.on_submit_action.as_ref(), ctx, payload),
            RouteKey::BotMessagePreviewEdit => call(
                route,
                self.on_bot_message_preview_edit.as_ref(),
                ctx,
                payload,
            ),
            RouteKey::BotMessagePreviewSend => call(
                route,
                self.on_bot_message_preview_send.as_ref(),
                ctx,
                payload,
            ),
            RouteKey::FetchTask => call(route, self.on_fetch_task.as_ref(), ctx, payload),
            RouteKey::CardButtonClicked => Ok(call_with_value(
                self.on_card_button_clicked.as_ref(),
                ctx,
                payload,
            )),
            RouteKey::SelectItem => Ok(call_with_value(
                self.on_select_item.as_ref(),
                ctx,
                payload,
            )),
            RouteKey::ActionExecute => call(route, self.on_action_execute.as_ref(), ctx, payload),
        }
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilitySet")
            .field("routes", &self.routes())
            .finish()
    }
}

fn call<P, R>(
    route: RouteKey,
    capability: Option<&Capability<P, R>>,
    ctx: TurnContext,
    payload: &Value,
) -> Result<Option<CapabilityFuture<Value>>>
where
    P: DeserializeOwned,
    R: Serialize + Send + 'static,
{
    let Some(capability) = capability else {
        return Ok(None);
    };
    let payload = decode(route, payload)?;
    let pending = capability(ctx, payload);
    Ok(Some(Box::pin(async move { encode(pending.await?) })))
}

fn call_with_value<R>(
    capability: Option<&Capability<Value, R>>,
    ctx: TurnContext,
    payload: &Value,
) -> Option<CapabilityFuture<Value>>
where
    R: Serialize + Send + 'static,
{
    let capability = capability?;
    let pending = capability(ctx, payload.clone());
    Some(Box::pin(async move { encode(pending.await?) }))
}

fn call_with_context<R>(
    capability: Option<&ContextCapability<R>>,
    ctx: TurnContext,
) -> Option<CapabilityFuture<Value>>
where
    R: Serialize + Send + 'static,
{
    let capability = capability?;
    let pending = capability(ctx);
    Some(Box::pin(async move { encode(pending.await?) }))
}

/// Decode a typed payload. Derived struct decoding also accepts JSON arrays
/// by position, so anything but an object is rejected up front.
fn decode<P: DeserializeOwned>(route: RouteKey, payload: &Value) -> Result<P> {
    if !payload.is_object() {
        return Err(Error::MalformedPayload {
            route,
            source: serde::de::Error::custom(format!(
                "expected a JSON object, found {}",
                json_kind(payload)
            )),
        });
    }
    P::deserialize(payload).map_err(|source| Error::MalformedPayload { route, source })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn encode<R: Serialize>(result: R) -> CapabilityResult<Value> {
    serde_json::to_value(result).map_err(CapabilityError::from_error)
}
