use std::sync::Arc;

use {
    async_trait::async_trait,
    msgext_turn::{Middleware, Next, TurnContext},
    serde_json::Value,
    tracing::warn,
};

use crate::{
    Error, Result,
    capability::CapabilitySet,
    config::MessagingExtensionConfig,
    envelope,
    filter::CommandFilter,
    observe::{
        ActivityDiagnostics, DiagnosticDetail, FallthroughReason, NoopObserver, TracingObserver,
        TurnObserver,
    },
    route::{Dispatch, Guard, RouteKey},
};

/// What the router did with one activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Exactly one invoke response was sent for the route.
    Handled(RouteKey),
    /// Nothing was sent; the next middleware must run.
    Fallthrough,
}

impl RouteOutcome {
    /// Whether the rest of the chain runs after this outcome.
    pub fn runs_next(self) -> bool {
        match self {
            Self::Handled(route) => route.descriptor().dispatch == Dispatch::ContinueChain,
            Self::Fallthrough => true,
        }
    }
}

/// Middleware answering messaging-extension invoke activities.
///
/// One router serves one command (or every command when built without a
/// command id) and is immutable once built.
pub struct ActivityRouter {
    name: String,
    filter: CommandFilter,
    capabilities: CapabilitySet,
    observer: Arc<dyn TurnObserver>,
}

impl ActivityRouter {
    pub fn new(command_id: Option<String>, capabilities: CapabilitySet) -> Self {
        let name = match command_id.as_deref() {
            Some(id) => format!("messaging-extension:{id}"),
            None => "messaging-extension:*".to_string(),
        };
        Self {
            name,
            filter: CommandFilter::new(command_id),
            capabilities,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn from_config(config: &MessagingExtensionConfig, capabilities: CapabilitySet) -> Self {
        let router = Self::new(config.command_id.clone(), capabilities);
        if config.trace_activities {
            router.with_observer(Arc::new(TracingObserver))
        } else {
            router
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn TurnObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn filter(&self) -> &CommandFilter {
        &self.filter
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Answer the turn if it targets this router, otherwise pass it on.
    ///
    /// Capability failures are answered with a status 500 response and
    /// never surface here.
    pub async fn handle_turn(&self, ctx: &TurnContext, next: Next<'_>) -> Result<()> {
        if self.route(ctx).await?.runs_next() {
            next.run(ctx).await?;
        }
        Ok(())
    }

    /// Route one activity without touching the rest of the chain.
    pub async fn route(&self, ctx: &TurnContext) -> Result<RouteOutcome> {
        let Some(name) = ctx.name() else {
            return Ok(self.fall_through(None, FallthroughReason::MissingName));
        };
        let payload = ctx.value();
        self.observer
            .activity_received(&self.diagnostics(name, payload));

        let Some(route) = RouteKey::classify(name, payload) else {
            return Ok(self.fall_through(Some(name), FallthroughReason::UnknownName));
        };
        let Some(payload) = payload else {
            return Ok(self.fall_through(Some(name), FallthroughReason::MissingPayload));
        };

        let descriptor = route.descriptor();
        if descriptor.guard == Guard::CommandId && !self.filter.matches_payload(payload) {
            return Ok(self.fall_through(Some(name), FallthroughReason::CommandMismatch));
        }
        let Some(pending) = self.capabilities.invoke(route, ctx, payload)? else {
            return Ok(self.fall_through(Some(name), FallthroughReason::MissingCapability));
        };

        let outcome = pending.await;
        if let Err(err) = &outcome {
            warn!(route = %route, activity_name = name, error = %err, "capability failed");
        }
        let response = envelope::build(descriptor.body, outcome);
        let status = response
            .as_invoke_response()
            .map(|r| r.status)
            .unwrap_or_default();
        ctx.send_activity(response).await?;
        self.observer.responded(route, status);
        Ok(RouteOutcome::Handled(route))
    }

    fn fall_through(&self, name: Option<&str>, reason: FallthroughReason) -> RouteOutcome {
        self.observer.fell_through(name, reason);
        RouteOutcome::Fallthrough
    }

    fn diagnostics<'a>(&self, name: &'a str, payload: Option<&'a Value>) -> ActivityDiagnostics<'a> {
        let detail = match payload {
            Some(payload) if !self.filter.is_wildcard() => DiagnosticDetail::Command {
                command_id: payload.get("commandId"),
                parameters: payload.get("parameters"),
            },
            _ => DiagnosticDetail::Payload(payload),
        };
        ActivityDiagnostics { name, detail }
    }
}

impl std::fmt::Debug for ActivityRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityRouter")
            .field("filter", &self.filter)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

#[async_trait]
impl Middleware for ActivityRouter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_turn(&self, ctx: &TurnContext, next: Next<'_>) -> msgext_turn::Result<()> {
        self.handle_turn(ctx, next).await.map_err(|err| match err {
            Error::Turn(inner) => inner,
            other => msgext_turn::Error::middleware(self.name.clone(), other),
        })
    }
}
