use std::sync::Arc;

use {
    async_trait::async_trait,
    futures::future::BoxFuture,
    tracing::{debug, trace},
};

use crate::{Result, context::TurnContext};

/// A step in the turn pipeline.
///
/// Implementations either answer the turn themselves or hand it on by
/// running `next`. `next` is consumed, so it runs at most once.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// A human-readable name, used in logs and error reports.
    fn name(&self) -> &str {
        "middleware"
    }

    async fn on_turn(&self, ctx: &TurnContext, next: Next<'_>) -> Result<()>;
}

/// The bot's own turn logic, run after every middleware passed the turn on.
#[async_trait]
pub trait TurnHandler: Send + Sync {
    async fn on_turn(&self, ctx: &TurnContext) -> Result<()>;
}

/// Terminal handler that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

#[async_trait]
impl TurnHandler for NoopHandler {
    async fn on_turn(&self, _ctx: &TurnContext) -> Result<()> {
        Ok(())
    }
}

/// Continuation over the rest of the pipeline.
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    handler: &'a dyn TurnHandler,
}

impl<'a> Next<'a> {
    pub fn new(chain: &'a [Arc<dyn Middleware>], handler: &'a dyn TurnHandler) -> Self {
        Self { chain, handler }
    }

    /// Run the remaining middleware, then the terminal handler.
    pub fn run<'c>(self, ctx: &'c TurnContext) -> BoxFuture<'c, Result<()>>
    where
        'a: 'c,
    {
        Box::pin(async move {
            match self.chain.split_first() {
                Some((first, rest)) => {
                    trace!(middleware = first.name(), "entering middleware");
                    first
                        .on_turn(ctx, Next {
                            chain: rest,
                            handler: self.handler,
                        })
                        .await
                },
                None => self.handler.on_turn(ctx).await,
            }
        })
    }
}

/// Ordered middleware pipeline for one bot.
#[derive(Clone, Default)]
pub struct MiddlewareSet {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware; it runs after every middleware added before it.
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.push(Arc::new(middleware));
        self
    }

    pub fn push(&mut self, middleware: Arc<dyn Middleware>) {
        debug!(middleware = middleware.name(), "middleware registered");
        self.middleware.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }

    /// Drive one turn through the pipeline.
    pub async fn run(&self, ctx: &TurnContext, handler: &dyn TurnHandler) -> Result<()> {
        Next::new(&self.middleware, handler).run(ctx).await
    }
}
