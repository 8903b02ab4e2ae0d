use std::{
    fmt,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use {async_trait::async_trait, serde_json::Value, tracing::debug};

use crate::{
    Result,
    activity::{InboundActivity, InvokeResponse, OutboundActivity},
};

/// Delivers outbound activities on behalf of the host transport.
#[async_trait]
pub trait ActivitySender: Send + Sync {
    async fn send_activity(&self, activity: OutboundActivity) -> Result<()>;
}

/// Per-turn handle to the inbound activity and the host's sender.
///
/// Cloning is cheap; every clone observes the same turn.
#[derive(Clone)]
pub struct TurnContext {
    activity: Arc<InboundActivity>,
    sender: Arc<dyn ActivitySender>,
    responded: Arc<AtomicBool>,
}

impl TurnContext {
    pub fn new(activity: InboundActivity, sender: Arc<dyn ActivitySender>) -> Self {
        Self {
            activity: Arc::new(activity),
            sender,
            responded: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn activity(&self) -> &InboundActivity {
        &self.activity
    }

    pub fn name(&self) -> Option<&str> {
        self.activity.name.as_deref()
    }

    pub fn value(&self) -> Option<&Value> {
        self.activity.value.as_ref()
    }

    pub async fn send_activity(&self, activity: OutboundActivity) -> Result<()> {
        self.sender.send_activity(activity).await?;
        self.responded.store(true, Ordering::Release);
        Ok(())
    }

    /// Whether an invoke response has been delivered during this turn.
    pub fn responded(&self) -> bool {
        self.responded.load(Ordering::Acquire)
    }
}

impl fmt::Debug for TurnContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnContext")
            .field("activity", &self.activity)
            .field("responded", &self.responded())
            .finish()
    }
}

/// In-memory sender that keeps every outbound activity of a turn.
///
/// HTTP hosts read [`BufferedSender::invoke_response`] once the turn
/// finishes and write it back as the reply to the invoke request.
#[derive(Debug, Default)]
pub struct BufferedSender {
    sent: Mutex<Vec<OutboundActivity>>,
}

impl BufferedSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutboundActivity> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn invoke_responses(&self) -> Vec<InvokeResponse> {
        let sent = self.sent.lock().unwrap_or_else(|e| e.into_inner());
        sent.iter()
            .filter_map(OutboundActivity::as_invoke_response)
            .cloned()
            .collect()
    }

    /// First invoke response captured, which is the one the transport
    /// correlates with the request.
    pub fn invoke_response(&self) -> Option<InvokeResponse> {
        let sent = self.sent.lock().unwrap_or_else(|e| e.into_inner());
        sent.iter()
            .find_map(OutboundActivity::as_invoke_response)
            .cloned()
    }

    pub fn take(&self) -> Vec<OutboundActivity> {
        std::mem::take(&mut *self.sent.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

#[async_trait]
impl ActivitySender for BufferedSender {
    async fn send_activity(&self, activity: OutboundActivity) -> Result<()> {
        debug!(?activity, "buffering outbound activity");
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(activity);
        Ok(())
    }
}
