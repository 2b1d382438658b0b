//! Outbound notifications to display surfaces.
//!
//! The gate fires events after every persisted change; listeners use
//! them to refresh counters without polling the store. Delivery is
//! fire-and-forget: a missing or slow listener never blocks admission.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::ScanStats;

/// Events emitted by the admission gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScraperEvent {
    /// The persisted lead or page counters changed.
    StatsUpdated { stats: ScanStats },
    ScrapingEnabled,
    ScrapingDisabled,
}

/// Receives gate events. Implementations must not block admission;
/// failures are swallowed, not propagated.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: ScraperEvent);
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    async fn notify(&self, event: ScraperEvent) {
        (**self).notify(event).await;
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _event: ScraperEvent) {}
}

/// Fans events out over a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<ScraperEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Open a new event subscription.
    pub fn subscribe(&self) -> broadcast::Receiver<ScraperEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl Notifier for BroadcastNotifier {
    async fn notify(&self, event: ScraperEvent) {
        // Zero receivers is normal when no display surface is open
        if self.sender.send(event).is_err() {
            tracing::debug!("no event subscribers, notification dropped");
        }
    }
}
