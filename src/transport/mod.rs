//! Transport seam: the point-to-point handshake channel to the host page.
//!
//! The SDK does not define wire bytes or retry behavior; it consumes an
//! opaque, reliable, ordered channel through two traits. [`Transport`]
//! performs the handshake and yields a [`Channel`]; all inbound traffic
//! reaches the SDK exclusively through the [`InboundCallbacks`] handed to
//! [`Transport::connect`].

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::watch;

use crate::error::TransportError;
use crate::events::{EventType, InboundEvent};

/// Callbacks through which the transport delivers host traffic to the SDK.
pub struct InboundCallbacks {
    /// Invoked once with the initial application context after the host
    /// confirms the handshake.
    pub init: Box<dyn Fn(Value) + Send + Sync>,
    /// Invoked for every subsequent host event, in host-send order.
    pub handle_event: Box<dyn Fn(InboundEvent) + Send + Sync>,
}

/// Handshake side of the transport contract.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Establish the point-to-point channel toward `host`, resolving once
    /// the parent frame confirms. The returned channel stays valid for the
    /// life of the frame.
    async fn connect(
        &self,
        host: &str,
        callbacks: InboundCallbacks,
    ) -> Result<Arc<dyn Channel>, TransportError>;
}

/// Established channel: outbound half of the transport contract.
pub trait Channel: Send + Sync {
    /// Fire-and-forget emission toward the host.
    fn send(&self, event: EventType, data: Value);

    /// Call/response request toward the host.
    fn request(
        &self,
        event: EventType,
        data: Value,
    ) -> BoxFuture<'static, Result<Value, TransportError>>;
}

/// Shared slot holding the channel once the handshake completes.
///
/// Outbound calls made before handshake completion suspend on
/// [`get`](Self::get) rather than failing; the transport's own queueing
/// covers everything past this point.
pub struct ChannelSlot {
    tx: watch::Sender<Option<Arc<dyn Channel>>>,
}

impl ChannelSlot {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Publish the established channel. Called once by the handshake driver.
    pub fn install(&self, channel: Arc<dyn Channel>) {
        self.tx.send_replace(Some(channel));
    }

    /// Await the established channel.
    pub async fn get(&self) -> Arc<dyn Channel> {
        let mut rx = self.tx.subscribe();
        loop {
            let current = rx.borrow_and_update().clone();
            if let Some(channel) = current {
                return channel;
            }
            if rx.changed().await.is_err() {
                // Sender lives inside the slot; park rather than spin.
                std::future::pending::<()>().await;
            }
        }
    }

    /// The channel if the handshake has already completed.
    pub fn try_get(&self) -> Option<Arc<dyn Channel>> {
        self.tx.borrow().clone()
    }
}

impl Default for ChannelSlot {
    fn default() -> Self {
        Self::new()
    }
}
