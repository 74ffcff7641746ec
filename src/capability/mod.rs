//! Capability manager contract and shared dispatch machinery.
//!
//! One manager exists per capability domain. Each declares the events it
//! may receive and trigger, owns the subscription bookkeeping for them, and
//! gates every inbound dispatch and outbound trigger on whether its feature
//! is granted in the *current* resolved context. Enablement is re-checked
//! per call — a context replacement takes effect on the very next dispatch.

pub mod modal;
pub mod navigation;

pub use modal::{ModalManager, OpenModalParams};
pub use navigation::NavigationManager;

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use serde_json::Value;

use crate::context::ContextResolver;
use crate::error::Error;
use crate::events::{EventEnvelope, EventType};
use crate::features::{self, Feature};
use crate::transport::ChannelSlot;

/// A locally registered event handler.
pub type EventHandler = Arc<dyn Fn(&EventEnvelope) + Send + Sync>;

/// Unique identifier for one handler registration.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct HandlerId(u64);

static HANDLER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

impl HandlerId {
    fn next() -> Self {
        HandlerId(HANDLER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerId({})", self.0)
    }
}

struct HandlerEntry {
    id: HandlerId,
    handler: EventHandler,
}

type HandlerMap = Mutex<HashMap<EventType, Vec<HandlerEntry>>>;

/// Capability to remove exactly one handler registration.
///
/// [`unsubscribe`](Self::unsubscribe) is idempotent; dropping a
/// subscription without calling it leaves the handler registered.
pub struct Subscription {
    slot: Option<SubscriptionSlot>,
}

struct SubscriptionSlot {
    handlers: Weak<HandlerMap>,
    event: EventType,
    id: HandlerId,
}

impl Subscription {
    /// A subscription bound to nothing. Returned when an `on` call names an
    /// event no manager subscribes to.
    pub fn inert() -> Self {
        Self { slot: None }
    }

    /// Remove the registration this subscription refers to. Repeated calls
    /// are no-ops.
    pub fn unsubscribe(&mut self) {
        let Some(slot) = self.slot.take() else {
            return;
        };
        let Some(handlers) = slot.handlers.upgrade() else {
            return;
        };
        let mut map = handlers.lock().unwrap();
        if let Some(entries) = map.get_mut(&slot.event) {
            entries.retain(|e| e.id != slot.id);
            if entries.is_empty() {
                map.remove(&slot.event);
            }
        }
    }
}

/// Contract every concrete capability manager satisfies.
///
/// The subscribe/trigger lists are static and must be disjoint across all
/// managers; the client facade validates disjointness at construction.
pub trait CapabilityManager: Send + Sync {
    /// The feature grant governing this manager's events.
    fn feature(&self) -> Feature;

    /// Events this manager may receive from the host.
    fn events_to_subscribe(&self) -> &'static [EventType];

    /// Events this manager may emit toward the host.
    fn events_to_trigger(&self) -> &'static [EventType];

    /// The shared subscription and dispatch machinery.
    fn core(&self) -> &ManagerCore;
}

/// Subscription bookkeeping and gated dispatch, shared by every manager.
///
/// Holds the manager's handler map plus non-owning references to the
/// facade-owned context resolver and channel slot.
pub struct ManagerCore {
    feature: Feature,
    handlers: Arc<HandlerMap>,
    resolver: Arc<ContextResolver>,
    channel: Arc<ChannelSlot>,
}

impl ManagerCore {
    pub(crate) fn new(
        feature: Feature,
        resolver: Arc<ContextResolver>,
        channel: Arc<ChannelSlot>,
    ) -> Self {
        Self {
            feature,
            handlers: Arc::new(Mutex::new(HashMap::new())),
            resolver,
            channel,
        }
    }

    /// Register a handler for one event type. Safe to call before the
    /// handshake completes; the registration is recorded immediately.
    pub fn subscribe(&self, event: EventType, handler: EventHandler) -> Subscription {
        let id = HandlerId::next();
        {
            let mut map = self.handlers.lock().unwrap();
            map.entry(event)
                .or_default()
                .push(HandlerEntry { id, handler });
        }
        Subscription {
            slot: Some(SubscriptionSlot {
                handlers: Arc::downgrade(&self.handlers),
                event,
                id,
            }),
        }
    }

    /// Inbound dispatch. Never fails: a disabled feature or absent context
    /// drops the event with a diagnostic, and a panicking handler is
    /// isolated so the remaining handlers and the event loop keep going.
    pub fn handle_event(&self, envelope: &EventEnvelope) {
        let Some((generation, context)) = self.resolver.snapshot() else {
            log::warn!(
                "dropping inbound '{}': context not yet resolved",
                envelope.event_type
            );
            return;
        };
        if !features::is_feature_enabled(self.feature, &context.features()) {
            log::debug!(
                "dropping inbound '{}': feature '{}' not enabled (context generation {})",
                envelope.event_type,
                self.feature,
                generation
            );
            return;
        }

        let snapshot: Vec<EventHandler> = {
            let map = self.handlers.lock().unwrap();
            match map.get(&envelope.event_type) {
                Some(entries) => entries.iter().map(|e| e.handler.clone()).collect(),
                None => return,
            }
        };

        for handler in snapshot {
            let result = catch_unwind(AssertUnwindSafe(|| handler(envelope)));
            if let Err(panic) = result {
                log::error!(
                    "handler for '{}' panicked: {:?}",
                    envelope.event_type,
                    panic
                );
            }
        }
    }

    /// Fire-and-forget emission toward the host.
    ///
    /// Suspends until the context is resolved (calls made before handshake
    /// completion queue here rather than failing fast), then checks the
    /// feature grant against the current context.
    pub async fn trigger_event(&self, event: EventType, data: Value) -> Result<(), Error> {
        self.check_enabled(event).await?;
        let channel = self.channel.get().await;
        channel.send(event, data);
        Ok(())
    }

    /// Call/response request toward the host, gated like
    /// [`trigger_event`](Self::trigger_event).
    pub async fn request(&self, event: EventType, data: Value) -> Result<Value, Error> {
        self.check_enabled(event).await?;
        let channel = self.channel.get().await;
        let response = channel.request(event, data).await?;
        Ok(response)
    }

    async fn check_enabled(&self, event: EventType) -> Result<(), Error> {
        let context = self.resolver.get().await;
        if features::is_feature_enabled(self.feature, &context.features()) {
            Ok(())
        } else {
            Err(Error::CapabilityNotEnabled {
                feature: self.feature,
                event,
            })
        }
    }
}
