//! Event envelope types.
//!
//! [`InboundEvent`] is the raw unit handed to the SDK by the transport:
//! a wire name plus an opaque JSON payload. [`EventEnvelope`] is the typed
//! unit that flows through routing and into handlers once the wire name has
//! been resolved to an [`EventType`]. Every envelope carries an
//! auto-generated id and a UTC timestamp for diagnostics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::events::EventType;

/// Raw inbound event as delivered by the transport callbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Wire name of the event (e.g. `"modal.opened"`).
    pub name: String,
    /// Opaque event payload.
    #[serde(default)]
    pub data: Value,
}

impl InboundEvent {
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Typed event envelope dispatched to capability managers and handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique identifier for this envelope instance.
    pub event_id: Uuid,
    /// UTC timestamp when the envelope was created.
    pub timestamp: DateTime<Utc>,
    /// Typed event discriminator.
    pub event_type: EventType,
    /// Opaque event payload.
    pub data: Value,
}

impl EventEnvelope {
    /// Wrap a payload in a fresh envelope for the given event type.
    pub fn new(event_type: EventType, data: Value) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event_type,
            data,
        }
    }
}
