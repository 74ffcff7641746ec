//! Event vocabulary for host/frame traffic.
//!
//! Every event the SDK can receive or send is named here. The set is closed:
//! an inbound wire name that does not map to an [`EventType`] is an unknown
//! event and is dropped with a diagnostic rather than dispatched.

pub mod envelope;

pub use envelope::{EventEnvelope, InboundEvent};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Event type discriminator for everything that crosses the frame boundary.
///
/// Wire names are dotted `domain.action` strings (e.g. `"modal.open"`);
/// [`EventType::from_name`] is the only way a raw wire name becomes typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Reserved system event: the host replaced the application context.
    /// Always enabled regardless of feature grants and handled by the
    /// client facade before any capability manager is consulted.
    #[serde(rename = "context.changed")]
    ContextChanged,

    /// Host notification that a modal finished opening.
    #[serde(rename = "modal.opened")]
    ModalOpened,
    /// Host notification that a modal was dismissed.
    #[serde(rename = "modal.closed")]
    ModalClosed,
    /// Frame request to open a modal (call/response).
    #[serde(rename = "modal.open")]
    OpenModal,
    /// Frame request to close the current modal (fire-and-forget).
    #[serde(rename = "modal.close")]
    CloseModal,

    /// Host notification that the embedding page's location changed.
    #[serde(rename = "navigation.changed")]
    LocationChanged,
    /// Frame request to navigate the host page to a URL.
    #[serde(rename = "navigation.navigate")]
    NavigateToUrl,
    /// Frame request to reload the embedded frame.
    #[serde(rename = "navigation.reload")]
    ReloadFrame,
}

/// Events exempt from feature gating (bootstrap/system traffic).
pub const ALWAYS_ENABLED_EVENTS: &[EventType] = &[EventType::ContextChanged];

impl EventType {
    /// Wire name of this event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ContextChanged => "context.changed",
            EventType::ModalOpened => "modal.opened",
            EventType::ModalClosed => "modal.closed",
            EventType::OpenModal => "modal.open",
            EventType::CloseModal => "modal.close",
            EventType::LocationChanged => "navigation.changed",
            EventType::NavigateToUrl => "navigation.navigate",
            EventType::ReloadFrame => "navigation.reload",
        }
    }

    /// Parse a wire name. `None` means the event is unknown to this SDK.
    pub fn from_name(name: &str) -> Option<EventType> {
        match name {
            "context.changed" => Some(EventType::ContextChanged),
            "modal.opened" => Some(EventType::ModalOpened),
            "modal.closed" => Some(EventType::ModalClosed),
            "modal.open" => Some(EventType::OpenModal),
            "modal.close" => Some(EventType::CloseModal),
            "navigation.changed" => Some(EventType::LocationChanged),
            "navigation.navigate" => Some(EventType::NavigateToUrl),
            "navigation.reload" => Some(EventType::ReloadFrame),
            _ => None,
        }
    }

    /// Whether this event is exempt from feature gating.
    pub fn is_always_enabled(&self) -> bool {
        ALWAYS_ENABLED_EVENTS.contains(self)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
