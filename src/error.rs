//! Error types for the framegate SDK.
//!
//! Two families: [`TransportError`] covers the point-to-point channel
//! boundary, and [`Error`] covers the capability layer on top of it.
//!
//! Local API misuse (disabled capability, malformed payload) surfaces as an
//! `Err` to the calling application. The same classes of problem arising
//! from inbound host traffic are logged and dropped instead — there is no
//! synchronous caller on that path, and the dispatch loop must keep running.

use thiserror::Error;

use crate::events::EventType;
use crate::features::Feature;

/// Errors from the underlying point-to-point transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The handshake with the host never completed.
    #[error("handshake connect failed: {message}")]
    ConnectFailed { message: String },

    /// The channel was torn down while a call was in flight.
    #[error("channel closed")]
    ChannelClosed,

    /// A call/response request was rejected or lost by the host.
    #[error("request '{event}' failed: {message}")]
    RequestFailed { event: String, message: String },
}

/// Errors surfaced to application code by the capability layer.
#[derive(Debug, Error)]
pub enum Error {
    /// The event is recognized, but the current context's feature grants do
    /// not include the capability that unlocks it. Raised only on the local
    /// trigger/request path, never on inbound dispatch.
    #[error("capability '{feature}' is not enabled in the current context (event '{event}')")]
    CapabilityNotEnabled { feature: Feature, event: EventType },

    /// A capability-specific payload failed validation before any
    /// cross-boundary call was made.
    #[error("invalid payload: {message}")]
    Validation { message: String },

    /// The event name matches no known event type. The public `on` /
    /// `trigger_event` paths log and degrade to a no-op instead of
    /// returning this; it exists for internal plumbing and diagnostics.
    #[error("unknown event type '{name}'")]
    UnknownEvent { name: String },

    /// Two capability managers declared the same event type. Routing-table
    /// construction fails rather than silently favoring registration order.
    #[error("event '{event}' is claimed by more than one capability manager")]
    RoutingConflict { event: EventType },

    /// Underlying transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }
}
