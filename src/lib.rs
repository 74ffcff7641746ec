//! # framegate
//!
//! Embeddable-application SDK: lets code running inside a sandboxed child
//! frame talk to its host page over a point-to-point handshake transport,
//! with every event gated by the capability grants the host declared in the
//! application context.
//!
//! The shape of a session:
//!
//! 1. [`client::init`] (or [`Client::new`]) opens the handshake in the
//!    background and returns the facade immediately.
//! 2. The host confirms the handshake and supplies the initial context;
//!    [`Client::get_context`] resolves for every waiter.
//! 3. Inbound host events are routed to the capability manager that
//!    declared them and delivered to locally registered handlers, provided
//!    the manager's feature is granted in the current context.
//! 4. Outbound triggers and requests re-check the grant per call and fail
//!    with [`Error::CapabilityNotEnabled`] when it is absent.
//!
//! The transport itself is an external collaborator behind
//! [`transport::Transport`] / [`transport::Channel`]; this crate assumes it
//! is reliable, ordered, and call/response capable.

pub mod capability;
pub mod client;
pub mod context;
pub mod error;
pub mod events;
pub mod features;
pub mod transport;

pub use capability::{
    CapabilityManager, EventHandler, ModalManager, NavigationManager, OpenModalParams,
    Subscription,
};
pub use client::{init, Client, ClientOptions, DEFAULT_HOST};
pub use context::{AppContext, ContextResolver};
pub use error::{Error, TransportError};
pub use events::{EventEnvelope, EventType, InboundEvent, ALWAYS_ENABLED_EVENTS};
pub use features::{
    event_status, is_event_enabled, is_feature_enabled, EventGateStatus, Feature,
    FeatureDefinition, FEATURE_DEFINITIONS,
};
pub use transport::{Channel, ChannelSlot, InboundCallbacks, Transport};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
