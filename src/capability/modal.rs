//! Modal capability manager.
//!
//! Drives host-rendered modal dialogs. `open` is call/response — the host
//! answers once the modal is mounted; `close` is fire-and-forget. The host
//! notifies the frame of lifecycle transitions through `modal.opened` and
//! `modal.closed`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capability::{CapabilityManager, ManagerCore};
use crate::context::ContextResolver;
use crate::error::Error;
use crate::events::EventType;
use crate::features::Feature;
use crate::transport::ChannelSlot;

/// Events the modal manager receives from the host.
pub const MODAL_SUBSCRIBE_EVENTS: &[EventType] =
    &[EventType::ModalOpened, EventType::ModalClosed];

/// Events the modal manager emits toward the host.
pub const MODAL_TRIGGER_EVENTS: &[EventType] = &[EventType::OpenModal, EventType::CloseModal];

/// Parameters for [`ModalManager::open`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenModalParams {
    /// Identifier of the modal template registered with the host.
    pub key: String,
    /// Title rendered in the modal chrome, if the template shows one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Free-form parameters forwarded to the modal content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Capability manager for the `modal` feature.
pub struct ModalManager {
    core: ManagerCore,
}

impl ModalManager {
    pub(crate) fn new(resolver: Arc<ContextResolver>, channel: Arc<ChannelSlot>) -> Self {
        Self {
            core: ManagerCore::new(Feature::Modal, resolver, channel),
        }
    }

    /// Ask the host to open a modal and await its response.
    ///
    /// Payload validation runs first, before the feature-enablement check
    /// and before any cross-boundary call: a malformed call fails the same
    /// way whether or not the handshake has completed.
    ///
    /// # Errors
    /// [`Error::Validation`] if `key` is empty;
    /// [`Error::CapabilityNotEnabled`] if the context does not grant
    /// `modal`; [`Error::Transport`] if the host rejects the request.
    pub async fn open(&self, params: OpenModalParams) -> Result<Value, Error> {
        if params.key.trim().is_empty() {
            return Err(Error::validation("modal key must be a non-empty string"));
        }
        let data = serde_json::to_value(&params)
            .map_err(|e| Error::validation(format!("unserializable modal params: {e}")))?;
        self.core.request(EventType::OpenModal, data).await
    }

    /// Ask the host to dismiss the current modal. Fire-and-forget.
    pub async fn close(&self) -> Result<(), Error> {
        self.core
            .trigger_event(EventType::CloseModal, Value::Null)
            .await
    }
}

impl CapabilityManager for ModalManager {
    fn feature(&self) -> Feature {
        Feature::Modal
    }

    fn events_to_subscribe(&self) -> &'static [EventType] {
        MODAL_SUBSCRIBE_EVENTS
    }

    fn events_to_trigger(&self) -> &'static [EventType] {
        MODAL_TRIGGER_EVENTS
    }

    fn core(&self) -> &ManagerCore {
        &self.core
    }
}
