//! Navigation capability manager.
//!
//! Lets the frame steer the host page: navigate to a URL or reload the
//! embedded frame. The host reports location changes back through
//! `navigation.changed`.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::capability::{CapabilityManager, ManagerCore};
use crate::context::ContextResolver;
use crate::error::Error;
use crate::events::EventType;
use crate::features::Feature;
use crate::transport::ChannelSlot;

/// Events the navigation manager receives from the host.
pub const NAVIGATION_SUBSCRIBE_EVENTS: &[EventType] = &[EventType::LocationChanged];

/// Events the navigation manager emits toward the host.
pub const NAVIGATION_TRIGGER_EVENTS: &[EventType] =
    &[EventType::NavigateToUrl, EventType::ReloadFrame];

/// Capability manager for the `navigation` feature.
pub struct NavigationManager {
    core: ManagerCore,
}

impl NavigationManager {
    pub(crate) fn new(resolver: Arc<ContextResolver>, channel: Arc<ChannelSlot>) -> Self {
        Self {
            core: ManagerCore::new(Feature::Navigation, resolver, channel),
        }
    }

    /// Ask the host page to navigate to `url`. Fire-and-forget.
    ///
    /// Payload validation runs before the feature-enablement check.
    ///
    /// # Errors
    /// [`Error::Validation`] if `url` is empty;
    /// [`Error::CapabilityNotEnabled`] if the context does not grant
    /// `navigation`.
    pub async fn navigate_to(&self, url: &str) -> Result<(), Error> {
        if url.trim().is_empty() {
            return Err(Error::validation("navigation url must be a non-empty string"));
        }
        self.core
            .trigger_event(EventType::NavigateToUrl, json!({ "url": url }))
            .await
    }

    /// Reload the embedded frame. Sugar over the `navigation.reload`
    /// trigger; carries no state of its own.
    pub async fn reload(&self) -> Result<(), Error> {
        self.core
            .trigger_event(EventType::ReloadFrame, Value::Null)
            .await
    }
}

impl CapabilityManager for NavigationManager {
    fn feature(&self) -> Feature {
        Feature::Navigation
    }

    fn events_to_subscribe(&self) -> &'static [EventType] {
        NAVIGATION_SUBSCRIBE_EVENTS
    }

    fn events_to_trigger(&self) -> &'static [EventType] {
        NAVIGATION_TRIGGER_EVENTS
    }

    fn core(&self) -> &ManagerCore {
        &self.core
    }
}
