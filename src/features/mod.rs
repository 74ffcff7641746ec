//! Feature registry and event gate.
//!
//! A [`Feature`] is a named capability grant. The static registry maps each
//! feature to the events it unlocks; the gate answers whether a given event
//! is admissible for a given enabled-feature list. The reverse map
//! (event -> unlocking features) is computed once and never rebuilt.
//!
//! "Does this event exist" and "is this event enabled" are deliberately
//! distinct answers ([`EventGateStatus`]), so callers can report unknown
//! events differently from disabled ones.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::events::EventType;

/// A capability grant. Granted features arrive in the application context
/// supplied by the host during handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    /// Modal dialogs driven by the host page.
    Modal,
    /// Host-page navigation and frame reload.
    Navigation,
}

impl Feature {
    /// Grant name as it appears in the context's feature list.
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Modal => "modal",
            Feature::Navigation => "navigation",
        }
    }

    /// Parse a grant name from a context payload.
    pub fn from_name(name: &str) -> Option<Feature> {
        match name {
            "modal" => Some(Feature::Modal),
            "navigation" => Some(Feature::Navigation),
            _ => None,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static declaration binding one feature to the events it unlocks.
#[derive(Debug, Clone, Copy)]
pub struct FeatureDefinition {
    pub feature: Feature,
    pub events: &'static [EventType],
}

/// The full feature registry. Closed over all known event types: every
/// event dispatched at runtime appears in exactly one definition's event
/// set or in [`crate::events::ALWAYS_ENABLED_EVENTS`].
pub static FEATURE_DEFINITIONS: &[FeatureDefinition] = &[
    FeatureDefinition {
        feature: Feature::Modal,
        events: &[
            EventType::ModalOpened,
            EventType::ModalClosed,
            EventType::OpenModal,
            EventType::CloseModal,
        ],
    },
    FeatureDefinition {
        feature: Feature::Navigation,
        events: &[
            EventType::LocationChanged,
            EventType::NavigateToUrl,
            EventType::ReloadFrame,
        ],
    },
];

/// Reverse map event -> features that unlock it. Built once on first gate
/// query; the registry is immutable so the map is never invalidated.
static UNLOCKING_FEATURES: Lazy<HashMap<EventType, Vec<Feature>>> = Lazy::new(|| {
    let mut map: HashMap<EventType, Vec<Feature>> = HashMap::new();
    for definition in FEATURE_DEFINITIONS {
        for event in definition.events {
            map.entry(*event).or_default().push(definition.feature);
        }
    }
    map
});

/// Outcome of gating one event against an enabled-feature list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventGateStatus {
    /// Always-enabled, or unlocked by at least one enabled feature.
    Enabled,
    /// Known event, but no enabled feature unlocks it.
    Disabled,
    /// Event appears in no feature definition and is not always-enabled.
    Unknown,
}

/// Pure membership test: is `feature` in the enabled set.
pub fn is_feature_enabled(feature: Feature, enabled: &[Feature]) -> bool {
    enabled.contains(&feature)
}

/// Gate one event against an enabled-feature list, distinguishing unknown
/// events from disabled ones.
pub fn event_status(event: EventType, enabled: &[Feature]) -> EventGateStatus {
    if event.is_always_enabled() {
        return EventGateStatus::Enabled;
    }
    match UNLOCKING_FEATURES.get(&event) {
        None => EventGateStatus::Unknown,
        Some(unlocking) => {
            if unlocking.iter().any(|f| is_feature_enabled(*f, enabled)) {
                EventGateStatus::Enabled
            } else {
                EventGateStatus::Disabled
            }
        }
    }
}

/// Whether `event` is admissible for the given enabled-feature list.
pub fn is_event_enabled(event: EventType, enabled: &[Feature]) -> bool {
    event_status(event, enabled) == EventGateStatus::Enabled
}
