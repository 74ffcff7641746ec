//! Application context and its single-resolution resolver.
//!
//! The host supplies the application context exactly once per handshake,
//! through the transport's `init` callback. Until then every
//! context-dependent operation suspends on [`ContextResolver::get`]. A
//! later `context.changed` event replaces the held context wholesale —
//! replacement, not merge — and bumps a generation counter so diagnostics
//! can tell a stale read from a not-yet-available one.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;

use crate::features::Feature;

/// Immutable application context payload supplied by the host.
///
/// The payload shape is host-defined. The conventional shape is
/// `{"app": {"currentUser": …, "org": …, "features": […], "debug": bool}}`,
/// but a context replacement may carry an arbitrary document, so every
/// accessor tolerates a missing `app` key.
#[derive(Debug, Clone)]
pub struct AppContext {
    payload: Arc<Value>,
}

impl AppContext {
    pub fn new(payload: Value) -> Self {
        Self {
            payload: Arc::new(payload),
        }
    }

    /// The raw payload as received from the host.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Feature grants listed in the context. Unrecognized grant names are
    /// ignored; a payload without `app.features` yields an empty set.
    pub fn features(&self) -> Vec<Feature> {
        self.payload["app"]["features"]
            .as_array()
            .map(|grants| {
                grants
                    .iter()
                    .filter_map(|g| g.as_str())
                    .filter_map(Feature::from_name)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Host-side debug flag, defaulting to off.
    pub fn debug(&self) -> bool {
        self.payload["app"]["debug"].as_bool().unwrap_or(false)
    }

    /// The current user object, if the host supplied one.
    pub fn current_user(&self) -> Option<&Value> {
        let user = &self.payload["app"]["currentUser"];
        (!user.is_null()).then_some(user)
    }

    /// The organization object, if the host supplied one.
    pub fn org(&self) -> Option<&Value> {
        let org = &self.payload["app"]["org"];
        (!org.is_null()).then_some(org)
    }
}

impl PartialEq for AppContext {
    fn eq(&self, other: &Self) -> bool {
        self.payload == other.payload
    }
}

#[derive(Debug, Clone)]
struct ResolvedContext {
    generation: u64,
    context: AppContext,
}

/// Single-resolution future for the application context.
///
/// State machine: `Pending -> Resolved(1) -> Resolved(2) -> …`. Each
/// resolution installs a whole new context; an individual generation is
/// never mutated after it is published. Any number of consumers may await
/// [`get`](Self::get); once a generation exists, present and future waiters
/// all observe the current one immediately.
///
/// There is no cancellation or timeout: if the host never resolves, waiters
/// stay pending and callers impose their own deadline externally.
pub struct ContextResolver {
    tx: watch::Sender<Option<ResolvedContext>>,
}

impl ContextResolver {
    /// A fresh, pending resolver.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Install a new context generation from a host payload.
    ///
    /// The payload replaces any previous context in full. Handed the
    /// initial handshake payload and every `context.changed` payload alike.
    pub fn resolve(&self, payload: Value) {
        self.tx.send_modify(|slot| {
            let generation = slot.as_ref().map(|r| r.generation).unwrap_or(0) + 1;
            *slot = Some(ResolvedContext {
                generation,
                context: AppContext::new(payload),
            });
        });
    }

    /// Await the current context, suspending until the first resolution.
    pub async fn get(&self) -> AppContext {
        let mut rx = self.tx.subscribe();
        loop {
            let current = rx.borrow_and_update().clone();
            if let Some(resolved) = current {
                return resolved.context;
            }
            if rx.changed().await.is_err() {
                // Sender lives as long as the resolver; unreachable while
                // anyone can call get(). Park forever rather than spin.
                std::future::pending::<()>().await;
            }
        }
    }

    /// Current generation and context without waiting. `None` while pending.
    pub fn snapshot(&self) -> Option<(u64, AppContext)> {
        self.tx
            .borrow()
            .as_ref()
            .map(|r| (r.generation, r.context.clone()))
    }

    /// Number of resolutions so far. Zero while pending.
    pub fn generation(&self) -> u64 {
        self.tx.borrow().as_ref().map(|r| r.generation).unwrap_or(0)
    }
}

impl Default for ContextResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn granted(features: &[&str]) -> Value {
        json!({"app": {"features": features, "debug": false}})
    }

    #[tokio::test]
    async fn waiters_before_and_after_resolution_see_the_same_value() {
        let resolver = Arc::new(ContextResolver::new());

        let early = {
            let resolver = Arc::clone(&resolver);
            tokio::spawn(async move { resolver.get().await })
        };
        // Give the early waiter a chance to subscribe while pending.
        tokio::task::yield_now().await;
        assert!(resolver.snapshot().is_none());

        resolver.resolve(granted(&["modal"]));

        let early = early.await.unwrap();
        let late = resolver.get().await;
        assert_eq!(early, late);
        assert_eq!(late.features(), vec![Feature::Modal]);
    }

    #[tokio::test]
    async fn get_stays_pending_until_resolution() {
        let resolver = ContextResolver::new();
        let wait = tokio::time::timeout(Duration::from_millis(20), resolver.get()).await;
        assert!(wait.is_err(), "get() must not complete while pending");
    }

    #[tokio::test]
    async fn replacement_is_wholesale_and_bumps_generation() {
        let resolver = ContextResolver::new();
        resolver.resolve(granted(&["modal", "navigation"]));
        assert_eq!(resolver.generation(), 1);

        // The replacement payload has no `app` key at all.
        resolver.resolve(json!({"data": "new context"}));
        assert_eq!(resolver.generation(), 2);

        let context = resolver.get().await;
        assert_eq!(*context.payload(), json!({"data": "new context"}));
        assert!(context.features().is_empty());
        assert!(context.current_user().is_none());
    }

    #[test]
    fn accessors_tolerate_arbitrary_shapes() {
        let context = AppContext::new(json!("just a string"));
        assert!(context.features().is_empty());
        assert!(!context.debug());
        assert!(context.org().is_none());

        let context = AppContext::new(json!({
            "app": {
                "currentUser": {"id": "u-1"},
                "org": {"id": "o-1"},
                "features": ["modal", "not-a-feature"],
                "debug": true
            }
        }));
        assert_eq!(context.features(), vec![Feature::Modal]);
        assert!(context.debug());
        assert_eq!(context.current_user().unwrap()["id"], "u-1");
    }
}
