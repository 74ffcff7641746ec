//! Client facade: handshake orchestration, event routing, public surface.
//!
//! One facade owns the transport handshake, the context resolver, and the
//! capability managers. Inbound events are routed to the owning manager
//! through a precomputed table; outbound triggers route the same way.
//! Domain methods are reached through typed accessors
//! ([`Client::modal`], [`Client::navigation`]) rather than a dynamic
//! method surface.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use serde_json::Value;
use tokio::sync::mpsc;

use crate::capability::{
    CapabilityManager, EventHandler, ModalManager, NavigationManager, Subscription,
};
use crate::context::{AppContext, ContextResolver};
use crate::error::Error;
use crate::events::{EventEnvelope, EventType, InboundEvent};
use crate::transport::{ChannelSlot, InboundCallbacks, Transport};

/// Default host endpoint: accept whichever parent origin embedded the frame.
pub const DEFAULT_HOST: &str = "*";

/// Configuration accepted by [`Client::new`] and [`init`].
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Host endpoint to hand the transport. Defaults to [`DEFAULT_HOST`].
    pub host: Option<String>,
    /// Raise the SDK's own diagnostic logging from `trace` to `debug`.
    pub debug: bool,
}

impl ClientOptions {
    fn resolved_host(&self) -> String {
        self.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string())
    }
}

/// Precomputed event -> owning-manager routing, split by direction.
///
/// Built once at facade construction. A duplicate claim is a defect in the
/// manager declarations and fails construction rather than being resolved
/// by registration order.
#[derive(Debug)]
pub(crate) struct RoutingTable {
    subscribe: HashMap<EventType, usize>,
    trigger: HashMap<EventType, usize>,
}

impl RoutingTable {
    pub(crate) fn build(managers: &[Arc<dyn CapabilityManager>]) -> Result<Self, Error> {
        let mut subscribe = HashMap::new();
        let mut trigger = HashMap::new();
        for (index, manager) in managers.iter().enumerate() {
            for event in manager.events_to_subscribe() {
                if subscribe.insert(*event, index).is_some() {
                    return Err(Error::RoutingConflict { event: *event });
                }
            }
            for event in manager.events_to_trigger() {
                if trigger.insert(*event, index).is_some() {
                    return Err(Error::RoutingConflict { event: *event });
                }
            }
        }
        Ok(Self { subscribe, trigger })
    }

    fn subscriber(&self, event: EventType) -> Option<usize> {
        self.subscribe.get(&event).copied()
    }

    fn trigger_owner(&self, event: EventType) -> Option<usize> {
        self.trigger.get(&event).copied()
    }
}

/// The SDK facade handed to application code.
pub struct Client {
    debug: bool,
    resolver: Arc<ContextResolver>,
    channel: Arc<ChannelSlot>,
    modal: Arc<ModalManager>,
    navigation: Arc<NavigationManager>,
    managers: Vec<Arc<dyn CapabilityManager>>,
    routes: RoutingTable,
}

impl Client {
    /// Construct a facade and start the handshake in the background.
    ///
    /// Returns immediately; the handshake driver runs as a spawned task, so
    /// this must be called from within a tokio runtime. Subscriptions and
    /// triggers are valid from the moment this returns — triggers suspend
    /// until the host has supplied the initial context.
    pub fn new(transport: Arc<dyn Transport>, options: ClientOptions) -> Result<Arc<Self>, Error> {
        let resolver = Arc::new(ContextResolver::new());
        let channel = Arc::new(ChannelSlot::new());

        let modal = Arc::new(ModalManager::new(resolver.clone(), channel.clone()));
        let navigation = Arc::new(NavigationManager::new(resolver.clone(), channel.clone()));
        let managers: Vec<Arc<dyn CapabilityManager>> = vec![modal.clone(), navigation.clone()];
        let routes = RoutingTable::build(&managers)?;

        let client = Arc::new(Client {
            debug: options.debug,
            resolver,
            channel,
            modal,
            navigation,
            managers,
            routes,
        });
        client.spawn_handshake_driver(transport, options.resolved_host());
        Ok(client)
    }

    /// Handshake driver: connect, await establishment, honor the first
    /// `init` payload, then pump inbound events in delivery order.
    ///
    /// The `init` payload is consumed only after `connect` resolves, even
    /// if the transport invoked the callback earlier; the mpsc queue holds
    /// it until then.
    fn spawn_handshake_driver(self: &Arc<Self>, transport: Arc<dyn Transport>, host: String) {
        let client = Arc::clone(self);
        tokio::spawn(async move {
            let (init_tx, mut init_rx) = mpsc::unbounded_channel::<Value>();
            let (event_tx, mut event_rx) = mpsc::unbounded_channel::<InboundEvent>();

            let callbacks = InboundCallbacks {
                init: Box::new(move |payload| {
                    let _ = init_tx.send(payload);
                }),
                handle_event: Box::new(move |event| {
                    let _ = event_tx.send(event);
                }),
            };

            let channel = match transport.connect(&host, callbacks).await {
                Ok(channel) => channel,
                Err(e) => {
                    log::error!("handshake with host '{host}' failed: {e}");
                    return;
                }
            };
            client.channel.install(channel);

            let Some(payload) = init_rx.recv().await else {
                log::error!("transport dropped before delivering the initial context");
                return;
            };
            client.resolver.resolve(payload);
            client.diag("handshake complete, initial context resolved");

            while let Some(event) = event_rx.recv().await {
                client.dispatch_inbound(event);
            }
        });
    }

    /// Register a handler for an inbound event type.
    ///
    /// Unknown or unrouted event types log an error and return an inert
    /// subscription — `on` never fails, and is safe to call speculatively
    /// before the handshake completes.
    pub fn on<F>(&self, event: EventType, handler: F) -> Subscription
    where
        F: Fn(&EventEnvelope) + Send + Sync + 'static,
    {
        match self.routes.subscriber(event) {
            Some(index) => {
                let handler: EventHandler = Arc::new(handler);
                self.managers[index].core().subscribe(event, handler)
            }
            None => {
                log::error!("no capability manager subscribes to '{event}'; subscription is inert");
                Subscription::inert()
            }
        }
    }

    /// Emit a fire-and-forget event toward the host.
    ///
    /// Unrouted event types log an error and return `Ok(())`; routed ones
    /// delegate to the owning manager's gate.
    pub async fn trigger_event(&self, event: EventType, data: Value) -> Result<(), Error> {
        match self.routes.trigger_owner(event) {
            Some(index) => self.managers[index].core().trigger_event(event, data).await,
            None => {
                log::error!("no capability manager triggers '{event}'; ignoring");
                Ok(())
            }
        }
    }

    /// Await the application context supplied by the host.
    pub async fn get_context(&self) -> AppContext {
        self.resolver.get().await
    }

    /// Current context generation; zero before the handshake resolves.
    pub fn context_generation(&self) -> u64 {
        self.resolver.generation()
    }

    /// The modal capability.
    pub fn modal(&self) -> &ModalManager {
        &self.modal
    }

    /// The navigation capability.
    pub fn navigation(&self) -> &NavigationManager {
        &self.navigation
    }

    /// Inbound dispatch entry point. Never propagates handler failures to
    /// the transport; every failure mode degrades to a diagnostic log.
    fn dispatch_inbound(&self, inbound: InboundEvent) {
        let Some(event_type) = EventType::from_name(&inbound.name) else {
            log::error!("dropping inbound event with unknown name '{}'", inbound.name);
            return;
        };

        // Context replacement is handled before any manager is consulted.
        if event_type == EventType::ContextChanged {
            self.resolver.resolve(inbound.data);
            self.diag("context replaced by host");
            return;
        }

        let envelope = EventEnvelope::new(event_type, inbound.data);
        match self.routes.subscriber(event_type) {
            Some(index) => self.managers[index].core().handle_event(&envelope),
            None => {
                log::error!("no capability manager subscribes to inbound '{event_type}'");
            }
        }
    }

    fn diag(&self, message: &str) {
        if self.debug {
            log::debug!("framegate: {message}");
        } else {
            log::trace!("framegate: {message}");
        }
    }
}

// ---------------------------------------------------------------------------
// Process-wide singleton
// ---------------------------------------------------------------------------

static CLIENT: OnceLock<Arc<Client>> = OnceLock::new();

/// Idempotent process-wide constructor.
///
/// The first call builds the facade and starts the handshake; every later
/// call returns the same instance and ignores its arguments. Must be called
/// from within a tokio runtime.
pub fn init(transport: Arc<dyn Transport>, options: ClientOptions) -> Arc<Client> {
    CLIENT
        .get_or_init(|| {
            Client::new(transport, options)
                .expect("framegate capability managers declare overlapping event types")
        })
        .clone()
}
