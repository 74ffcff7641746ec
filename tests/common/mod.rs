//! Shared test doubles: a scripted in-process transport.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{json, Value};
use tokio::sync::watch;

use framegate::error::TransportError;
use framegate::events::{EventType, InboundEvent};
use framegate::transport::{Channel, InboundCallbacks, Transport};

/// Route SDK diagnostics to the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Channel that records outbound traffic and answers requests with a
/// canned response.
pub struct MockChannel {
    pub sent: Mutex<Vec<(EventType, Value)>>,
    pub requests: Mutex<Vec<(EventType, Value)>>,
    pub response: Mutex<Value>,
}

impl MockChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            response: Mutex::new(json!({"ok": true})),
        })
    }

    pub fn sent_events(&self) -> Vec<(EventType, Value)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Channel for MockChannel {
    fn send(&self, event: EventType, data: Value) {
        self.sent.lock().unwrap().push((event, data));
    }

    fn request(
        &self,
        event: EventType,
        data: Value,
    ) -> BoxFuture<'static, Result<Value, TransportError>> {
        self.requests.lock().unwrap().push((event, data));
        let response = self.response.lock().unwrap().clone();
        async move { Ok(response) }.boxed()
    }
}

/// Transport whose host side is driven by the test: the test decides when
/// the initial context arrives and which events the host emits.
pub struct MockTransport {
    pub channel: Arc<MockChannel>,
    callbacks: Mutex<Option<InboundCallbacks>>,
    connected: watch::Sender<bool>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        let (connected, _rx) = watch::channel(false);
        Arc::new(Self {
            channel: MockChannel::new(),
            callbacks: Mutex::new(None),
            connected,
        })
    }

    /// Wait until the SDK's handshake driver has called `connect`.
    pub async fn until_connected(&self) {
        let mut rx = self.connected.subscribe();
        while !*rx.borrow_and_update() {
            rx.changed().await.expect("mock transport dropped");
        }
    }

    /// Deliver the host's initial (or replacement) context payload.
    pub fn host_init(&self, payload: Value) {
        let callbacks = self.callbacks.lock().unwrap();
        let callbacks = callbacks.as_ref().expect("connect not called yet");
        (callbacks.init)(payload);
    }

    /// Emit one host event toward the SDK.
    pub fn host_emit(&self, name: &str, data: Value) {
        let callbacks = self.callbacks.lock().unwrap();
        let callbacks = callbacks.as_ref().expect("connect not called yet");
        (callbacks.handle_event)(InboundEvent::new(name, data));
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(
        &self,
        _host: &str,
        callbacks: InboundCallbacks,
    ) -> Result<Arc<dyn Channel>, TransportError> {
        *self.callbacks.lock().unwrap() = Some(callbacks);
        self.connected.send_replace(true);
        Ok(self.channel.clone())
    }
}
