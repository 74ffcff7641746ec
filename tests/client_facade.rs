//! End-to-end facade behavior against a scripted host.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::time::timeout;

use common::MockTransport;
use framegate::{Client, ClientOptions, Error, EventType};

const WAIT: Duration = Duration::from_secs(2);

/// Build a client, complete the handshake, and grant the given features.
async fn connected_client(features: &[&str]) -> (Arc<Client>, Arc<MockTransport>) {
    common::init_logging();
    let transport = MockTransport::new();
    let client = Client::new(transport.clone(), ClientOptions::default()).unwrap();
    transport.until_connected().await;
    transport.host_init(json!({"app": {"features": features, "debug": false}}));
    client.get_context().await;
    (client, transport)
}

/// Wait until the client has seen `generation` context resolutions.
async fn wait_for_generation(client: &Client, generation: u64) {
    timeout(WAIT, async {
        while client.context_generation() < generation {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("context generation never advanced");
}

#[tokio::test]
async fn context_waiters_before_and_after_handshake_agree() {
    let transport = MockTransport::new();
    let client = Client::new(transport.clone(), ClientOptions::default()).unwrap();

    let early = {
        let client = client.clone();
        tokio::spawn(async move { client.get_context().await })
    };
    tokio::task::yield_now().await;

    transport.until_connected().await;
    transport.host_init(json!({"app": {"features": ["modal"]}}));

    let early = timeout(WAIT, early).await.unwrap().unwrap();
    let late = client.get_context().await;
    assert_eq!(early, late);
}

#[tokio::test]
async fn subscriptions_made_before_handshake_receive_events() {
    let transport = MockTransport::new();
    let client = Client::new(transport.clone(), ClientOptions::default()).unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
    let _sub = client.on(EventType::ModalOpened, move |envelope| {
        let _ = tx.send(envelope.data.clone());
    });

    transport.until_connected().await;
    transport.host_init(json!({"app": {"features": ["modal"]}}));
    client.get_context().await;
    transport.host_emit("modal.opened", json!({"key": "settings"}));

    let data = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(data, json!({"key": "settings"}));
}

#[tokio::test]
async fn unsubscribed_handler_misses_later_dispatches() {
    let (client, transport) = connected_client(&["modal"]).await;

    let (removed_tx, mut removed_rx) = mpsc::unbounded_channel::<()>();
    let mut removed = client.on(EventType::ModalClosed, move |_| {
        let _ = removed_tx.send(());
    });
    let (kept_tx, mut kept_rx) = mpsc::unbounded_channel::<()>();
    let _kept = client.on(EventType::ModalClosed, move |_| {
        let _ = kept_tx.send(());
    });

    removed.unsubscribe();
    removed.unsubscribe();

    transport.host_emit("modal.closed", json!({}));
    timeout(WAIT, kept_rx.recv()).await.unwrap().unwrap();
    assert!(removed_rx.try_recv().is_err());
}

#[tokio::test]
async fn unknown_inbound_names_do_not_stall_the_loop() {
    let (client, transport) = connected_client(&["modal"]).await;

    let (tx, mut rx) = mpsc::unbounded_channel::<()>();
    let _sub = client.on(EventType::ModalOpened, move |_| {
        let _ = tx.send(());
    });

    transport.host_emit("modal.destroy", json!({}));
    transport.host_emit("modal.opened", json!({}));

    timeout(WAIT, rx.recv()).await.unwrap().unwrap();
}

#[tokio::test]
async fn subscribing_to_an_unrouted_event_is_inert() {
    let (client, _transport) = connected_client(&["modal"]).await;

    // OpenModal is trigger-side only; nothing subscribes to it.
    let mut sub = client.on(EventType::OpenModal, |_| {});
    sub.unsubscribe();
    sub.unsubscribe();
}

#[tokio::test]
async fn triggering_an_unrouted_event_is_a_logged_noop() {
    let (client, transport) = connected_client(&["modal", "navigation"]).await;

    // ModalOpened is subscribe-side only.
    client
        .trigger_event(EventType::ModalOpened, json!({}))
        .await
        .unwrap();
    assert!(transport.channel.sent_events().is_empty());
}

#[tokio::test]
async fn enabled_trigger_forwards_the_exact_pair() {
    let (client, transport) = connected_client(&["modal"]).await;

    let data = json!({"reason": "user-dismissed"});
    client
        .trigger_event(EventType::CloseModal, data.clone())
        .await
        .unwrap();

    assert_eq!(
        transport.channel.sent_events(),
        vec![(EventType::CloseModal, data)]
    );
}

#[tokio::test]
async fn trigger_queues_until_the_handshake_resolves() {
    let transport = MockTransport::new();
    let client = Client::new(transport.clone(), ClientOptions::default()).unwrap();

    let pending = {
        let client = client.clone();
        tokio::spawn(async move { client.trigger_event(EventType::ReloadFrame, Value::Null).await })
    };
    tokio::task::yield_now().await;
    assert!(transport.channel.sent_events().is_empty());

    transport.until_connected().await;
    transport.host_init(json!({"app": {"features": ["navigation"]}}));

    timeout(WAIT, pending).await.unwrap().unwrap().unwrap();
    assert_eq!(
        transport.channel.sent_events(),
        vec![(EventType::ReloadFrame, Value::Null)]
    );
}

#[tokio::test]
async fn modal_open_rejects_without_the_grant() {
    let (client, transport) = connected_client(&["navigation"]).await;

    let err = client
        .modal()
        .open(framegate::OpenModalParams {
            key: "settings".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CapabilityNotEnabled { .. }));
    assert_eq!(transport.channel.request_count(), 0);
}

#[tokio::test]
async fn modal_open_round_trips_when_granted() {
    let (client, transport) = connected_client(&["modal"]).await;
    *transport.channel.response.lock().unwrap() = json!({"modalId": "m-7"});

    let response = client
        .modal()
        .open(framegate::OpenModalParams {
            key: "settings".into(),
            title: Some("Settings".into()),
            params: None,
        })
        .await
        .unwrap();

    assert_eq!(response, json!({"modalId": "m-7"}));
    let requests = transport.channel.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, EventType::OpenModal);
    assert_eq!(requests[0].1["key"], "settings");
}

#[tokio::test]
async fn malformed_modal_open_never_reaches_the_transport() {
    let (client, transport) = connected_client(&["modal"]).await;

    let err = client
        .modal()
        .open(framegate::OpenModalParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
    assert_eq!(transport.channel.request_count(), 0);
}

#[tokio::test]
async fn navigation_methods_forward_when_granted() {
    let (client, transport) = connected_client(&["navigation"]).await;

    client.navigation().navigate_to("/inbox").await.unwrap();
    client.navigation().reload().await.unwrap();

    let sent = transport.channel.sent_events();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0, EventType::NavigateToUrl);
    assert_eq!(sent[0].1, json!({"url": "/inbox"}));
    assert_eq!(sent[1].0, EventType::ReloadFrame);
}

#[tokio::test]
async fn context_change_replaces_wholesale_and_regates_capabilities() {
    let (client, transport) = connected_client(&["modal"]).await;
    client.modal().close().await.unwrap();

    // Replacement payload carries no `app` key; it must win verbatim.
    transport.host_emit("context.changed", json!({"data": "new context"}));
    wait_for_generation(&client, 2).await;

    let context = client.get_context().await;
    assert_eq!(*context.payload(), json!({"data": "new context"}));

    // The replaced context grants nothing; the next call must observe that.
    let err = client.modal().close().await.unwrap_err();
    assert!(matches!(err, Error::CapabilityNotEnabled { .. }));
}
