use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use beacon_common::{DocumentContext, EditorBus, EditorEvent, TransportError};
use beacon_config::BeaconConfig;
use tokio::sync::{mpsc, watch};

use crate::coordinator::{Coordinator, MemoryInstanceStore};
use crate::rpc::fake::FakeConnect;
use crate::rpc::{Connect, ConnectionState};

use super::{PresenceSession, SessionDeps, SessionEvent, SessionHandle};

struct Harness {
    bus: Arc<EditorBus>,
    connector: Arc<FakeConnect>,
    _config_tx: watch::Sender<BeaconConfig>,
    handle: SessionHandle,
    events: mpsc::Receiver<SessionEvent>,
}

fn test_config() -> BeaconConfig {
    let mut config = BeaconConfig::default();
    config.connection.update_throttle_ms = 200;
    config.connection.reconnect_delay_secs = 1;
    config
}

fn doc(name: &str) -> DocumentContext {
    DocumentContext {
        path: PathBuf::from(format!("/ws/{name}")),
        language_id: "rust".into(),
        line: 1,
        column: 1,
        line_count: 100,
    }
}

async fn start_with(config: BeaconConfig, connector: Arc<FakeConnect>) -> Harness {
    let bus = Arc::new(EditorBus::new(64));
    let (config_tx, config_rx) = watch::channel(config);
    let coordinator = Arc::new(Coordinator::new(
        Arc::new(MemoryInstanceStore::new()),
        None,
        "test-workspace",
    ));
    let deps = SessionDeps {
        bus: Arc::clone(&bus),
        config_rx,
        connector: Arc::clone(&connector) as Arc<dyn Connect>,
        repo_provider: None,
        coordinator,
    };
    let (handle, events) = PresenceSession::start(deps);
    Harness {
        bus,
        connector,
        _config_tx: config_tx,
        handle,
        events,
    }
}

async fn start(config: BeaconConfig) -> Harness {
    start_with(config, Arc::new(FakeConnect::new())).await
}

async fn wait_for(
    events: &mut mpsc::Receiver<SessionEvent>,
    pred: impl Fn(&SessionEvent) -> bool,
) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match events.recv().await {
                Some(event) if pred(&event) => return event,
                Some(_) => continue,
                None => panic!("session event stream ended"),
            }
        }
    })
    .await
    .expect("timed out waiting for session event")
}

#[tokio::test]
async fn ready_triggers_exactly_one_initial_broadcast() {
    let mut h = start(test_config()).await;
    wait_for(&mut h.events, |e| matches!(e, SessionEvent::Ready)).await;

    let calls = h.connector.log.wait_for_activity_calls(1).await;
    let initial = calls[0].as_ref().expect("initial broadcast sets a payload");
    assert_eq!(initial.details.as_deref(), Some("Idling"));

    // No further broadcasts without a signal.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(h.connector.log.activity_count().await, 1);
    h.handle.stop().await;
}

#[tokio::test]
async fn editor_change_rebuilds_and_preserves_timestamp() {
    let mut h = start(test_config()).await;
    wait_for(&mut h.events, |e| matches!(e, SessionEvent::Ready)).await;
    h.connector.log.wait_for_activity_calls(1).await;

    h.bus
        .publish(EditorEvent::ActiveEditorChanged(Some(doc("main.rs"))));

    let calls = h.connector.log.wait_for_activity_calls(2).await;
    let second = calls[1].as_ref().unwrap();
    assert_eq!(second.details.as_deref(), Some("Editing main.rs"));
    // The elapsed-time anchor survives the rebuild.
    assert_eq!(
        calls[0].as_ref().unwrap().timestamps,
        second.timestamps
    );
    h.handle.stop().await;
}

#[tokio::test]
async fn document_edit_bursts_collapse_to_one_rebuild() {
    let mut h = start(test_config()).await;
    wait_for(&mut h.events, |e| matches!(e, SessionEvent::Ready)).await;
    h.connector.log.wait_for_activity_calls(1).await;

    for i in 0..5 {
        h.bus
            .publish(EditorEvent::DocumentEdited(doc(&format!("f{i}.rs"))));
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // One throttled rebuild for the whole burst, carrying the latest state.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let calls = h.connector.log.wait_for_activity_calls(2).await;
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[1].as_ref().unwrap().details.as_deref(),
        Some("Editing f4.rs")
    );
    h.handle.stop().await;
}

#[tokio::test]
async fn disconnect_releases_subscriptions_before_reconnect() {
    let mut h = start(test_config()).await;
    wait_for(&mut h.events, |e| matches!(e, SessionEvent::Ready)).await;
    assert_eq!(h.bus.receiver_count(), 1);
    assert_eq!(h.connector.connect_count(), 1);

    h.connector.close_current().await;
    wait_for(&mut h.events, |e| matches!(e, SessionEvent::Disconnected { .. })).await;

    // Every subscription of the dead epoch is gone before the reconnect
    // attempt begins.
    assert_eq!(h.bus.receiver_count(), 0);
    assert_eq!(h.connector.connect_count(), 1);

    wait_for(&mut h.events, |e| matches!(e, SessionEvent::Ready)).await;
    assert_eq!(h.connector.connect_count(), 2);
    assert_eq!(h.bus.receiver_count(), 1);
    h.handle.stop().await;
}

#[tokio::test]
async fn idle_timeout_clears_exactly_once() {
    let mut config = test_config();
    config.idle.timeout_secs = 1;
    let mut h = start(config).await;
    wait_for(&mut h.events, |e| matches!(e, SessionEvent::Ready)).await;
    h.connector.log.wait_for_activity_calls(1).await;

    h.bus.publish(EditorEvent::WindowFocusChanged(false));
    wait_for(&mut h.events, |e| matches!(e, SessionEvent::IdleCleared)).await;

    let calls = h.connector.log.wait_for_activity_calls(2).await;
    assert!(calls[1].is_none(), "idle expiry sends one clear");
    assert_eq!(h.handle.connection_state(), ConnectionState::IdleCleared);

    // No repeated clears while still unfocused.
    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert_eq!(h.connector.log.activity_count().await, 2);

    // Refocus rebuilds with a fresh payload.
    h.bus.publish(EditorEvent::WindowFocusChanged(true));
    let calls = h.connector.log.wait_for_activity_calls(3).await;
    assert!(calls[2].is_some());
    h.handle.stop().await;
}

#[tokio::test]
async fn refocus_before_timeout_cancels_clear_and_rebuilds_once() {
    let mut config = test_config();
    config.idle.timeout_secs = 1;
    let mut h = start(config).await;
    wait_for(&mut h.events, |e| matches!(e, SessionEvent::Ready)).await;
    h.connector.log.wait_for_activity_calls(1).await;

    h.bus.publish(EditorEvent::WindowFocusChanged(false));
    tokio::time::sleep(Duration::from_millis(300)).await;
    h.bus.publish(EditorEvent::WindowFocusChanged(true));

    // Past where the timer would have fired.
    tokio::time::sleep(Duration::from_millis(1200)).await;
    let calls = h.connector.log.wait_for_activity_calls(2).await;
    assert_eq!(calls.len(), 2, "exactly one rebuild from the refocus");
    assert!(calls.iter().all(|c| c.is_some()), "no clears");
    h.handle.stop().await;
}

#[tokio::test]
async fn zero_idle_timeout_disables_clearing() {
    let mut config = test_config();
    config.idle.timeout_secs = 0;
    let mut h = start(config).await;
    wait_for(&mut h.events, |e| matches!(e, SessionEvent::Ready)).await;
    h.connector.log.wait_for_activity_calls(1).await;

    h.bus.publish(EditorEvent::WindowFocusChanged(false));
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(h.connector.log.activity_count().await, 1);
    h.handle.stop().await;
}

#[tokio::test]
async fn coordination_denial_suppresses_broadcasts() {
    let mut config = test_config();
    config.coordination.enabled = true;
    config.coordination.active_instance = "1-2-someoneelse".into();
    let mut h = start(config).await;
    wait_for(&mut h.events, |e| matches!(e, SessionEvent::Ready)).await;

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(h.connector.log.activity_count().await, 0);
    h.handle.stop().await;
}

#[tokio::test]
async fn disable_clears_and_closes_enable_reconnects() {
    let mut h = start(test_config()).await;
    wait_for(&mut h.events, |e| matches!(e, SessionEvent::Ready)).await;
    h.connector.log.wait_for_activity_calls(1).await;

    h.handle.set_enabled(false).await;
    let calls = h.connector.log.wait_for_activity_calls(2).await;
    assert!(calls[1].is_none(), "disable clears the payload");
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(h.handle.connection_state(), ConnectionState::Disconnected);
    assert_eq!(h.connector.connect_count(), 1);

    h.handle.set_enabled(true).await;
    wait_for(&mut h.events, |e| matches!(e, SessionEvent::Ready)).await;
    assert_eq!(h.connector.connect_count(), 2);
    h.connector.log.wait_for_activity_calls(3).await;
    h.handle.stop().await;
}

#[tokio::test]
async fn failed_connect_reports_and_retries() {
    let connector = Arc::new(FakeConnect::new());
    connector.set_failing(true);
    let mut h = start_with(test_config(), connector).await;

    let failure = wait_for(&mut h.events, |e| {
        matches!(e, SessionEvent::TransportFailure(_))
    })
    .await;
    match failure {
        SessionEvent::TransportFailure(e) => {
            assert!(matches!(e, TransportError::PeerUnavailable(_)));
        }
        _ => unreachable!(),
    }
    wait_for(&mut h.events, |e| {
        matches!(e, SessionEvent::Reconnecting { delay_secs: 1 })
    })
    .await;

    h.connector.set_failing(false);
    wait_for(&mut h.events, |e| matches!(e, SessionEvent::Ready)).await;
    assert_eq!(h.connector.connect_count(), 1);
    h.handle.stop().await;
}

#[tokio::test]
async fn manual_reconnect_starts_a_fresh_epoch() {
    let mut h = start(test_config()).await;
    wait_for(&mut h.events, |e| matches!(e, SessionEvent::Ready)).await;
    h.connector.log.wait_for_activity_calls(1).await;

    h.handle.reconnect().await;
    wait_for(&mut h.events, |e| matches!(e, SessionEvent::Ready)).await;
    assert_eq!(h.connector.connect_count(), 2);
    assert_eq!(h.bus.receiver_count(), 1);
    h.handle.stop().await;
}

#[tokio::test]
async fn stop_shuts_down_cleanly() {
    let h = start(test_config()).await;
    let mut events = h.events;
    wait_for(&mut events, |e| matches!(e, SessionEvent::Ready)).await;
    h.handle.stop().await;
    assert_eq!(h.bus.receiver_count(), 0);
}
