//! The session loop.
//!
//! Single task, one signal at a time. Editor events are only subscribed
//! while a connection epoch is live, and every epoch's subscriptions are
//! torn down before the next connect — the invariant that prevents a
//! stale epoch from double-delivering a signal.

use std::sync::Arc;

use beacon_common::id::epoch_millis;
use beacon_common::{EditorBus, EditorEvent, TransportError};
use beacon_config::BeaconConfig;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::activity::{build_activity, Activity, BuildContext};
use crate::coordinator::Coordinator;
use crate::git::{GitDirProvider, RepoProvider, Repository};
use crate::rpc::{Connect, ConnectionState, RpcClient, RpcConfig, RpcEvent};
use crate::snapshot::EditorSnapshot;

use super::{SessionCommand, SessionDeps, SessionEvent};

/// What one `select!` round resolved to. Handlers run after the select so
/// they get unrestricted access to the epoch receivers.
enum Step {
    Command(Option<SessionCommand>),
    ConfigChanged,
    ConfigClosed,
    Rpc(Option<RpcEvent>),
    Editor(Result<EditorEvent, broadcast::error::RecvError>),
    IdleFired,
    ThrottleFired,
    ReconnectDue,
}

pub(super) async fn run(
    deps: SessionDeps,
    mut command_rx: mpsc::Receiver<SessionCommand>,
    event_tx: mpsc::Sender<SessionEvent>,
    state_tx: watch::Sender<ConnectionState>,
) {
    let mut config_events = deps.config_rx.clone();
    let mut config_closed = false;

    let mut runner = Runner {
        bus: Arc::clone(&deps.bus),
        config_rx: deps.config_rx,
        connector: deps.connector,
        repo_provider: deps.repo_provider,
        coordinator: deps.coordinator,
        event_tx,
        state_tx,
        snapshot: EditorSnapshot::default(),
        previous: None,
        client: None,
        idle_deadline: None,
        idle_cleared: false,
        throttle_deadline: None,
        reconnect_at: None,
        backoff_secs: 0,
        manual_disconnect: false,
        was_active: false,
        enabled: false,
        epoch_ready: false,
    };

    // Epoch-scoped receivers live outside the runner so select! can poll
    // them while handlers mutate the rest.
    let mut rpc_rx: Option<mpsc::Receiver<RpcEvent>> = None;
    let mut editor_rx: Option<broadcast::Receiver<EditorEvent>> = None;

    let heartbeat = runner.coordinator.spawn_heartbeat();
    runner.enabled = runner.config().app.enabled;
    if runner.enabled {
        runner.connect(&mut rpc_rx, &mut editor_rx).await;
    }

    loop {
        let step = tokio::select! {
            cmd = command_rx.recv() => Step::Command(cmd),
            changed = config_events.changed(), if !config_closed => match changed {
                Ok(()) => Step::ConfigChanged,
                Err(_) => Step::ConfigClosed,
            },
            event = recv_rpc(&mut rpc_rx) => Step::Rpc(event),
            event = recv_editor(&mut editor_rx) => Step::Editor(event),
            _ = sleep_opt(runner.idle_deadline) => Step::IdleFired,
            _ = sleep_opt(runner.throttle_deadline) => Step::ThrottleFired,
            _ = sleep_opt(runner.reconnect_at) => Step::ReconnectDue,
        };

        match step {
            Step::Command(Some(SessionCommand::Reconnect)) => {
                runner.manual_disconnect = false;
                runner.backoff_secs = 0;
                runner.connect(&mut rpc_rx, &mut editor_rx).await;
            }
            Step::Command(Some(SessionCommand::Disconnect)) => {
                runner.manual_disconnect = true;
                runner
                    .disconnect_gracefully(&mut rpc_rx, &mut editor_rx, false)
                    .await;
            }
            Step::Command(Some(SessionCommand::SetEnabled(true))) => {
                runner.enabled = true;
                runner.manual_disconnect = false;
                runner.backoff_secs = 0;
                if runner.client.is_none() {
                    runner.connect(&mut rpc_rx, &mut editor_rx).await;
                }
            }
            Step::Command(Some(SessionCommand::SetEnabled(false))) => {
                runner.enabled = false;
                runner
                    .disconnect_gracefully(&mut rpc_rx, &mut editor_rx, true)
                    .await;
            }
            Step::Command(Some(SessionCommand::Stop)) | Step::Command(None) => break,
            Step::ConfigChanged => {
                runner.on_config_changed(&mut rpc_rx, &mut editor_rx).await;
            }
            Step::ConfigClosed => {
                debug!("config source closed, keeping last known config");
                config_closed = true;
            }
            Step::Rpc(Some(event)) => {
                if runner
                    .on_rpc_event(event, &mut rpc_rx, &mut editor_rx)
                    .await
                    .is_break()
                {
                    break;
                }
            }
            Step::Rpc(None) => {
                // The epoch task ended without a final event.
                let _ = runner
                    .on_rpc_event(
                        RpcEvent::Disconnected {
                            reason: "connection task ended".into(),
                        },
                        &mut rpc_rx,
                        &mut editor_rx,
                    )
                    .await;
            }
            Step::Editor(Ok(event)) => {
                if runner.on_editor_event(event).await.is_break() {
                    break;
                }
            }
            Step::Editor(Err(broadcast::error::RecvError::Lagged(n))) => {
                warn!("editor bus lagged by {n} events, rebuilding from snapshot");
                runner.rebuild_and_send().await;
            }
            Step::Editor(Err(broadcast::error::RecvError::Closed)) => {
                debug!("editor bus closed");
                editor_rx = None;
            }
            Step::IdleFired => runner.on_idle_timeout().await,
            Step::ThrottleFired => {
                runner.throttle_deadline = None;
                runner.rebuild_and_send().await;
            }
            Step::ReconnectDue => {
                runner.reconnect_at = None;
                if runner.enabled && !runner.manual_disconnect {
                    runner.connect(&mut rpc_rx, &mut editor_rx).await;
                }
            }
        }
    }

    runner
        .disconnect_gracefully(&mut rpc_rx, &mut editor_rx, true)
        .await;
    heartbeat.abort();
    runner.coordinator.shutdown().await;
    info!("presence session stopped");
}

async fn recv_rpc(rx: &mut Option<mpsc::Receiver<RpcEvent>>) -> Option<RpcEvent> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn recv_editor(
    rx: &mut Option<broadcast::Receiver<EditorEvent>>,
) -> Result<EditorEvent, broadcast::error::RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn sleep_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

struct Runner {
    bus: Arc<EditorBus>,
    config_rx: watch::Receiver<BeaconConfig>,
    connector: Arc<dyn Connect>,
    repo_provider: Option<Arc<dyn RepoProvider>>,
    coordinator: Arc<Coordinator>,
    event_tx: mpsc::Sender<SessionEvent>,
    state_tx: watch::Sender<ConnectionState>,

    snapshot: EditorSnapshot,
    previous: Option<Activity>,
    client: Option<RpcClient>,

    idle_deadline: Option<Instant>,
    idle_cleared: bool,
    throttle_deadline: Option<Instant>,
    reconnect_at: Option<Instant>,
    backoff_secs: u64,
    manual_disconnect: bool,
    was_active: bool,
    enabled: bool,
    /// Whether the current epoch got past the handshake; a disconnect
    /// before that is a connect failure, not a lost connection.
    epoch_ready: bool,
}

impl Runner {
    fn config(&self) -> BeaconConfig {
        self.config_rx.borrow().clone()
    }

    fn set_state(&self, state: ConnectionState) {
        let _ = self.state_tx.send(state);
    }

    async fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.send(event).await;
    }

    /// Start a fresh connection epoch. Always tears the previous one down
    /// first so no stale subscription survives into the new epoch.
    async fn connect(
        &mut self,
        rpc_rx: &mut Option<mpsc::Receiver<RpcEvent>>,
        editor_rx: &mut Option<broadcast::Receiver<EditorEvent>>,
    ) {
        self.teardown(rpc_rx, editor_rx);
        self.set_state(ConnectionState::Connecting);
        self.epoch_ready = false;

        let config = self.config();
        match self.connector.connect().await {
            Ok(wire) => {
                let (client, events) = RpcClient::start(
                    RpcConfig {
                        application_id: config.app.application_id.clone(),
                    },
                    wire,
                );
                self.client = Some(client);
                *rpc_rx = Some(events);
                *editor_rx = Some(self.bus.subscribe());
            }
            Err(e) => {
                self.set_state(ConnectionState::Disconnected);
                warn!("connect failed: {e}");
                self.emit(SessionEvent::TransportFailure(e)).await;
                self.schedule_reconnect(&config).await;
            }
        }
    }

    /// Hard teardown: abort the epoch task and drop every subscription.
    fn teardown(
        &mut self,
        rpc_rx: &mut Option<mpsc::Receiver<RpcEvent>>,
        editor_rx: &mut Option<broadcast::Receiver<EditorEvent>>,
    ) {
        if let Some(client) = self.client.take() {
            client.abort();
        }
        *rpc_rx = None;
        *editor_rx = None;
        self.idle_deadline = None;
        self.throttle_deadline = None;
        self.reconnect_at = None;
    }

    /// Graceful close: optionally clear the payload, let the connection
    /// task drain and exit on its own, then drop the subscriptions.
    async fn disconnect_gracefully(
        &mut self,
        rpc_rx: &mut Option<mpsc::Receiver<RpcEvent>>,
        editor_rx: &mut Option<broadcast::Receiver<EditorEvent>>,
        clear_first: bool,
    ) {
        if let Some(client) = self.client.take() {
            if clear_first {
                client.clear_activity().await;
            }
            client.disconnect().await;
        }
        *rpc_rx = None;
        *editor_rx = None;
        self.idle_deadline = None;
        self.throttle_deadline = None;
        self.reconnect_at = None;
        self.previous = None;
        self.set_state(ConnectionState::Disconnected);
    }

    async fn schedule_reconnect(&mut self, config: &BeaconConfig) {
        if !config.connection.auto_reconnect || !self.enabled || self.manual_disconnect {
            return;
        }
        let base = config.connection.reconnect_delay_secs.max(1);
        let delay = if self.backoff_secs == 0 {
            base
        } else {
            self.backoff_secs
        };
        self.backoff_secs = (delay * 2).min(config.connection.max_reconnect_delay_secs.max(base));
        self.reconnect_at = Some(Instant::now() + Duration::from_secs(delay));
        info!(delay, "reconnecting in {delay} seconds");
        self.emit(SessionEvent::Reconnecting { delay_secs: delay }).await;
    }

    async fn on_rpc_event(
        &mut self,
        event: RpcEvent,
        rpc_rx: &mut Option<mpsc::Receiver<RpcEvent>>,
        editor_rx: &mut Option<broadcast::Receiver<EditorEvent>>,
    ) -> std::ops::ControlFlow<()> {
        match event {
            RpcEvent::Ready => {
                info!("connected to the chat client");
                self.epoch_ready = true;
                self.backoff_secs = 0;
                self.idle_cleared = false;
                self.set_state(ConnectionState::Connected);
                self.emit(SessionEvent::Ready).await;
                // A fresh epoch starts with one immediate broadcast.
                self.rebuild_and_send().await;
            }
            RpcEvent::ProtocolError(message) => {
                self.emit(SessionEvent::TransportFailure(TransportError::Protocol(
                    message,
                )))
                .await;
            }
            RpcEvent::Disconnected { reason } => {
                info!("disconnected: {reason}");
                // Release every subscription of this epoch before anything
                // else; a reconnect must start from zero.
                self.teardown(rpc_rx, editor_rx);
                self.set_state(ConnectionState::Disconnected);
                if self.epoch_ready {
                    self.emit(SessionEvent::Disconnected { reason }).await;
                } else {
                    self.emit(SessionEvent::TransportFailure(TransportError::Handshake(
                        reason,
                    )))
                    .await;
                }
                let config = self.config();
                self.schedule_reconnect(&config).await;
            }
        }
        std::ops::ControlFlow::Continue(())
    }

    async fn on_editor_event(&mut self, event: EditorEvent) -> std::ops::ControlFlow<()> {
        match event {
            EditorEvent::Shutdown => return std::ops::ControlFlow::Break(()),
            EditorEvent::WindowFocusChanged(focused) => {
                self.snapshot.apply(&EditorEvent::WindowFocusChanged(focused));
                if focused {
                    let pending_clear = self.idle_deadline.is_some() || self.idle_cleared;
                    self.idle_deadline = None;
                    if pending_clear {
                        self.rebuild_and_send().await;
                    }
                } else {
                    let timeout = self.config().idle.timeout_secs;
                    if timeout > 0 && self.client.is_some() {
                        self.idle_deadline =
                            Some(Instant::now() + Duration::from_secs(timeout));
                    }
                }
            }
            EditorEvent::DocumentEdited(doc) => {
                self.snapshot.apply(&EditorEvent::DocumentEdited(doc));
                // Trailing-edge throttle: the first edit of a burst arms
                // the timer, the rest ride along until it fires.
                if self.client.is_some() && self.throttle_deadline.is_none() {
                    let window = self.config().connection.update_throttle_ms;
                    self.throttle_deadline =
                        Some(Instant::now() + Duration::from_millis(window));
                }
            }
            event => {
                if let EditorEvent::WorkspaceChanged(Some(ws)) = &event {
                    self.coordinator.set_workspace_name(&ws.name);
                }
                if self.snapshot.apply(&event) {
                    self.rebuild_and_send().await;
                }
            }
        }
        std::ops::ControlFlow::Continue(())
    }

    async fn on_config_changed(
        &mut self,
        rpc_rx: &mut Option<mpsc::Receiver<RpcEvent>>,
        editor_rx: &mut Option<broadcast::Receiver<EditorEvent>>,
    ) {
        let config = self.config();

        if self.enabled && !config.app.enabled {
            info!("presence disabled by configuration");
            self.enabled = false;
            self.disconnect_gracefully(rpc_rx, editor_rx, true).await;
            return;
        }
        if !self.enabled && config.app.enabled {
            info!("presence enabled by configuration");
            self.enabled = true;
            self.manual_disconnect = false;
            self.backoff_secs = 0;
            self.connect(rpc_rx, editor_rx).await;
            return;
        }

        // Template, display, or coordination changes take effect on the
        // next rebuild; do one now if we hold a connection.
        if self.client.is_some() {
            self.rebuild_and_send().await;
        }
    }

    async fn on_idle_timeout(&mut self) {
        self.idle_deadline = None;
        let Some(client) = self.client.as_ref() else {
            return;
        };
        info!("idle timeout reached, clearing presence");
        client.clear_activity().await;
        self.previous = None;
        self.idle_cleared = true;
        self.set_state(ConnectionState::IdleCleared);
        self.emit(SessionEvent::IdleCleared).await;
    }

    /// Build the current payload and hand it to the connection. Denials
    /// and context failures never abort the cycle.
    async fn rebuild_and_send(&mut self) {
        let Some(client) = self.client.as_ref() else {
            return;
        };
        let config = self.config();
        if !config.app.enabled {
            return;
        }

        if !self.coordinator.is_active(&config.coordination) {
            if self.was_active {
                debug!("lost the active slot, clearing presence");
                client.clear_activity().await;
                self.previous = None;
            }
            self.was_active = false;
            return;
        }
        self.was_active = true;

        let file_size = self.lookup_file_size().await;
        let repo = self.lookup_repo().await;

        let activity = build_activity(&BuildContext {
            previous: self.previous.as_ref(),
            snapshot: &self.snapshot,
            file_size,
            repo: repo.as_ref(),
            config: &config,
            now_ms: epoch_millis(),
        });

        client.set_activity(activity.clone()).await;
        self.previous = Some(activity);
        self.idle_cleared = false;
        self.set_state(ConnectionState::Connected);
    }

    async fn lookup_file_size(&self) -> Option<u64> {
        let doc = self.snapshot.document.as_ref()?;
        match tokio::fs::metadata(&doc.path).await {
            Ok(meta) => Some(meta.len()),
            Err(e) => {
                debug!("file size lookup failed for {}: {e}", doc.path.display());
                None
            }
        }
    }

    async fn lookup_repo(&self) -> Option<Repository> {
        let result = match &self.repo_provider {
            Some(provider) => provider.repositories().await,
            None => {
                let root = self.snapshot.workspace.as_ref()?.root.clone();
                GitDirProvider::new(root).repositories().await
            }
        };
        match result {
            Ok(repos) => {
                let selected = repos.iter().position(|r| r.selected).unwrap_or(0);
                repos.into_iter().nth(selected)
            }
            Err(e) => {
                debug!("repository lookup failed: {e}");
                None
            }
        }
    }
}
