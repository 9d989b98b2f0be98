mod cli;
mod commands;
mod feed;

use std::path::PathBuf;
use std::sync::Arc;

use beacon_common::{EditorBus, Notification, NotificationLevel};
use beacon_config::{default_config_path, toml_loader, ReloadManager};
use beacon_presence::coordinator::FsInstanceStore;
use beacon_presence::{
    Coordinator, IpcSocketConnector, PresenceSession, SessionDeps, SessionEvent,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = cli::parse();

    let config_path = match &args.config {
        Some(path) => PathBuf::from(path),
        None => match default_config_path() {
            Ok(path) => path,
            Err(e) => {
                eprintln!("cannot resolve config path: {e}");
                std::process::exit(1);
            }
        },
    };

    if !config_path.exists() {
        if let Err(e) = toml_loader::create_default_config(&config_path) {
            eprintln!("cannot create config at {}: {e}", config_path.display());
        }
    }

    // Logging: CLI override, then config, then info.
    let level = args.log_level.clone().unwrap_or_else(|| {
        beacon_config::load_from_path(&config_path)
            .map(|c| c.logging.level.as_str().to_string())
            .unwrap_or_else(|_| "info".into())
    });
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with_writer(std::io::stderr)
        .init();

    match args.command.unwrap_or(cli::Command::Run) {
        cli::Command::Run => run(config_path).await,
        cli::Command::Enable => {
            if let Err(e) = commands::set_enabled(&config_path, true) {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        cli::Command::Disable => {
            if let Err(e) = commands::set_enabled(&config_path, false) {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        cli::Command::Instances => commands::print_instances(&config_path).await,
        cli::Command::SetActive { id } => {
            if let Err(e) = commands::set_active(&config_path, &id) {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }
}

async fn run(config_path: PathBuf) {
    tracing::info!(
        "beacon v{} starting, config at {}",
        env!("CARGO_PKG_VERSION"),
        config_path.display()
    );

    let (config, config_rx) = ReloadManager::start(config_path.clone()).await;
    if !config.app.enabled {
        tracing::warn!("presence is disabled in the config; waiting for enable");
    }

    let bus = Arc::new(EditorBus::new(256));
    let store = Arc::new(FsInstanceStore::new(FsInstanceStore::default_dir()));
    let coordinator = Arc::new(Coordinator::new(
        store,
        Some(config_path.clone()),
        "(no workspace)",
    ));

    let notify_rx = config_rx.clone();
    let deps = SessionDeps {
        bus: Arc::clone(&bus),
        config_rx,
        connector: Arc::new(IpcSocketConnector::new()),
        repo_provider: None,
        coordinator: Arc::clone(&coordinator),
    };
    let (handle, mut events) = PresenceSession::start(deps);

    // Surface session events; only transport failures become user-visible
    // notifications, and only when not suppressed.
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                SessionEvent::TransportFailure(e) => {
                    if notify_rx.borrow().notifications.suppress {
                        tracing::debug!("suppressed notification: {e}");
                    } else {
                        print_notification(&Notification::from_transport_error(&e));
                    }
                }
                SessionEvent::Ready => tracing::info!("presence connected"),
                SessionEvent::Disconnected { reason } => {
                    tracing::info!("presence disconnected: {reason}");
                }
                SessionEvent::Reconnecting { delay_secs } => {
                    tracing::info!("reconnecting in {delay_secs}s");
                }
                SessionEvent::IdleCleared => tracing::info!("presence cleared (idle)"),
            }
        }
    });

    feed::run_feed(&bus, &handle, &coordinator, &config_path).await;

    handle.stop().await;
    tracing::info!("shutdown complete");
}

fn print_notification(notification: &Notification) {
    let level = match notification.level {
        NotificationLevel::Info => "info",
        NotificationLevel::Warning => "warning",
        NotificationLevel::Error => "error",
    };
    eprintln!("[{level}] {}: {}", notification.title, notification.body);
}
