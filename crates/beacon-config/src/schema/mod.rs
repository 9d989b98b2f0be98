//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod app;
mod connection;
mod coordination;
mod display;
mod idle;
mod logging;
mod notifications;
mod templates;

pub use app::*;
pub use connection::*;
pub use coordination::*;
pub use display::*;
pub use idle::*;
pub use logging::*;
pub use notifications::*;
pub use templates::*;

use serde::{Deserialize, Serialize};

/// Root configuration.
///
/// Only override what you want to change; missing sections and fields
/// take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    pub app: AppConfig,
    pub templates: TemplateConfig,
    pub display: DisplayConfig,
    pub idle: IdleConfig,
    pub connection: ConnectionConfig,
    pub coordination: CoordinationConfig,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
}
