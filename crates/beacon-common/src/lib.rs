pub mod errors;
pub mod events;
pub mod id;
pub mod notifications;
pub mod types;

pub use errors::{
    BeaconError, ConfigError, ContextError, CoordinationError, TransportError,
};
pub use events::{EditorBus, EditorEvent};
pub use id::new_instance_id;
pub use notifications::{Notification, NotificationLevel};
pub use types::{DocumentContext, WorkspaceContext};

pub type Result<T> = std::result::Result<T, BeaconError>;
