//! Config file watching.

mod config_watcher;

pub use config_watcher::ConfigWatcher;
