//! Activity (presence payload) construction.

mod builder;
mod images;
mod repository;
mod types;

pub use builder::{build_activity, BuildContext, PresenceMode};
pub use images::{base_icon, file_icon, ImagePair};
pub use repository::{normalize_remote_url, repo_name_from_url};
pub use types::{Activity, Assets, Button, Timestamps};
