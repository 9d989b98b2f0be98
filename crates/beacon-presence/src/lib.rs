//! Core presence engine: template rendering, activity building, instance
//! coordination, the RPC connection to the chat client, and the broadcast
//! session that ties them together.

pub mod activity;
pub mod coordinator;
pub mod git;
pub mod helpers;
pub mod rpc;
pub mod session;
pub mod snapshot;
pub mod template;

pub use activity::{build_activity, Activity, PresenceMode};
pub use coordinator::{Coordinator, FsInstanceStore, InstanceRecord, InstanceStore};
pub use git::{GitDirProvider, RepoProvider, Repository};
pub use rpc::{Connect, ConnectionState, IpcSocketConnector, RpcClient, RpcConfig};
pub use session::{PresenceSession, SessionCommand, SessionDeps, SessionEvent, SessionHandle};
pub use snapshot::EditorSnapshot;
pub use template::{render, SubstitutionContext};
