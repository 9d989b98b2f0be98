//! Source-control metadata lookup.
//!
//! The session only needs the current branch name and a remote fetch URL,
//! so rather than depending on a git library we read the two files that
//! hold them. Every failure is a [`ContextError`]: logged by the caller,
//! never surfaced.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use beacon_common::ContextError;
use tracing::debug;

/// One repository as seen by the source-control provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Whether this is the repository the editor currently has selected.
    pub selected: bool,
    pub branch: Option<String>,
    pub remote_url: Option<String>,
}

/// Seam for source-control integration; production reads the filesystem,
/// tests return canned values.
#[async_trait]
pub trait RepoProvider: Send + Sync {
    async fn repositories(&self) -> Result<Vec<Repository>, ContextError>;
}

/// Reads repository metadata from a `.git` directory.
pub struct GitDirProvider {
    root: PathBuf,
}

impl GitDirProvider {
    /// `root` is the workspace root; the provider looks for `root/.git`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the actual git directory, following a `gitdir:` file
    /// (worktrees and submodules store one instead of a directory).
    async fn git_dir(&self) -> Result<PathBuf, ContextError> {
        let dot_git = self.root.join(".git");
        let meta = tokio::fs::metadata(&dot_git)
            .await
            .map_err(|e| ContextError::Git(format!("{}: {e}", dot_git.display())))?;
        if meta.is_dir() {
            return Ok(dot_git);
        }

        let content = tokio::fs::read_to_string(&dot_git)
            .await
            .map_err(|e| ContextError::Git(format!("{}: {e}", dot_git.display())))?;
        let target = content
            .strip_prefix("gitdir:")
            .map(str::trim)
            .ok_or_else(|| ContextError::Git(format!("{} is not a gitdir link", dot_git.display())))?;
        let target = PathBuf::from(target);
        Ok(if target.is_absolute() {
            target
        } else {
            self.root.join(target)
        })
    }

    /// The directory holding `config`; worktree git dirs point at the
    /// main one through a `commondir` file.
    async fn common_dir(&self, git_dir: &Path) -> PathBuf {
        match tokio::fs::read_to_string(git_dir.join("commondir")).await {
            Ok(rel) => {
                let rel = rel.trim();
                let p = PathBuf::from(rel);
                if p.is_absolute() {
                    p
                } else {
                    git_dir.join(p)
                }
            }
            Err(_) => git_dir.to_path_buf(),
        }
    }
}

#[async_trait]
impl RepoProvider for GitDirProvider {
    async fn repositories(&self) -> Result<Vec<Repository>, ContextError> {
        let git_dir = self.git_dir().await?;

        let branch = match tokio::fs::read_to_string(git_dir.join("HEAD")).await {
            Ok(head) => parse_head(&head),
            Err(e) => {
                debug!("could not read HEAD in {}: {e}", git_dir.display());
                None
            }
        };

        let common = self.common_dir(&git_dir).await;
        let remote_url = match tokio::fs::read_to_string(common.join("config")).await {
            Ok(config) => parse_remote_url(&config),
            Err(e) => {
                debug!("could not read git config in {}: {e}", common.display());
                None
            }
        };

        Ok(vec![Repository {
            selected: true,
            branch,
            remote_url,
        }])
    }
}

/// Branch name from a HEAD file; detached HEADs have none.
fn parse_head(head: &str) -> Option<String> {
    head.trim()
        .strip_prefix("ref: refs/heads/")
        .map(|b| b.to_string())
}

/// First fetch URL from a git config, preferring `origin`.
fn parse_remote_url(config: &str) -> Option<String> {
    let mut current_remote: Option<String> = None;
    let mut first_url: Option<String> = None;

    for line in config.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            current_remote = line
                .strip_prefix("[remote \"")
                .and_then(|rest| rest.strip_suffix("\"]"))
                .map(|name| name.to_string());
        } else if current_remote.is_some() {
            if let Some(url) = line.strip_prefix("url")
                .and_then(|rest| rest.trim_start().strip_prefix('='))
            {
                let url = url.trim().to_string();
                if current_remote.as_deref() == Some("origin") {
                    return Some(url);
                }
                first_url.get_or_insert(url);
            }
        }
    }
    first_url
}
