//! Build an [`Activity`] from the current editor snapshot and config.
//!
//! Building is synchronous and pure: every asynchronous lookup (file
//! size, git state) is resolved by the session beforehand and passed in,
//! so identical inputs always produce identical payloads.

use beacon_config::BeaconConfig;
use tracing::debug;

use crate::git::Repository;
use crate::helpers::format_file_size;
use crate::snapshot::EditorSnapshot;
use crate::template::{render, SubstitutionContext};

use super::images::{select_keys, ImagePair};
use super::repository::{normalize_remote_url, repo_name_from_url};
use super::types::{Activity, Assets, Button, Timestamps};

/// Which template variant applies, decided once per build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceMode {
    Idle,
    Editing,
    Debugging,
}

impl PresenceMode {
    /// Debugging requires an active document; without one the debug flag
    /// alone still reads as idling.
    pub fn select(has_document: bool, debugging: bool) -> Self {
        match (has_document, debugging) {
            (false, _) => PresenceMode::Idle,
            (true, true) => PresenceMode::Debugging,
            (true, false) => PresenceMode::Editing,
        }
    }
}

/// Inputs to one build. `now_ms` is passed in rather than sampled so the
/// builder stays deterministic.
pub struct BuildContext<'a> {
    pub previous: Option<&'a Activity>,
    pub snapshot: &'a EditorSnapshot,
    pub file_size: Option<u64>,
    pub repo: Option<&'a Repository>,
    pub config: &'a BeaconConfig,
    pub now_ms: u64,
}

/// Compose the full presence payload.
pub fn build_activity(ctx: &BuildContext) -> Activity {
    let config = ctx.config;
    let hidden = workspace_hidden(config, ctx.snapshot);
    if hidden {
        debug!("workspace matches a hide pattern, rendering as idle");
    }

    let snapshot = ctx.snapshot;
    let document = if hidden { None } else { snapshot.document.as_ref() };
    let repo = if hidden { None } else { ctx.repo };
    let mode = PresenceMode::select(document.is_some(), snapshot.debugging);

    let sub = substitution_context(ctx, hidden);
    let templates = &config.templates;

    let details = line(
        config.display.show_details,
        match mode {
            PresenceMode::Idle => &templates.details_idling,
            PresenceMode::Editing => &templates.details_editing,
            PresenceMode::Debugging => &templates.details_debugging,
        },
        &sub,
    );

    let state = line(
        config.display.show_state,
        match mode {
            PresenceMode::Idle => &templates.state_idling,
            PresenceMode::Editing => &templates.state_editing,
            PresenceMode::Debugging => &templates.state_debugging,
        },
        &sub,
    );

    let remote = snapshot
        .workspace
        .as_ref()
        .map(|w| w.remote_name.is_some())
        .unwrap_or(false);
    let (large_key, small_key) = select_keys(
        mode,
        remote,
        config.app.variant,
        document.map(|d| d.language_id.as_str()),
        config.display.suppress_file_icon,
    );
    let large_text_template = match mode {
        PresenceMode::Idle => &templates.large_text_idling,
        PresenceMode::Editing => &templates.large_text_editing,
        PresenceMode::Debugging => &templates.large_text_debugging,
    };
    let mut pair = ImagePair {
        large_key,
        large_text: render(large_text_template, &sub),
        small_key,
        small_text: render(&templates.small_text, &sub),
    };
    if config.display.swap_images {
        pair = pair.swapped();
    }

    let buttons = repository_button(config, repo);

    let timestamps = if config.display.show_elapsed_time {
        let start = ctx
            .previous
            .and_then(|p| p.timestamps)
            .map(|t| t.start)
            .unwrap_or(ctx.now_ms);
        Some(Timestamps { start })
    } else {
        None
    };

    Activity {
        details,
        state,
        timestamps,
        assets: Some(Assets {
            large_image: pair.large_key,
            large_text: pair.large_text,
            small_image: pair.small_key,
            small_text: pair.small_text,
        }),
        buttons,
    }
}

/// Render one presence line, or omit it entirely when the line is
/// toggled off or its template is unconfigured.
fn line(enabled: bool, template: &str, sub: &SubstitutionContext) -> Option<String> {
    if !enabled || template.is_empty() {
        return None;
    }
    Some(render(template, sub))
}

fn workspace_hidden(config: &BeaconConfig, snapshot: &EditorSnapshot) -> bool {
    let Some(workspace) = snapshot.workspace.as_ref() else {
        return false;
    };
    config.display.hide_workspace_patterns.iter().any(|p| {
        match regex::Regex::new(p) {
            Ok(re) => re.is_match(&workspace.name),
            Err(e) => {
                debug!("ignoring invalid hide pattern '{p}': {e}");
                false
            }
        }
    })
}

fn substitution_context(ctx: &BuildContext, hidden: bool) -> SubstitutionContext {
    let templates = &ctx.config.templates;
    let mut sub = SubstitutionContext {
        idle_text: templates.idle_text.clone(),
        unknown: templates.unknown.clone(),
        ..Default::default()
    };
    if hidden {
        return sub;
    }

    if let Some(doc) = ctx.snapshot.document.as_ref() {
        sub.file_name = doc.file_name();
        sub.dir_name = doc.dir_name();
        sub.full_dir_name = doc.full_dir();
        sub.current_line = Some(doc.line);
        sub.current_column = Some(doc.column);
        sub.total_lines = (doc.line_count > 0).then_some(doc.line_count);
        sub.language_id = Some(doc.language_id.clone());
        sub.file_size = ctx.file_size.map(format_file_size);
    }
    if let Some(ws) = ctx.snapshot.workspace.as_ref() {
        sub.workspace = Some(ws.name.clone());
        sub.workspace_folder = ws.folder.clone();
    }
    if let Some(repo) = ctx.repo {
        sub.git_branch = repo.branch.clone();
        sub.git_repo_name = repo
            .remote_url
            .as_deref()
            .and_then(repo_name_from_url);
    }
    sub
}

fn repository_button(config: &BeaconConfig, repo: Option<&Repository>) -> Option<Vec<Button>> {
    if !config.display.show_repository_button {
        return None;
    }
    let url = repo.and_then(|r| r.remote_url.as_deref())?;
    let url = normalize_remote_url(url)?;
    Some(vec![Button {
        label: config.display.button_label.clone(),
        url,
    }])
}
