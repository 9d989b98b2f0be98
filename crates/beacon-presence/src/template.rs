//! Template rendering: pure token substitution against the live editor
//! context.
//!
//! Recognized `{token}` placeholders substitute their current value, or
//! the configured `unknown` placeholder when no value resolves.
//! Unrecognized placeholders pass through verbatim. Output is capped at
//! 128 characters — the peer's hard limit per line.

use std::sync::OnceLock;

use regex::Regex;

/// Maximum rendered length per presence line, in characters.
pub const MAX_LINE_LEN: usize = 128;

/// A template of exactly `{empty}` renders this: visually blank but
/// non-empty, since the peer rejects zero-length strings.
pub const BLANK_LINE: &str = "\u{2800}";

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([A-Za-z_]+)\}").expect("token regex"))
}

/// Resolved values for every substitution token.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionContext {
    pub file_name: Option<String>,
    pub dir_name: Option<String>,
    pub full_dir_name: Option<String>,
    pub workspace: Option<String>,
    pub workspace_folder: Option<String>,
    pub current_line: Option<u32>,
    pub current_column: Option<u32>,
    pub total_lines: Option<u32>,
    pub file_size: Option<String>,
    pub git_branch: Option<String>,
    pub git_repo_name: Option<String>,
    pub language_id: Option<String>,
    /// Value of the `{idle}` token.
    pub idle_text: String,
    /// Placeholder for recognized tokens with no value.
    pub unknown: String,
}

enum Resolution {
    Value(String),
    Missing,
    Unrecognized,
}

impl SubstitutionContext {
    fn lookup(&self, token: &str) -> Resolution {
        let value = match token {
            "file_name" => self.file_name.clone(),
            "dir_name" => self.dir_name.clone(),
            "full_dir_name" => self.full_dir_name.clone(),
            "workspace" => self.workspace.clone(),
            "workspace_folder" => self.workspace_folder.clone(),
            "workspace_and_folder" => self.workspace_and_folder(),
            "current_line" => self.current_line.map(|v| v.to_string()),
            "current_column" => self.current_column.map(|v| v.to_string()),
            "total_lines" => self.total_lines.map(|v| v.to_string()),
            "file_size" => self.file_size.clone(),
            "git_branch" => self.git_branch.clone(),
            "git_repo_name" => self.git_repo_name.clone(),
            "lang" => self.language_id.as_deref().map(str::to_lowercase),
            "Lang" => self.language_id.as_deref().map(title_case),
            "LANG" => self.language_id.as_deref().map(str::to_uppercase),
            "idle" => Some(self.idle_text.clone()),
            "empty" => Some(String::new()),
            _ => return Resolution::Unrecognized,
        };
        match value {
            Some(v) => Resolution::Value(v),
            None => Resolution::Missing,
        }
    }

    fn workspace_and_folder(&self) -> Option<String> {
        match (&self.workspace, &self.workspace_folder) {
            (Some(w), Some(f)) if f != w => Some(format!("{w} - {f}")),
            (Some(w), _) => Some(w.clone()),
            (None, Some(f)) => Some(f.clone()),
            (None, None) => None,
        }
    }
}

/// Render a template against a context.
///
/// Pure and deterministic; never fails. The result is truncated to
/// [`MAX_LINE_LEN`] characters.
pub fn render(template: &str, ctx: &SubstitutionContext) -> String {
    if template.trim() == "{empty}" {
        return BLANK_LINE.to_string();
    }

    let rendered = token_re().replace_all(template, |caps: &regex::Captures| {
        match ctx.lookup(&caps[1]) {
            Resolution::Value(v) => v,
            Resolution::Missing => ctx.unknown.clone(),
            Resolution::Unrecognized => caps[0].to_string(),
        }
    });

    truncate_chars(&rendered, MAX_LINE_LEN)
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> SubstitutionContext {
        SubstitutionContext {
            file_name: Some("main.rs".into()),
            dir_name: Some("src".into()),
            full_dir_name: Some("/home/alice/beacon/src".into()),
            workspace: Some("beacon".into()),
            workspace_folder: Some("core".into()),
            current_line: Some(42),
            current_column: Some(7),
            total_lines: Some(180),
            file_size: Some("3.4 KB".into()),
            git_branch: Some("main".into()),
            git_repo_name: Some("beacon".into()),
            language_id: Some("rust".into()),
            idle_text: "Idle".into(),
            unknown: "?".into(),
        }
    }

    #[test]
    fn substitutes_known_tokens() {
        assert_eq!(render("Editing {file_name}", &ctx()), "Editing main.rs");
        assert_eq!(
            render("{current_line}:{current_column} of {total_lines}", &ctx()),
            "42:7 of 180"
        );
        assert_eq!(render("on {git_branch}", &ctx()), "on main");
    }

    #[test]
    fn language_casing_variants() {
        let c = ctx();
        assert_eq!(render("{lang}", &c), "rust");
        assert_eq!(render("{Lang}", &c), "Rust");
        assert_eq!(render("{LANG}", &c), "RUST");
    }

    #[test]
    fn workspace_and_folder_combines() {
        let mut c = ctx();
        assert_eq!(render("{workspace_and_folder}", &c), "beacon - core");
        c.workspace_folder = Some("beacon".into());
        assert_eq!(render("{workspace_and_folder}", &c), "beacon");
        c.workspace = None;
        c.workspace_folder = Some("core".into());
        assert_eq!(render("{workspace_and_folder}", &c), "core");
    }

    #[test]
    fn missing_tokens_use_placeholder() {
        let mut c = ctx();
        c.git_branch = None;
        assert_eq!(render("on {git_branch}", &c), "on ?");
        c.unknown = "unknown".into();
        assert_eq!(render("on {git_branch}", &c), "on unknown");
    }

    #[test]
    fn unrecognized_tokens_pass_through() {
        assert_eq!(render("hello {nonsense} world", &ctx()), "hello {nonsense} world");
        assert_eq!(render("{file_name} {bogus}", &ctx()), "main.rs {bogus}");
    }

    #[test]
    fn sole_empty_renders_blank_nonempty() {
        let out = render("{empty}", &ctx());
        assert_eq!(out, BLANK_LINE);
        assert!(!out.is_empty());
        assert_eq!(render("  {empty}  ", &ctx()), BLANK_LINE);
    }

    #[test]
    fn embedded_empty_renders_nothing() {
        assert_eq!(render("a{empty}b", &ctx()), "ab");
    }

    #[test]
    fn idle_token_uses_configured_text() {
        let mut c = ctx();
        c.idle_text = "Away".into();
        assert_eq!(render("{idle}", &c), "Away");
    }

    #[test]
    fn output_capped_at_128_chars() {
        let long = "x".repeat(300);
        let c = SubstitutionContext {
            file_name: Some(long),
            unknown: "?".into(),
            ..Default::default()
        };
        let out = render("{file_name}", &c);
        assert_eq!(out.chars().count(), MAX_LINE_LEN);
    }

    #[test]
    fn cap_respects_char_boundaries() {
        let c = SubstitutionContext {
            file_name: Some("é".repeat(200)),
            unknown: "?".into(),
            ..Default::default()
        };
        let out = render("{file_name}", &c);
        assert_eq!(out.chars().count(), MAX_LINE_LEN);
        assert!(out.chars().all(|ch| ch == 'é'));
    }

    #[test]
    fn rendering_is_deterministic() {
        let c = ctx();
        let a = render("{file_name} {workspace_and_folder} {LANG}", &c);
        let b = render("{file_name} {workspace_and_folder} {LANG}", &c);
        assert_eq!(a, b);
    }

    #[test]
    fn plain_text_untouched() {
        assert_eq!(render("just some text", &ctx()), "just some text");
        assert_eq!(render("", &ctx()), "");
    }
}
