//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Beacon Configuration
# Only override what you want to change -- missing fields use defaults.

[app]
# enabled = true
# application_id = "1045120999344414720"
# variant = "stable"            # stable, preview

[templates]
# Tokens: {file_name} {dir_name} {full_dir_name} {workspace}
# {workspace_folder} {workspace_and_folder} {current_line} {current_column}
# {total_lines} {file_size} {git_branch} {git_repo_name}
# {lang} {Lang} {LANG} {idle} {empty}
#
# A template of exactly "{empty}" renders a blank (but non-empty) line.
# An empty template string omits the field from the presence entirely.
# details_idling = "Idling"
# details_editing = "Editing {file_name}"
# details_debugging = "Debugging {file_name}"
# state_idling = "{empty}"
# state_editing = "in {workspace_and_folder}"
# state_debugging = "in {workspace_and_folder}"
# large_text_idling = "{idle}"
# large_text_editing = "Editing a {LANG} file"
# large_text_debugging = "Debugging a {LANG} file"
# small_text = "{workspace}"
# unknown = "?"                 # shown for tokens with no value
# idle_text = "Idle"

[display]
# show_details = true
# show_state = true
# show_elapsed_time = true
# suppress_file_icon = false
# swap_images = false
# show_repository_button = true
# button_label = "View Repository"
# hide_workspace_patterns = []  # regexes; matching workspaces show the idle text

[idle]
# timeout_secs = 300            # clear presence this long after focus loss; 0 disables

[connection]
# auto_reconnect = true
# reconnect_delay_secs = 1      # doubles per attempt
# max_reconnect_delay_secs = 30
# update_throttle_ms = 2000     # edit bursts collapse to one update per window

[coordination]
# enabled = false               # when true, only the active instance broadcasts
# active_instance = ""          # managed by beacon; set via `beacon set-active`

[notifications]
# suppress = false              # hide connection error popups (still logged)

[logging]
# level = "info"                # debug, info, warn, error
"##
    .to_string()
}
