//! Helpers shared by the Flowdeck engine, TUI and CLI.

pub mod preferences;
pub mod schema;
pub mod text_processing;

use std::path::PathBuf;

use dirs_next::home_dir;

pub use preferences::{PreferencesError, PreferencesPayload, UserPreferences};
pub use text_processing::{humanize_identifier, redact_json, redact_sensitive, single_line, truncate_for_summary};

/// Expands a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if trimmed == "~" {
        return home();
    }
    match trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        Some(rest) => home().join(rest),
        None => PathBuf::from(trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_tilde_leaves_plain_paths_alone() {
        assert_eq!(expand_tilde(" /tmp/prefs.json "), PathBuf::from("/tmp/prefs.json"));
    }

    #[test]
    fn expand_tilde_joins_home() {
        if let Some(home) = home_dir() {
            assert_eq!(expand_tilde("~/x.json"), home.join("x.json"));
        }
    }
}
