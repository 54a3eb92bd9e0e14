//! Commit-type icons and terminal emoji detection.

use std::env;
use std::io::IsTerminal;

use crate::config::Config;

use super::ChangeType;
use super::group::ChangeGroup;

const DEFAULT_ICON: &str = "🎯";
const DEFAULT_ASCII_ICON: &str = "[*]";

const EMOJI_TERMINALS: &[&str] = &[
    "xterm", "256color", "kitty", "alacritty", "wezterm", "iterm", "vte", "tmux", "screen",
    "foot", "rxvt", "konsole", "ghostty",
];

pub fn icon_for_type(change_type: Option<ChangeType>) -> &'static str {
    match change_type {
        Some(ChangeType::Feat) => "✨",
        Some(ChangeType::Fix) => "🐛",
        Some(ChangeType::Docs) => "📝",
        Some(ChangeType::Style) => "💄",
        Some(ChangeType::Refactor) => "♻️",
        Some(ChangeType::Perf) => "⚡",
        Some(ChangeType::Test) => "✅",
        Some(ChangeType::Build) => "👷",
        Some(ChangeType::Ci) => "🔧",
        Some(ChangeType::Chore) => "🔨",
        Some(ChangeType::Revert) => "⏪",
        Some(ChangeType::Security) => "🔒",
        None => DEFAULT_ICON,
    }
}

pub fn ascii_icon_for_type(change_type: Option<ChangeType>) -> &'static str {
    match change_type {
        Some(ChangeType::Feat) => "[+]",
        Some(ChangeType::Fix) => "[!]",
        Some(ChangeType::Docs) => "[d]",
        Some(ChangeType::Style) => "[s]",
        Some(ChangeType::Refactor) => "[r]",
        Some(ChangeType::Perf) => "[p]",
        Some(ChangeType::Test) => "[t]",
        Some(ChangeType::Build) => "[b]",
        Some(ChangeType::Ci) => "[c]",
        Some(ChangeType::Chore) => "[.]",
        Some(ChangeType::Revert) => "[<]",
        Some(ChangeType::Security) => "[#]",
        None => DEFAULT_ASCII_ICON,
    }
}

/// Every emoji and ASCII icon, longest first so prefixes match greedily.
pub(crate) fn all_icons() -> Vec<&'static str> {
    let mut icons: Vec<&'static str> = ChangeType::ALL
        .into_iter()
        .flat_map(|t| [icon_for_type(Some(t)), ascii_icon_for_type(Some(t))])
        .chain([DEFAULT_ICON, DEFAULT_ASCII_ICON])
        .collect();
    icons.sort_by_key(|icon| std::cmp::Reverse(icon.len()));
    icons
}

fn is_non_terminal_output() -> bool {
    !std::io::stdout().is_terminal()
}

fn has_emoji_compatible_terminal() -> bool {
    match env::var("TERM") {
        Ok(term) => {
            let term = term.to_ascii_lowercase();
            term != "dumb" && EMOJI_TERMINALS.iter().any(|t| term.contains(t))
        }
        Err(_) => false,
    }
}

/// First of `LC_ALL`, `LC_CTYPE`, `LANG` that is set decides.
fn has_utf8_locale() -> bool {
    ["LC_ALL", "LC_CTYPE", "LANG"]
        .iter()
        .find_map(|name| env::var(name).ok().filter(|v| !v.is_empty()))
        .is_some_and(|locale| {
            let locale = locale.to_ascii_lowercase();
            locale.contains("utf-8") || locale.contains("utf8")
        })
}

/// Whether emoji written to stdout are likely to render.
pub fn can_display_emojis() -> bool {
    is_non_terminal_output() || has_emoji_compatible_terminal() || has_utf8_locale()
}

/// Icon prefix (with trailing space) for a commit type, or empty when icons
/// are off.
pub fn select_appropriate_icon(change_type: Option<ChangeType>, config: Option<&Config>) -> String {
    select_icon(change_type, config, can_display_emojis)
}

fn select_icon(
    change_type: Option<ChangeType>,
    config: Option<&Config>,
    emoji_supported: impl FnOnce() -> bool,
) -> String {
    let Some(config) = config.filter(|c| c.icon) else {
        return String::new();
    };

    if config.ascii_only || !emoji_supported() {
        format!("{} ", ascii_icon_for_type(change_type))
    } else {
        format!("{} ", icon_for_type(change_type))
    }
}

/// Deterministic message used when the model cannot produce one.
pub fn fallback_message(group: &ChangeGroup, config: &Config) -> String {
    let change_type = group.change_type();
    format!(
        "{}{}: update {}",
        select_appropriate_icon(Some(change_type), Some(config)),
        change_type,
        group.file_names()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{ChangeStatus, FileChange};
    use serial_test::serial;

    #[test]
    fn test_icon_tables() {
        assert_eq!(icon_for_type(Some(ChangeType::Feat)), "✨");
        assert_eq!(icon_for_type(Some(ChangeType::Refactor)), "♻️");
        assert_eq!(icon_for_type(Some(ChangeType::Security)), "🔒");
        assert_eq!(icon_for_type(None), "🎯");
        assert_eq!(ascii_icon_for_type(Some(ChangeType::Fix)), "[!]");
        assert_eq!(ascii_icon_for_type(Some(ChangeType::Chore)), "[.]");
        assert_eq!(ascii_icon_for_type(Some(ChangeType::Revert)), "[<]");
        assert_eq!(ascii_icon_for_type(None), "[*]");
    }

    #[test]
    fn test_all_icons_longest_first() {
        let icons = all_icons();
        assert_eq!(icons.len(), 26);
        assert!(icons.windows(2).all(|w| w[0].len() >= w[1].len()));
    }

    #[test]
    #[serial]
    fn test_emoji_compatible_terminal() {
        temp_env::with_var("TERM", Some("xterm-256color"), || {
            assert!(has_emoji_compatible_terminal());
        });
        temp_env::with_var("TERM", Some("dumb"), || {
            assert!(!has_emoji_compatible_terminal());
        });
        temp_env::with_var("TERM", None::<&str>, || {
            assert!(!has_emoji_compatible_terminal());
        });
    }

    #[test]
    #[serial]
    fn test_utf8_locale_precedence() {
        temp_env::with_vars(
            [
                ("LC_ALL", Some("en_US.UTF-8")),
                ("LC_CTYPE", None),
                ("LANG", None),
            ],
            || assert!(has_utf8_locale()),
        );
        temp_env::with_vars(
            [
                ("LC_ALL", Some("en_US.ISO8859-1")),
                ("LC_CTYPE", Some("en_US.utf8")),
                ("LANG", None),
            ],
            || assert!(!has_utf8_locale()),
        );
        temp_env::with_vars(
            [
                ("LC_ALL", None),
                ("LC_CTYPE", Some("en_US.utf8")),
                ("LANG", None),
            ],
            || assert!(has_utf8_locale()),
        );
        temp_env::with_vars(
            [("LC_ALL", None), ("LC_CTYPE", None), ("LANG", Some("C.UTF-8"))],
            || assert!(has_utf8_locale()),
        );
        temp_env::with_vars(
            [("LC_ALL", None::<&str>), ("LC_CTYPE", None), ("LANG", None)],
            || assert!(!has_utf8_locale()),
        );
    }

    #[test]
    fn test_select_icon() {
        let enabled = Config {
            icon: true,
            ..Config::default()
        };
        let disabled = Config::default();
        let ascii = Config {
            icon: true,
            ascii_only: true,
            ..Config::default()
        };

        assert_eq!(select_icon(Some(ChangeType::Feat), Some(&enabled), || true), "✨ ");
        assert_eq!(select_icon(None, Some(&enabled), || true), "🎯 ");
        assert_eq!(select_icon(Some(ChangeType::Feat), Some(&disabled), || true), "");
        assert_eq!(select_icon(Some(ChangeType::Feat), Some(&enabled), || false), "[+] ");
        assert_eq!(select_icon(Some(ChangeType::Feat), Some(&ascii), || true), "[+] ");
        assert_eq!(select_icon(Some(ChangeType::Feat), None, || true), "");
        assert_eq!(select_appropriate_icon(Some(ChangeType::Feat), Some(&ascii)), "[+] ");
        assert_eq!(select_appropriate_icon(Some(ChangeType::Feat), None), "");
    }

    #[test]
    fn test_fallback_message() {
        let group = ChangeGroup::new(vec![
            FileChange::new("file1.py", ChangeStatus::Modified, "diff", ChangeType::Feat),
            FileChange::new("file2.py", ChangeStatus::Added, "diff", ChangeType::Feat),
        ]);
        assert_eq!(
            fallback_message(&group, &Config::default()),
            "feat: update file1.py file2.py"
        );

        let ascii = Config {
            icon: true,
            ascii_only: true,
            ..Config::default()
        };
        assert_eq!(fallback_message(&group, &ascii), "[+] feat: update file1.py file2.py");
    }
}
