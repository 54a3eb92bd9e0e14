//! Cleanup and validation of raw model output.
//!
//! Models wrap commit messages in code fences, chatty introductions, HTML and
//! closing remarks. [`purify_message`] strips all of that and normalises the
//! leading icon; the `is_*` helpers decide whether what is left is usable.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::config::Config;

use super::ChangeType;
use super::icons::{all_icons, ascii_icon_for_type, can_display_emojis};

static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<think>.*?</think>").expect("valid think regex"));

static LANGUAGE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_+.-]*$").expect("valid language tag regex"));

static INTRODUCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*[*_#>]*\s*(?:sure[,!.]?\s+)?(?:here(?:\s+is|'s)\s+(?:the\s+|a\s+|your\s+)?(?:suggested\s+|proposed\s+)?commit\s+message|suggested\s+commit\s+message|proposed\s+commit\s+message|commit\s+message|commit)(?:\s+for\s+(?:your|these|the|this)\s+changes?)?\s*[*_]*\s*:\s*[*_]*\s*",
    )
    .expect("valid introduction regex")
});

static MARKUP_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</?(?:p|div|span|b|i|u|strong|em|code|pre|br|hr|ul|ol|li|h[1-6]|a|blockquote|think|commit|commit-message|message|answer|response|output|result)(?:\s[^<>]*)?\s*/?>",
    )
    .expect("valid markup regex")
});

static CONVENTIONAL_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(feat|fix|docs|style|refactor|perf|test|build|ci|chore|revert|security)(\([^()\n]*\))?!?:",
    )
    .expect("valid conventional header regex")
});

static SCOPED_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]+\([^()\n]+\)!?:").expect("valid scoped header regex")
});

const EXPLANATION_MARKERS: &[&str] = &[
    "explanation:",
    "note:",
    "reasoning:",
    "rationale:",
    "this commit message",
];

const DISCLAIMER_MARKERS: &[&str] = &[
    "let me know",
    "please review",
    "hope this helps",
    "feel free",
    "as an ai",
];

/// Clean raw model output into a commit message.
///
/// Returns `None` for missing input or when nothing is left after cleanup.
pub fn purify_message(message: Option<&str>, config: &Config) -> Option<String> {
    let message = message?;

    let mut text = remove_think_blocks(message);
    text = extract_code_block(&text);
    text = strip_introduction(&text);
    text = strip_explanations(&text);
    text = strip_markup(&text);
    text = strip_disclaimers(&text);
    text = purify_icons(&text, config, can_display_emojis);

    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

pub fn remove_think_blocks(text: &str) -> String {
    THINK_BLOCK.replace_all(text, "").into_owned()
}

/// Keep only the content of the first fenced block, if any.
pub fn extract_code_block(text: &str) -> String {
    let Some(start) = text.find("```") else {
        return text.to_string();
    };
    let after = &text[start + 3..];

    let body = match after.split_once('\n') {
        Some((opening, rest)) if LANGUAGE_TAG.is_match(opening.trim()) => rest,
        _ => after,
    };

    let body = match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    };
    body.trim().to_string()
}

pub fn strip_introduction(text: &str) -> String {
    INTRODUCTION.replace(text, "").into_owned()
}

fn truncate_at_line<F>(text: &str, is_marker: F) -> String
where
    F: Fn(&str) -> bool,
{
    text.lines()
        .take_while(|line| !is_marker(&line.to_lowercase()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop everything from the first explanatory line onward.
pub fn strip_explanations(text: &str) -> String {
    truncate_at_line(text, |line| {
        let line = line.trim_start();
        EXPLANATION_MARKERS.iter().any(|m| line.starts_with(m))
    })
}

/// Remove tags of known markup elements, keeping their inner text.
pub fn strip_markup(text: &str) -> String {
    MARKUP_TAG.replace_all(text, "").into_owned()
}

/// Drop everything from the first line containing a closing remark.
pub fn strip_disclaimers(text: &str) -> String {
    truncate_at_line(text, |line| DISCLAIMER_MARKERS.iter().any(|m| line.contains(m)))
}

fn is_pictograph(c: char) -> bool {
    matches!(
        c as u32,
        0x1F000..=0x1FAFF | 0x2300..=0x23FF | 0x2600..=0x27BF | 0x2B00..=0x2BFF
    )
}

fn is_emoji_joiner(c: char) -> bool {
    matches!(c, '\u{FE0F}' | '\u{200D}')
}

/// Split a leading icon off `text`: `(icon, rest after icon and spaces)`.
fn split_leading_icon(text: &str) -> Option<(&str, &str)> {
    for icon in all_icons() {
        if let Some(rest) = text.strip_prefix(icon) {
            return Some((icon, rest.trim_start()));
        }
    }

    let mut chars = text.char_indices();
    let (_, first) = chars.next()?;
    if !is_pictograph(first) {
        return None;
    }
    let end = chars
        .find(|(_, c)| !(is_pictograph(*c) || is_emoji_joiner(*c)))
        .map_or(text.len(), |(i, _)| i);
    Some((&text[..end], text[end..].trim_start()))
}

fn strip_icon(line: &str) -> &str {
    match split_leading_icon(line) {
        Some((_, rest)) => rest,
        None => line,
    }
}

/// Remove or convert the icon in front of the commit type.
///
/// With icons disabled the icon is dropped, keeping leading whitespace. With
/// icons enabled an emoji is swapped for its ASCII form when `ascii_only` is
/// set or the terminal cannot render emoji.
pub fn purify_icons<F>(text: &str, config: &Config, emoji_supported: F) -> String
where
    F: FnOnce() -> bool,
{
    let body = text.trim_start();
    let indent = &text[..text.len() - body.len()];

    let Some((icon, rest)) = split_leading_icon(body) else {
        return text.to_string();
    };
    let Some(change_type) = extract_commit_type(rest) else {
        return text.to_string();
    };

    if !config.icon {
        return format!("{}{}", indent, rest);
    }

    let is_ascii_icon = icon.is_ascii();
    if !is_ascii_icon && (config.ascii_only || !emoji_supported()) {
        return format!("{}{} {}", indent, ascii_icon_for_type(Some(change_type)), rest);
    }

    text.to_string()
}

fn first_line(message: &str) -> &str {
    message.trim().lines().next().unwrap_or("")
}

/// Commit type of the header line, ignoring a leading icon.
pub fn extract_commit_type(message: &str) -> Option<ChangeType> {
    let header = strip_icon(first_line(message));
    let caps = CONVENTIONAL_HEADER.captures(header)?;
    caps.get(1)?.as_str().parse().ok()
}

/// Header is `type[(scope)][!]:` with a known type, after an optional icon.
pub fn is_conventional_type(message: &str) -> bool {
    CONVENTIONAL_HEADER.is_match(strip_icon(first_line(message)))
}

pub fn has_required_brackets(message: &str, force_brackets: bool) -> bool {
    !force_brackets || SCOPED_HEADER.is_match(strip_icon(first_line(message)))
}

pub fn is_corrupted_message(message: Option<&str>, config: &Config) -> bool {
    match message {
        None => true,
        Some(m) if m.trim().is_empty() => true,
        Some(m) => !is_conventional_type(m) || !has_required_brackets(m, config.force_brackets),
    }
}
