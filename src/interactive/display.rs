//! Terminal rendering of pending changes and commit previews.

use chrono::{DateTime, Local};
use colored::{Color, ColoredString, Colorize};

use crate::git::FileChange;

/// Green below 10 lines, yellow below 50, red otherwise.
pub fn diff_lines_color(lines: usize) -> Color {
    if lines < 10 {
        Color::Green
    } else if lines < 50 {
        Color::Yellow
    } else {
        Color::Red
    }
}

pub fn format_diff_lines(lines: usize) -> ColoredString {
    lines.to_string().color(diff_lines_color(lines))
}

pub fn format_time_ago(timestamp: Option<DateTime<Local>>) -> String {
    format_time_ago_since(timestamp, Local::now())
}

fn format_time_ago_since(timestamp: Option<DateTime<Local>>, now: DateTime<Local>) -> String {
    let Some(timestamp) = timestamp else {
        return "N/A".to_string();
    };

    let elapsed = now.signed_duration_since(timestamp);
    if elapsed.num_days() > 0 {
        format!("{}d ago", elapsed.num_days())
    } else if elapsed.num_hours() > 0 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_minutes() > 0 {
        format!("{}m ago", elapsed.num_minutes())
    } else {
        "just now".to_string()
    }
}

fn render_changes(changes: &[FileChange], now: DateTime<Local>) -> String {
    let path_width = changes
        .iter()
        .map(|c| c.path.chars().count())
        .max()
        .unwrap_or(0)
        .max("File".len());

    let header = format!(
        "{:<6}  {:<path_width$}  {:<8}  {:>7}  {}",
        "Status", "File", "Type", "Changes", "Modified"
    );
    let mut out = format!("{}\n", header.bold());

    for change in changes {
        // Pad before colouring so escape codes don't skew the column.
        let lines = format!("{:>7}", change.diff_lines).color(diff_lines_color(change.diff_lines));
        out.push_str(&format!(
            "{:<6}  {:<path_width$}  {:<8}  {}  {}\n",
            change.status.code(),
            change.path,
            change.change_type.as_str(),
            lines,
            format_time_ago_since(change.last_modified, now)
        ));
    }
    out
}

/// Print a table of the pending changes.
pub fn display_changes(changes: &[FileChange]) {
    println!("{}", render_changes(changes, Local::now()));
}

fn render_commit_preview(message: &str) -> String {
    let mut out = format!("{}\n", "Proposed commit message:".bold());
    for line in message.lines() {
        out.push_str(&format!("  │ {}\n", line));
    }
    out
}

pub fn display_commit_preview(message: &str) {
    println!("{}", render_commit_preview(message));
}
