//! Per-file diff collection from the working tree using git2.

use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Local};
use git2::{Diff, DiffFormat, DiffOptions, ErrorCode, Repository, Status, Tree};
use tracing::{debug, warn};

use crate::commit::ChangeType;
use crate::error::GitError;

use super::status::{ChangeStatus, collect_status};

/// A changed file with its diff and classification.
#[derive(Debug, Clone, PartialEq)]
pub struct FileChange {
    pub path: String,
    pub status: ChangeStatus,
    pub diff: String,
    pub change_type: ChangeType,
    /// Number of lines in the trimmed diff.
    pub diff_lines: usize,
    /// Modification time, `None` when the file no longer exists.
    pub last_modified: Option<DateTime<Local>>,
}

impl FileChange {
    pub fn new(
        path: impl Into<String>,
        status: ChangeStatus,
        diff: impl Into<String>,
        change_type: ChangeType,
    ) -> Self {
        let diff = diff.into();
        let diff_lines = count_diff_lines(&diff);
        Self {
            path: path.into(),
            status,
            diff,
            change_type,
            diff_lines,
            last_modified: None,
        }
    }

    /// File name without its directory.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

pub fn count_diff_lines(diff: &str) -> usize {
    let trimmed = diff.trim();
    if trimmed.is_empty() {
        0
    } else {
        trimmed.lines().count()
    }
}

/// Resolve the HEAD tree, `None` on an unborn branch.
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::DiffFailed)?;
    Ok(Some(tree))
}

fn workdir(repo: &Repository) -> Result<&Path, GitError> {
    repo.workdir().ok_or_else(|| GitError::CommandFailed {
        operation: "diff".to_string(),
        stderr: "repository has no working directory".to_string(),
    })
}

/// Describe the changes to a single path.
///
/// Directories yield `Directory: <path>`. Untracked files yield their content,
/// or a `File not found`, `Permission denied` or `Binary file` marker. Tracked
/// files yield the unified patch of their staged and unstaged changes, empty
/// when git reports nothing.
pub fn file_diff(repo: &Repository, path: &str) -> Result<String, GitError> {
    let full_path = workdir(repo)?.join(path);

    if full_path.is_dir() {
        return Ok(format!("Directory: {}", path));
    }

    let untracked = match repo.status_file(Path::new(path)) {
        Ok(status) => status.contains(Status::WT_NEW),
        Err(e) if e.code() == ErrorCode::NotFound => !full_path.exists(),
        Err(e) => return Err(GitError::StatusFailed(e)),
    };

    if untracked {
        return Ok(read_untracked(&full_path, path));
    }

    tracked_diff(repo, path)
}

fn read_untracked(full_path: &Path, path: &str) -> String {
    match std::fs::read(full_path) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(_) => format!("Binary file: {}", path),
        },
        Err(e) if e.kind() == ErrorKind::NotFound => format!("File not found: {}", path),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            format!("Permission denied: {}", path)
        }
        Err(e) => {
            warn!("Failed to read {}: {}", path, e);
            format!("File not found: {}", path)
        }
    }
}

fn tracked_diff(repo: &Repository, path: &str) -> Result<String, GitError> {
    let head_tree = resolve_head_tree(repo)?;

    let mut staged_opts = DiffOptions::new();
    staged_opts.pathspec(path).disable_pathspec_match(true);
    let staged = repo
        .diff_tree_to_index(head_tree.as_ref(), None, Some(&mut staged_opts))
        .map_err(GitError::DiffFailed)?;

    let mut unstaged_opts = DiffOptions::new();
    unstaged_opts.pathspec(path).disable_pathspec_match(true);
    let unstaged = repo
        .diff_index_to_workdir(None, Some(&mut unstaged_opts))
        .map_err(GitError::DiffFailed)?;

    let mut text = String::new();
    append_patch(&staged, &mut text)?;
    append_patch(&unstaged, &mut text)?;
    Ok(text)
}

fn append_patch(diff: &Diff<'_>, text: &mut String) -> Result<(), GitError> {
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        if matches!(origin, '+' | '-' | ' ') {
            text.push(origin);
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })
    .map_err(GitError::DiffFailed)
}

fn last_modified(repo: &Repository, path: &str) -> Option<DateTime<Local>> {
    let full_path = repo.workdir()?.join(path);
    let modified = std::fs::metadata(full_path).ok()?.modified().ok()?;
    Some(DateTime::<Local>::from(modified))
}

/// Collect every changed file with its diff and classification.
///
/// Entries whose diff is empty are dropped.
pub fn collect_changes<F>(repo: &Repository, classify: F) -> Result<Vec<FileChange>, GitError>
where
    F: Fn(&str, &str) -> ChangeType,
{
    let mut changes = Vec::new();

    for (status, path) in collect_status(repo)? {
        let diff = file_diff(repo, &path)?;
        if diff.is_empty() {
            debug!("Skipping {} (empty diff)", path);
            continue;
        }

        let change_type = classify(&path, &diff);
        let mut change = FileChange::new(path, status, diff, change_type);
        change.last_modified = last_modified(repo, &change.path);
        changes.push(change);
    }

    Ok(changes)
}
