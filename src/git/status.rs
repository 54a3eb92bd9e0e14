//! Working tree status using git2.

use std::fmt;

use git2::{Repository, Status, StatusEntry, StatusOptions};
use tracing::debug;

use crate::error::GitError;

/// Status of a changed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl ChangeStatus {
    /// Single-letter code as shown by `git status --short`.
    pub fn code(self) -> &'static str {
        match self {
            ChangeStatus::Added => "A",
            ChangeStatus::Modified => "M",
            ChangeStatus::Deleted => "D",
            ChangeStatus::Renamed => "R",
        }
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeStatus::Added => write!(f, "Added"),
            ChangeStatus::Modified => write!(f, "Modified"),
            ChangeStatus::Deleted => write!(f, "Deleted"),
            ChangeStatus::Renamed => write!(f, "Renamed"),
        }
    }
}

/// List every changed path in the working tree.
///
/// Includes staged, unstaged and untracked changes, recursing into untracked
/// directories. Untracked files are reported as [`ChangeStatus::Added`] and
/// renames report their new path. Ignored files are skipped.
pub fn collect_status(repo: &Repository) -> Result<Vec<(ChangeStatus, String)>, GitError> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false)
        .renames_head_to_index(true);

    let statuses = repo.statuses(Some(&mut opts)).map_err(GitError::StatusFailed)?;

    let mut changes = Vec::new();
    for entry in statuses.iter() {
        let Some(status) = map_status(entry.status()) else {
            continue;
        };
        let Some(path) = entry_path(&entry, status) else {
            continue;
        };
        changes.push((status, path));
    }

    debug!("Found {} changed paths", changes.len());
    Ok(changes)
}

fn map_status(status: Status) -> Option<ChangeStatus> {
    if status.is_ignored() {
        return None;
    }
    if status.intersects(Status::INDEX_RENAMED | Status::WT_RENAMED) {
        Some(ChangeStatus::Renamed)
    } else if status.intersects(Status::WT_NEW | Status::INDEX_NEW) {
        Some(ChangeStatus::Added)
    } else if status.intersects(Status::WT_DELETED | Status::INDEX_DELETED) {
        Some(ChangeStatus::Deleted)
    } else if status.intersects(
        Status::WT_MODIFIED
            | Status::INDEX_MODIFIED
            | Status::WT_TYPECHANGE
            | Status::INDEX_TYPECHANGE
            | Status::CONFLICTED,
    ) {
        Some(ChangeStatus::Modified)
    } else {
        None
    }
}

fn entry_path(entry: &StatusEntry<'_>, status: ChangeStatus) -> Option<String> {
    if status == ChangeStatus::Renamed {
        let renamed = entry
            .head_to_index()
            .or_else(|| entry.index_to_workdir())
            .and_then(|delta| delta.new_file().path().map(|p| p.to_string_lossy().to_string()));
        if renamed.is_some() {
            return renamed;
        }
    }
    entry.path().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn init_with_commit(files: &[(&str, &str)]) -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        {
            let mut index = repo.index().unwrap();
            for (name, content) in files {
                let full = dir.path().join(name);
                if let Some(parent) = full.parent() {
                    std::fs::create_dir_all(parent).unwrap();
                }
                std::fs::write(&full, content).unwrap();
                index.add_path(Path::new(name)).unwrap();
            }
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let sig = git2::Signature::now("Test", "test@test.com").unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[]).unwrap();
        }
        (dir, repo)
    }

    #[test]
    fn test_change_status_codes() {
        assert_eq!(ChangeStatus::Added.code(), "A");
        assert_eq!(ChangeStatus::Modified.code(), "M");
        assert_eq!(ChangeStatus::Deleted.code(), "D");
        assert_eq!(ChangeStatus::Renamed.code(), "R");
        assert_eq!(ChangeStatus::Renamed.to_string(), "Renamed");
    }

    #[test]
    fn test_collect_status_clean_repo_is_empty() {
        let (_dir, repo) = init_with_commit(&[("README.md", "# hi\n")]);
        assert!(collect_status(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_collect_status_untracked_is_added() {
        let (dir, repo) = init_with_commit(&[("README.md", "# hi\n")]);
        std::fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        std::fs::write(dir.path().join("src/nested/lib.rs"), "fn a() {}\n").unwrap();

        let changes = collect_status(&repo).unwrap();
        assert_eq!(
            changes,
            vec![(ChangeStatus::Added, "src/nested/lib.rs".to_string())]
        );
    }

    #[test]
    fn test_collect_status_modified_and_deleted() {
        let (dir, repo) = init_with_commit(&[("a.txt", "a\n"), ("b.txt", "b\n")]);
        std::fs::write(dir.path().join("a.txt"), "changed\n").unwrap();
        std::fs::remove_file(dir.path().join("b.txt")).unwrap();

        let changes = collect_status(&repo).unwrap();
        assert!(changes.contains(&(ChangeStatus::Modified, "a.txt".to_string())));
        assert!(changes.contains(&(ChangeStatus::Deleted, "b.txt".to_string())));
    }

    #[test]
    fn test_collect_status_skips_ignored() {
        let (dir, repo) = init_with_commit(&[(".gitignore", "target/\n")]);
        std::fs::create_dir_all(dir.path().join("target")).unwrap();
        std::fs::write(dir.path().join("target/out.bin"), "x").unwrap();

        assert!(collect_status(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_collect_status_staged_rename_reports_new_path() {
        let content = "line one\nline two\nline three\nline four\n";
        let (dir, repo) = init_with_commit(&[("old.txt", content)]);
        std::fs::rename(dir.path().join("old.txt"), dir.path().join("new.txt")).unwrap();
        let mut index = repo.index().unwrap();
        index.remove_path(Path::new("old.txt")).unwrap();
        index.add_path(Path::new("new.txt")).unwrap();
        index.write().unwrap();

        let changes = collect_status(&repo).unwrap();
        assert_eq!(changes, vec![(ChangeStatus::Renamed, "new.txt".to_string())]);
    }
}
