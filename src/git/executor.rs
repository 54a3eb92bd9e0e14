//! Staging and commit plumbing.
//!
//! All operations use `std::process::Command` to shell out to the system `git`
//! binary inside the repository root, inheriting the user's git config, hooks
//! and signing setup.

use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use crate::error::GitError;

/// Fail early when `git` is not on `PATH`.
pub fn check_git_installed() -> Result<(), GitError> {
    which::which("git").map(|_| ()).map_err(|_| GitError::NotInstalled)
}

/// Unstage everything so each group can be committed on its own.
///
/// A failure (e.g. on an unborn branch with an old git) is logged and ignored.
pub fn reset_staging(root: &Path) {
    if let Err(e) = run_git(root, &["reset", "-q"], "reset") {
        warn!("Could not reset staging area: {}", e);
    }
}

/// Stage the given paths, including deletions. Paths are matched literally,
/// so names such as `src/[id].tsx` never match siblings.
pub fn stage_files(root: &Path, paths: &[String]) -> Result<(), GitError> {
    for path in paths {
        run_git(root, &["--literal-pathspecs", "add", "-A", "--", path], "add")?;
    }
    Ok(())
}

/// Drop the given paths from the index, keeping their working tree changes.
pub fn unstage_files(root: &Path, paths: &[String]) -> Result<(), GitError> {
    if paths.is_empty() {
        return Ok(());
    }
    let mut args = vec!["--literal-pathspecs", "reset", "-q", "--"];
    args.extend(paths.iter().map(String::as_str));
    run_git(root, &args, "reset").map(|_| ())
}

/// Create a commit from the staged changes, returning git's stdout.
pub fn commit(root: &Path, message: &str) -> Result<String, GitError> {
    run_git(root, &["commit", "-m", message], "commit")
}

/// Run a git command in `root` and return its stdout.
pub fn run_git(root: &Path, args: &[&str], operation: &str) -> Result<String, GitError> {
    debug!("git {}", args.join(" "));

    let output = Command::new("git")
        .args(args)
        .current_dir(root)
        .output()
        .map_err(|e| GitError::SpawnFailed {
            operation: operation.to_string(),
            source: e,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stderr = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        return Err(GitError::CommandFailed {
            operation: operation.to_string(),
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_git_version_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let stdout = run_git(dir.path(), &["--version"], "version check").unwrap();
        assert!(stdout.starts_with("git version"));
    }

    #[test]
    fn test_run_git_invalid_command_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_git(dir.path(), &["not-a-real-command"], "invalid");
        assert!(matches!(
            result,
            Err(GitError::CommandFailed { operation, .. }) if operation == "invalid"
        ));
    }

    fn staged_paths(repo: &git2::Repository) -> Vec<String> {
        let statuses = repo.statuses(None).unwrap();
        let mut paths: Vec<String> = statuses
            .iter()
            .filter(|e| e.status().intersects(git2::Status::INDEX_NEW | git2::Status::INDEX_MODIFIED))
            .filter_map(|e| e.path().map(str::to_string))
            .collect();
        paths.sort();
        paths
    }

    #[test]
    fn test_stage_files_matches_paths_literally() {
        let dir = tempfile::tempdir().unwrap();
        let repo = git2::Repository::init(dir.path()).unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/[id].tsx"), "export default 1;\n").unwrap();
        std::fs::write(dir.path().join("src/i.tsx"), "export default 2;\n").unwrap();

        stage_files(dir.path(), &["src/[id].tsx".to_string()]).unwrap();

        assert_eq!(staged_paths(&repo), vec!["src/[id].tsx"]);
    }

    #[test]
    fn test_unstage_files_keeps_working_tree() {
        let dir = tempfile::tempdir().unwrap();
        let repo = git2::Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        std::fs::write(dir.path().join("b.txt"), "b\n").unwrap();

        let both = vec!["a.txt".to_string(), "b.txt".to_string()];
        stage_files(dir.path(), &both).unwrap();
        assert_eq!(staged_paths(&repo), both);

        unstage_files(dir.path(), &["a.txt".to_string()]).unwrap();

        assert_eq!(staged_paths(&repo), vec!["b.txt"]);
        assert!(dir.path().join("a.txt").exists());
        assert!(unstage_files(dir.path(), &[]).is_ok());
    }

    #[test]
    fn test_check_git_installed() {
        assert!(check_git_installed().is_ok());
    }
}
