//! Working tree inspection (git2) and commit plumbing (system git).

pub mod diff;
pub mod executor;
pub mod status;

use std::path::{Path, PathBuf};

use git2::Repository;

use crate::error::GitError;

pub use diff::{FileChange, collect_changes, file_diff};
pub use executor::{check_git_installed, commit, reset_staging, stage_files, unstage_files};
pub use status::{ChangeStatus, collect_status};

/// Open the repository containing `path` and return it with its working
/// directory.
pub fn open_repository(path: &Path) -> Result<(Repository, PathBuf), GitError> {
    let repo = Repository::discover(path).map_err(|e| GitError::OpenRepository {
        path: path.display().to_string(),
        source: e,
    })?;

    let root = repo
        .workdir()
        .map(Path::to_path_buf)
        .ok_or_else(|| GitError::CommandFailed {
            operation: "open".to_string(),
            stderr: format!("{} is a bare repository", path.display()),
        })?;

    Ok((repo, root))
}
