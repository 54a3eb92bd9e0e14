//! The interactive commit loop.

use std::collections::HashMap;
use std::path::PathBuf;

use colored::Colorize;
use tracing::{debug, info, warn};

use crate::commit::{ChangeGroup, GroupKey, MessageGenerator};
use crate::error::PromptError;
use crate::git;

use super::display::display_commit_preview;
use super::prompter::{Prompter, PrompterPolicy, UserResponse};

/// Stages and commits a group.
pub trait Committer {
    /// Commit `group` with `message`, reporting the outcome. Returns whether
    /// the commit was created.
    fn commit_group(&self, group: &ChangeGroup, message: &str) -> bool;
}

/// Commits through the system `git` in the repository root.
///
/// A failed commit unstages the group again so its files cannot end up in
/// the next group's commit.
#[derive(Debug, Clone)]
pub struct GitCommitter {
    root: PathBuf,
}

impl GitCommitter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Committer for GitCommitter {
    fn commit_group(&self, group: &ChangeGroup, message: &str) -> bool {
        let result = git::stage_files(&self.root, &group.key())
            .and_then(|()| git::commit(&self.root, message));

        match result {
            Ok(stdout) => {
                debug!("git commit: {}", stdout.trim());
                println!("{} {}", "✔ Successfully committed:".green(), message);
                true
            }
            Err(e) => {
                println!("{} {}", "✘ Error committing changes:".red(), e);
                if let Err(reset) = git::unstage_files(&self.root, &group.key()) {
                    warn!("Could not unstage {:?}: {}", group.key(), reset);
                }
                false
            }
        }
    }
}

/// Act on the user's answer for one group. Returns `true` when the remaining
/// groups should be committed without asking.
pub fn handle_user_response<P, C>(
    response: UserResponse,
    group: &ChangeGroup,
    message: &str,
    prompter: &P,
    committer: &C,
) -> Result<bool, PromptError>
where
    P: Prompter + ?Sized,
    C: Committer + ?Sized,
{
    match response {
        UserResponse::Yes => {
            committer.commit_group(group, message);
            Ok(false)
        }
        UserResponse::All => {
            committer.commit_group(group, message);
            Ok(true)
        }
        UserResponse::No => {
            println!("{}", "Skipping these changes...".yellow());
            Ok(false)
        }
        UserResponse::Edit => {
            let edited = prompter.edit_message(message)?;
            committer.commit_group(group, &edited);
            Ok(false)
        }
    }
}

/// Walk the groups in order, committing each one after approval.
///
/// Pre-generated messages are used when present; otherwise the message is
/// generated on demand. Once accept-all is chosen (or `accept_all` is set),
/// the remaining groups are committed without prompting.
pub async fn process_all_groups<P, C>(
    groups: &[ChangeGroup],
    messages: &HashMap<GroupKey, String>,
    generator: &MessageGenerator,
    prompter: &P,
    committer: &C,
    mut accept_all: bool,
) -> Result<(), PromptError>
where
    P: Prompter + ?Sized,
    C: Committer + ?Sized,
{
    for (index, group) in groups.iter().enumerate() {
        info!("Processing group {}/{}", index + 1, groups.len());

        let message = match messages.get(&group.key()) {
            Some(message) => message.clone(),
            None => generator.generate(group, &PrompterPolicy(prompter)).await?,
        };

        display_commit_preview(&message);

        if accept_all {
            committer.commit_group(group, &message);
            continue;
        }

        let response = prompter.read_response()?;
        accept_all = handle_user_response(response, group, &message, prompter, committer)?;
    }

    Ok(())
}
