//! User input for the interactive commit loop.

use std::io::ErrorKind;

use colored::Colorize;
use dialoguer::{Input, Select};
use tracing::warn;

use crate::commit::{ShortMessageAction, ShortMessagePolicy};
use crate::error::PromptError;

/// Answer to "commit this group?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserResponse {
    Yes,
    No,
    Edit,
    All,
}

/// Parse a typed answer; `None` means it should be asked again.
pub fn parse_response(input: &str) -> Option<UserResponse> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" | "y" => Some(UserResponse::Yes),
        "n" => Some(UserResponse::No),
        "e" => Some(UserResponse::Edit),
        "a" | "all" => Some(UserResponse::All),
        _ => None,
    }
}

/// Source of user decisions; swapped for a scripted one in tests.
pub trait Prompter: Send + Sync {
    /// Ask whether to commit, re-asking until the answer is valid.
    fn read_response(&self) -> Result<UserResponse, PromptError>;

    /// Let the user rewrite `current`.
    fn edit_message(&self, current: &str) -> Result<String, PromptError>;

    /// Ask what to do with a suspiciously short detailed message.
    fn short_message_action(&self, message: &str) -> Result<ShortMessageAction, PromptError>;
}

fn prompt_error(e: dialoguer::Error) -> PromptError {
    match e {
        dialoguer::Error::IO(io) if io.kind() == ErrorKind::Interrupted => PromptError::Cancelled,
        dialoguer::Error::IO(io) => PromptError::Io(io),
    }
}

/// Prompter backed by the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn read_response(&self) -> Result<UserResponse, PromptError> {
        loop {
            let input: String = Input::new()
                .with_prompt("Proceed with commit? [Y/n/e/a]")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_error)?;

            match parse_response(&input) {
                Some(response) => return Ok(response),
                None => eprintln!(
                    "{}",
                    "Invalid response. Enter y (yes), n (no), e (edit) or a (accept all).".yellow()
                ),
            }
        }
    }

    fn edit_message(&self, current: &str) -> Result<String, PromptError> {
        let edited: String = Input::new()
            .with_prompt("Commit message")
            .with_initial_text(current)
            .interact_text()
            .map_err(prompt_error)?;

        let edited = edited.trim();
        if edited.is_empty() {
            Ok(current.to_string())
        } else {
            Ok(edited.to_string())
        }
    }

    fn short_message_action(&self, message: &str) -> Result<ShortMessageAction, PromptError> {
        eprintln!(
            "{}\n  {}",
            "⚠ Generated message is shorter than expected for this change:".yellow(),
            message
        );
        let choice = Select::new()
            .with_prompt("What should be done?")
            .items(&["Use it anyway", "Retry generation", "Use fallback message"])
            .default(0)
            .interact()
            .map_err(prompt_error)?;

        Ok(match choice {
            0 => ShortMessageAction::Use,
            1 => ShortMessageAction::Retry,
            _ => ShortMessageAction::Fallback,
        })
    }
}

/// Short-message decisions delegated to a [`Prompter`].
///
/// Cancellation is passed through; other prompt failures choose the fallback.
pub struct PrompterPolicy<'a, P: Prompter + ?Sized>(pub &'a P);

impl<P: Prompter + ?Sized> ShortMessagePolicy for PrompterPolicy<'_, P> {
    fn decide(&self, message: &str) -> Result<ShortMessageAction, PromptError> {
        match self.0.short_message_action(message) {
            Ok(action) => Ok(action),
            Err(PromptError::Cancelled) => Err(PromptError::Cancelled),
            Err(e) => {
                warn!("Could not ask about short message, using fallback: {}", e);
                Ok(ShortMessageAction::Fallback)
            }
        }
    }
}
