//! c4f - Commit For Free.
//!
//! # Overview
//!
//! c4f inspects a repository's working tree, classifies and groups the
//! changes, asks an OpenAI-compatible model for a conventional commit message
//! per group, cleans up the reply, and commits each group after interactive
//! approval.

pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod interactive;
pub mod llm;

// Re-export commonly used types
pub use commit::{ChangeGroup, ChangeType, MessageGenerator};
pub use config::Config;
pub use error::{ConfigError, GitError, ModelError, PromptError};
pub use git::{ChangeStatus, FileChange};
