//! Error types for c4f modules using thiserror.

use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git is not installed or not on PATH")]
    NotInstalled,

    #[error("Failed to open repository at {path}: {source}")]
    OpenRepository {
        path: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to read working tree status: {0}")]
    StatusFailed(#[source] git2::Error),

    #[error("Failed to collect diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to run git {operation}: {source}")]
    SpawnFailed {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} failed: {stderr}")]
    CommandFailed { operation: String, stderr: String },
}

/// Errors from the chat-completions endpoint.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Request to completion endpoint failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Completion endpoint returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Completion endpoint returned invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Model response timed out after {0} seconds")]
    Timeout(f64),

    #[error("Model returned a message that is not a conventional commit: {0}")]
    Corrupted(String),

    #[error("Message generation retried on request")]
    RetryRequested,

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<ModelError>),
}

/// Errors from configuration validation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors from interactive prompts.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("Failed to read input: {0}")]
    Io(#[source] std::io::Error),
}
