//! Model endpoint access: completion client, retry, prompt sanitization.

pub mod client;
pub mod retry;
pub mod sanitize;

pub use client::{CompletionClient, HttpCompletionClient};
pub use retry::retry_with_backoff;
pub use sanitize::sanitize_for_prompt;
