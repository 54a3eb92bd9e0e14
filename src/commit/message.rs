//! Commit message generation with timeout, retries and a deterministic
//! fallback.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use colored::Colorize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ModelError, PromptError};
use crate::llm::{CompletionClient, retry_with_backoff};

use super::group::{ChangeGroup, GroupKey};
use super::icons::fallback_message;
use super::prompt::{Prompt, PromptKind, build_prompt};
use super::purify::{is_corrupted_message, purify_message};

/// What to do with a comprehensive message that came back suspiciously short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortMessageAction {
    Use,
    Retry,
    Fallback,
}

/// Decides the fate of short comprehensive messages.
///
/// An error aborts generation and is returned from
/// [`MessageGenerator::generate`].
pub trait ShortMessagePolicy: Send + Sync {
    fn decide(&self, message: &str) -> Result<ShortMessageAction, PromptError>;
}

/// Always answers the same way; used when nobody can be asked.
#[derive(Debug, Clone, Copy)]
pub struct FixedPolicy(pub ShortMessageAction);

impl ShortMessagePolicy for FixedPolicy {
    fn decide(&self, _message: &str) -> Result<ShortMessageAction, PromptError> {
        Ok(self.0)
    }
}

/// Result of one successful request.
enum Outcome {
    Message(String),
    Fallback,
    Aborted(PromptError),
}

/// Generates commit messages for change groups through a completion client.
pub struct MessageGenerator {
    client: Arc<dyn CompletionClient>,
    config: Config,
    cache: Mutex<HashMap<GroupKey, String>>,
}

impl MessageGenerator {
    pub fn new(client: Arc<dyn CompletionClient>, config: Config) -> Self {
        Self {
            client,
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cached(&self, key: &GroupKey) -> Option<String> {
        self.cache.lock().ok()?.get(key).cloned()
    }

    fn store(&self, key: GroupKey, message: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, message.to_string());
        }
    }

    /// Generate a message for `group`. Model failures never surface: when
    /// every attempt fails, the fallback message is returned. The only error
    /// is one raised by `policy`, such as the user cancelling.
    pub async fn generate(
        &self,
        group: &ChangeGroup,
        policy: &dyn ShortMessagePolicy,
    ) -> Result<String, PromptError> {
        let key = group.key();
        if let Some(message) = self.cached(&key) {
            debug!("Using cached message for {:?}", key);
            return Ok(message);
        }

        let prompt = build_prompt(&group.changes, &self.config);
        debug!(
            "Prompt for {} file(s): {:?}, {} chars",
            group.len(),
            prompt.kind,
            prompt.text.len()
        );

        let result = retry_with_backoff(
            self.config.attempts,
            |attempt| self.attempt(&prompt, policy, attempt),
            |e| ModelError::RetriesExhausted(Box::new(e)),
        )
        .await;

        let message = match result {
            Ok(Outcome::Message(message)) => message,
            Ok(Outcome::Fallback) => {
                info!("Using fallback message on request");
                fallback_message(group, &self.config)
            }
            Ok(Outcome::Aborted(e)) => return Err(e),
            Err(e) => {
                report_failure(&e);
                fallback_message(group, &self.config)
            }
        };

        self.store(key, &message);
        Ok(message)
    }

    /// One request. Errors are retried; any `Outcome` ends the retry loop.
    async fn attempt(
        &self,
        prompt: &Prompt,
        policy: &dyn ShortMessagePolicy,
        attempt: u32,
    ) -> Result<Outcome, ModelError> {
        debug!("Generation attempt {}/{}", attempt, self.config.attempts);

        let timeout = Duration::from_secs_f64(self.config.fallback_timeout);
        let raw = tokio::time::timeout(timeout, self.client.complete(&prompt.text))
            .await
            .map_err(|_| ModelError::Timeout(self.config.fallback_timeout))??;

        let Some(message) = purify_message(Some(&raw), &self.config) else {
            return Err(ModelError::EmptyResponse);
        };
        if is_corrupted_message(Some(&message), &self.config) {
            return Err(ModelError::Corrupted(first_line(&message)));
        }

        let is_short = prompt.kind == PromptKind::Comprehensive
            && message.chars().count() < self.config.min_comprehensive_length;
        if !is_short {
            return Ok(Outcome::Message(message));
        }

        match policy.decide(&message) {
            Ok(ShortMessageAction::Use) => Ok(Outcome::Message(message)),
            Ok(ShortMessageAction::Retry) => Err(ModelError::RetryRequested),
            Ok(ShortMessageAction::Fallback) => Ok(Outcome::Fallback),
            Err(e) => Ok(Outcome::Aborted(e)),
        }
    }

    /// Generate messages for all groups concurrently, at most `max_workers`
    /// requests in flight. Short comprehensive messages are retried.
    pub async fn pre_generate(self: &Arc<Self>, groups: &[ChangeGroup]) -> HashMap<GroupKey, String> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
        let mut tasks = JoinSet::new();

        for group in groups {
            let generator = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            let group = group.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let message = generator
                    .generate(&group, &FixedPolicy(ShortMessageAction::Retry))
                    .await;
                (group.key(), message)
            });
        }

        let mut messages = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((key, Ok(message))) => {
                    messages.insert(key, message);
                }
                Ok((key, Err(e))) => debug!("No message pre-generated for {:?}: {}", key, e),
                Err(e) => warn!("Message generation task failed: {}", e),
            }
        }
        messages
    }
}

fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or_default().to_string()
}

fn report_failure(error: &ModelError) {
    let cause = match error {
        ModelError::RetriesExhausted(inner) => inner.as_ref(),
        other => other,
    };
    warn!("Message generation failed: {}", error);

    match cause {
        ModelError::Timeout(_) => {
            eprintln!("{}", "Model response timed out, using fallback message".yellow());
        }
        other => {
            eprintln!(
                "{}",
                format!("Error in model response, using fallback message: {}", other).yellow()
            );
        }
    }
}
