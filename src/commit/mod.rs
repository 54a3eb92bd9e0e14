//! Commit message pipeline: classify, group, prompt, generate, purify.

pub mod classify;
pub mod group;
pub mod icons;
pub mod message;
pub mod prompt;
pub mod purify;

pub use classify::{ChangeType, classify_change};
pub use group::{ChangeGroup, GroupKey, group_related_changes};
pub use icons::{can_display_emojis, fallback_message, select_appropriate_icon};
pub use message::{FixedPolicy, MessageGenerator, ShortMessageAction, ShortMessagePolicy};
pub use prompt::{Prompt, PromptKind, build_prompt};
pub use purify::{extract_commit_type, is_corrupted_message, purify_message};
