//! Interactive review and committing of generated messages.

pub mod display;
pub mod prompter;
pub mod session;

pub use display::{display_changes, display_commit_preview, format_diff_lines, format_time_ago};
pub use prompter::{Prompter, PrompterPolicy, TerminalPrompter, UserResponse, parse_response};
pub use session::{Committer, GitCommitter, handle_user_response, process_all_groups};
