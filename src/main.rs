//! c4f - CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use c4f::commit::{MessageGenerator, classify_change, group_related_changes};
use c4f::config::Config;
use c4f::error::PromptError;
use c4f::git::{check_git_installed, collect_changes, open_repository, reset_staging};
use c4f::interactive::{GitCommitter, TerminalPrompter, display_changes, process_all_groups};
use c4f::llm::HttpCompletionClient;

const EXIT_ERROR: u8 = 1;
const EXIT_CANCELLED: u8 = 130;

/// Generate conventional commit messages for your working tree changes.
#[derive(Parser, Debug)]
#[command(name = "c4f")]
#[command(about = "Commit For Free: generate conventional commit messages with an AI model")]
#[command(version)]
struct Cli {
    /// Repository root
    #[arg(short = 'r', long, default_value = ".", value_parser = parse_root)]
    root: PathBuf,

    /// Model name sent to the completion endpoint
    #[arg(short = 'm', long)]
    model: Option<String>,

    /// Generation attempts before falling back (1-10)
    #[arg(short = 'a', long, value_parser = clap::value_parser!(u32).range(1..=10))]
    attempts: Option<u32>,

    /// Seconds to wait for each model response (1-60)
    #[arg(short = 't', long, value_parser = clap::value_parser!(u64).range(1..=60))]
    timeout: Option<u64>,

    /// Require a (scope) in every commit message
    #[arg(short = 'f', long)]
    force_brackets: bool,

    /// Diff lines at which the detailed prompt is used (10-500)
    #[arg(long, value_parser = clap::value_parser!(u32).range(10..=500))]
    threshold: Option<u32>,

    /// Prefix messages with an icon for their type
    #[arg(long)]
    icon: bool,

    /// Use ASCII icons only
    #[arg(long)]
    ascii_only: bool,

    /// Commit every group without asking
    #[arg(short = 'y', long)]
    yes: bool,

    /// OpenAI-compatible chat completions URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Concurrent generation requests (1-16)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=16))]
    workers: Option<u32>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn parse_root(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("{} is not a directory", value))
    }
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::from_env();

        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(attempts) = self.attempts {
            config.attempts = attempts;
        }
        if let Some(timeout) = self.timeout {
            config.fallback_timeout = timeout as f64;
        }
        if let Some(threshold) = self.threshold {
            config.prompt_threshold = threshold as usize;
        }
        if let Some(workers) = self.workers {
            config.max_workers = workers as usize;
        }
        config.force_brackets |= self.force_brackets;
        config.icon |= self.icon;
        config.ascii_only |= self.ascii_only;

        config
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_cancelled(&e) => {
            eprintln!("{}", "Operation cancelled by user".yellow());
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(e) => {
            eprintln!("{}", format!("Error: {:#}", e).red());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn is_cancelled(error: &anyhow::Error) -> bool {
    error
        .chain()
        .any(|cause| matches!(cause.downcast_ref::<PromptError>(), Some(PromptError::Cancelled)))
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.config();
    config.validate()?;

    // Step 1: Check prerequisites
    check_git_installed().context("git is required")?;
    let (repo, root) = open_repository(&cli.root)
        .with_context(|| format!("Not a git repository: {}", cli.root.display()))?;

    // Step 2: Collect changes
    reset_staging(&root);
    let changes = collect_changes(&repo, classify_change).context("Failed to collect changes")?;
    if changes.is_empty() {
        println!("{}", "⚠ No changes to commit".yellow());
        return Ok(());
    }

    display_changes(&changes);

    // Step 3: Group and pre-generate messages
    let groups = group_related_changes(changes);
    println!(
        "Generating messages for {} group(s) with {}...",
        groups.len(),
        config.model
    );

    let client = Arc::new(HttpCompletionClient::from_config(&config));
    let generator = Arc::new(MessageGenerator::new(client, config));
    let messages = generator.pre_generate(&groups).await;

    // Step 4: Review and commit
    process_all_groups(
        &groups,
        &messages,
        &generator,
        &TerminalPrompter,
        &GitCommitter::new(root),
        cli.yes,
    )
    .await?;

    Ok(())
}
