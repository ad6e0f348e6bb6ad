//! huginn — inspection CLI
//!
//! Offline helpers for the pieces of huginn that have bit-exact contracts:
//! freshness keys, error classification and fallback content.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use huginn::fallback::is_suitable_with_threshold;
use huginn::{
    Config, ErrorCategory, Phase, ProcessedError, ThreadData, UpstreamError, build_fallback,
    build_key, classify, last_post_timestamp,
};

/// huginn inspection CLI
#[derive(Parser)]
#[command(name = "huginn")]
#[command(version)]
#[command(about = "Inspect freshness keys, error classification and fallback summaries")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "HUGINN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the freshness key and suitability verdict for a thread JSON file
    Key {
        /// File holding `{"thread": {...}, "posts": [...]}`
        file: PathBuf,
    },

    /// Classify an upstream failure and print the result as JSON
    Classify {
        /// HTTP status, if the failure came from an HTTP response
        #[arg(short, long)]
        status: Option<u16>,
        /// Upstream error message
        #[arg(short, long)]
        message: Option<String>,
        /// Call site the failure was raised from
        #[arg(short, long, value_enum, default_value_t = PhaseArg::ForumFetch)]
        phase: PhaseArg,
        /// Upstream Retry-After, in seconds
        #[arg(long)]
        retry_after: Option<u64>,
    },

    /// Print the fallback summary for an error category as JSON
    Fallback {
        #[arg(short = 'k', long, value_enum)]
        category: CategoryArg,
        /// Thread to name in the summary line
        #[arg(short, long)]
        thread_id: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PhaseArg {
    Validation,
    ForumFetch,
    AiGeneration,
}

impl From<PhaseArg> for Phase {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::Validation => Phase::Validation,
            PhaseArg::ForumFetch => Phase::ForumFetch,
            PhaseArg::AiGeneration => Phase::AiGeneration,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    Authentication,
    NotFound,
    RateLimit,
    Network,
    Timeout,
    AiProcessing,
    Validation,
    Unknown,
}

impl From<CategoryArg> for ErrorCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Authentication => ErrorCategory::Authentication,
            CategoryArg::NotFound => ErrorCategory::NotFound,
            CategoryArg::RateLimit => ErrorCategory::RateLimit,
            CategoryArg::Network => ErrorCategory::Network,
            CategoryArg::Timeout => ErrorCategory::Timeout,
            CategoryArg::AiProcessing => ErrorCategory::AIProcessing,
            CategoryArg::Validation => ErrorCategory::Validation,
            CategoryArg::Unknown => ErrorCategory::Unknown,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Key { file } => {
            let content = std::fs::read_to_string(&file)?;
            let ThreadData { thread, posts } = serde_json::from_str(&content)?;
            let freshness = last_post_timestamp(&thread, &posts);
            let suitable =
                is_suitable_with_threshold(&thread, &posts, config.generation.min_content_chars);

            println!("key:       {}", build_key(&thread.id, &freshness));
            println!("posts:     {}", posts.len());
            println!(
                "suitable:  {}",
                if suitable { "yes" } else { "no (insufficient content)" }
            );
        }
        Command::Classify {
            status,
            message,
            phase,
            retry_after,
        } => {
            let raw = match (status, message) {
                (Some(status), message) => Some(UpstreamError::Http {
                    status,
                    message: message.unwrap_or_default(),
                    retry_after: retry_after.map(std::time::Duration::from_secs),
                }),
                (None, Some(message)) => Some(UpstreamError::native(message)),
                (None, None) => None,
            };
            let processed = classify(raw.as_ref(), phase.into());
            println!("{}", serde_json::to_string_pretty(&processed)?);
        }
        Command::Fallback {
            category,
            thread_id,
        } => {
            let err = ProcessedError::new(category.into(), None);
            let fallback = build_fallback(&err, thread_id.as_deref());
            println!("{}", serde_json::to_string_pretty(&fallback)?);
        }
    }

    Ok(())
}
