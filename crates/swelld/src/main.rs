//! swelld — the Swell decision daemon.
//!
//! Single binary around the decision core:
//! - Rule set loading (built-in profiles or a rules file)
//! - Per-payload evaluation and decision resolution
//! - Telemetry counters with a final flush on exit
//!
//! # Usage
//!
//! ```text
//! swelld evaluate --facts payloads.json --profile memory
//! swelld evaluate --facts payloads.json --rules rules.toml
//! swelld check --rules rules.json
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use swell_rules::ScalingProfile;

mod commands;

#[derive(Parser)]
#[command(name = "swelld", about = "Swell autoscaler decision daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate metrics payloads and print the resulting recommendations.
    Evaluate {
        /// Path to the payload file: one JSON object or an array of them.
        #[arg(long)]
        facts: PathBuf,

        /// Rules file (.json or .toml). Takes precedence over --profile.
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Built-in scaling profile to evaluate.
        #[arg(long, default_value = "cpu-and-memory")]
        profile: ScalingProfile,

        /// Seconds to wait for the final counter flush.
        #[arg(long, default_value = "10")]
        flush_timeout: u64,
    },

    /// Validate a rules file and exit.
    Check {
        /// Rules file (.json or .toml).
        #[arg(long)]
        rules: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,swelld=debug,swell=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Evaluate {
            facts,
            rules,
            profile,
            flush_timeout,
        } => {
            commands::evaluate(
                &facts,
                rules.as_deref(),
                profile,
                Duration::from_secs(flush_timeout),
            )
            .await
        }
        Command::Check { rules } => commands::check(&rules),
    }
}
