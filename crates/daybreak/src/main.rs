//! Daybreak: daily digest assistant.
//!
//! Main binary with subcommands:
//! - `run`: execute one daily cycle against local data and print the
//!   run report

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cycle;
mod fixtures;
mod sink;

#[derive(Parser)]
#[command(name = "daybreak")]
#[command(about = "Daily digest assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one daily cycle and print the run report as JSON
    Run {
        /// Directory holding messages.json, events.json, transcripts.json
        #[arg(long, env = "DAYBREAK_DATA_DIR")]
        data_dir: PathBuf,

        /// Webhook URL the digest is delivered to; logs locally when unset
        #[arg(long, env = "DAYBREAK_WEBHOOK_URL")]
        webhook_url: Option<String>,

        /// Calendar lookahead in hours
        #[arg(long, default_value = "24")]
        lookahead_hours: u64,

        /// Maximum findings the email agent contributes per run
        #[arg(long, default_value = "10")]
        max_email_findings: usize,

        /// Optional cap on findings from any one agent
        #[arg(long)]
        max_findings_per_agent: Option<usize>,

        /// Delivery attempt budget
        #[arg(long, default_value = "3")]
        delivery_retries: u32,

        /// Per-agent timeout in seconds
        #[arg(long, default_value = "30")]
        agent_timeout_secs: u64,

        /// Maximum number of agents invoked concurrently
        #[arg(long, default_value = "4")]
        max_concurrency: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "daybreak=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data_dir,
            webhook_url,
            lookahead_hours,
            max_email_findings,
            max_findings_per_agent,
            delivery_retries,
            agent_timeout_secs,
            max_concurrency,
        } => {
            let config = daybreak_core::RunConfig {
                lookahead_hours,
                max_email_findings,
                max_findings_per_agent,
                delivery_retries,
                agent_timeout_secs,
                max_concurrency,
                transcripts: Vec::new(),
            };

            cycle::run(&data_dir, webhook_url.as_deref(), config).await
        }
    }
}
