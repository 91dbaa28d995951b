//! lazyboot - Entry Point
//!
//! Simulates a warm process serving a series of invocations and prints one
//! JSON outcome per line on stdout. Logs go to stderr.

use clap::Parser;
use lazyboot::infrastructure::config::WorkerKind;
use lazyboot::init::{RunOptions, run};

/// Command line interface for lazyboot
#[derive(Parser, Debug)]
#[command(name = "lazyboot")]
#[command(about = "lazyboot - Bootstrap-once, load-on-demand invocation simulator")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<std::path::PathBuf>,

    /// Number of invocations to dispatch
    #[arg(short = 'n', long, default_value_t = 3)]
    pub invocations: usize,

    /// Worker module every invocation routes to (report or export)
    #[arg(short, long)]
    pub worker: Option<WorkerKind>,

    /// Maximum invocations in flight at once
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let options = RunOptions {
        invocations: cli.invocations,
        worker: cli.worker,
        concurrency: cli.concurrency,
    };

    for outcome in run(cli.config.as_deref(), options).await? {
        println!("{}", serde_json::to_string(&outcome)?);
    }
    Ok(())
}
