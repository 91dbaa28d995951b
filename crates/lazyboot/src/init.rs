//! Command line runner
//!
//! Loads configuration, installs logging and drives simulated invocations
//! through one dispatcher, the way a host would over a warm process's life.

use futures::{StreamExt, TryStreamExt, stream};
use lazyboot_domain::error::Result;
use lazyboot_infrastructure::config::{AppConfig, ConfigLoader, WorkerKind};
use lazyboot_infrastructure::di::{Invocation, InvocationDispatcher, InvocationOutcome};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Options for a simulated run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Number of invocations to dispatch
    pub invocations: usize,
    /// Worker every invocation routes to
    pub worker: Option<WorkerKind>,
    /// Maximum invocations in flight at once
    pub concurrency: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            invocations: 1,
            worker: None,
            concurrency: 1,
        }
    }
}

/// Load configuration, install logging and run the invocations
pub async fn run(
    config_path: Option<&Path>,
    options: RunOptions,
) -> std::result::Result<Vec<InvocationOutcome>, Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    lazyboot_infrastructure::logging::init_logging(config.logging.clone())?;

    info!(
        invocations = options.invocations,
        concurrency = options.concurrency,
        worker = ?options.worker,
        "Starting lazyboot"
    );

    let dispatcher = Arc::new(InvocationDispatcher::new(config));
    let outcomes = run_invocations(&dispatcher, &options).await;
    dispatcher.shutdown().await;
    Ok(outcomes?)
}

/// Load configuration from optional path
pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig> {
    let loader = match config_path {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    loader.load()
}

/// Dispatch `options.invocations` invocations, at most `options.concurrency` at a time
///
/// Prewarms the configured workers first. Outcomes are returned in
/// invocation order; the first failure aborts the run.
pub async fn run_invocations(
    dispatcher: &Arc<InvocationDispatcher>,
    options: &RunOptions,
) -> Result<Vec<InvocationOutcome>> {
    dispatcher.prewarm().await?;

    let worker = options.worker;
    stream::iter(1..=options.invocations)
        .map(|i| {
            let dispatcher = Arc::clone(dispatcher);
            async move {
                let payload = json!({ "key": format!("invocation-{i}") });
                let invocation = match worker {
                    Some(kind) => Invocation::for_worker(kind, payload),
                    None => Invocation::root(),
                };
                dispatcher.dispatch(invocation).await
            }
        })
        .buffered(options.concurrency.max(1))
        .try_collect()
        .await
}
