//! Invocation Dispatcher
//!
//! Reference entry point: every invocation obtains the root container from
//! the bootstrap slot first, then loads the worker module its [`WorkerKind`]
//! selects. Workers are routed through an enumerated set of known factories.

use crate::config::{AppConfig, WorkerKind};
use crate::di::bootstrap::BootstrapSlot;
use crate::di::container::ModuleContainer;
use crate::di::loader::{LazyModuleLoader, LoadHandle};
use crate::di::modules::{
    DATABASE, EXPORT_JOB, ExportModuleFactory, REPORT_SERVICE, ReportModuleFactory,
    RootModuleFactory, SETTINGS,
};
use crate::utils::TimedOperation;
use lazyboot_domain::BootstrapState;
use lazyboot_domain::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info};

/// One invocation handed to the dispatcher by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    /// Worker to route to; `None` only touches the root container
    #[serde(default)]
    pub worker: Option<WorkerKind>,
    /// Invocation payload
    #[serde(default)]
    pub payload: Value,
}

impl Invocation {
    /// Invocation served by the root container alone
    pub fn root() -> Self {
        Self::default()
    }

    /// Invocation routed to `worker`
    pub fn for_worker(worker: WorkerKind, payload: Value) -> Self {
        Self {
            worker: Some(worker),
            payload,
        }
    }
}

/// Result of a dispatched invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationOutcome {
    /// Sequence number of the invocation within this dispatcher
    pub invocation: u64,
    /// Whether the root container was not ready when the invocation arrived
    pub cold: bool,
    /// Worker the invocation was routed to
    pub worker: Option<WorkerKind>,
    /// Whether the worker module was not loaded when the invocation arrived
    pub worker_cold: bool,
    /// Wall time spent serving the invocation
    pub elapsed_ms: u64,
    /// Response body
    pub body: Value,
}

/// Routes invocations through the bootstrap slot and the worker loader
pub struct InvocationDispatcher {
    config: Arc<AppConfig>,
    slot: Arc<BootstrapSlot>,
    workers: OnceLock<LazyModuleLoader>,
    invocations: AtomicU64,
}

impl InvocationDispatcher {
    /// Dispatcher with a fresh bootstrap slot
    pub fn new(config: AppConfig) -> Self {
        Self::with_slot(config, Arc::new(BootstrapSlot::new()))
    }

    /// Dispatcher sharing an existing slot
    pub fn with_slot(config: AppConfig, slot: Arc<BootstrapSlot>) -> Self {
        Self {
            config: Arc::new(config),
            slot,
            workers: OnceLock::new(),
            invocations: AtomicU64::new(0),
        }
    }

    /// Bootstrap slot backing this dispatcher
    pub fn slot(&self) -> &Arc<BootstrapSlot> {
        &self.slot
    }

    /// Worker loader, once the root container exists
    pub fn workers(&self) -> Option<&LazyModuleLoader> {
        self.workers.get()
    }

    /// Serve one invocation
    pub async fn dispatch(&self, invocation: Invocation) -> Result<InvocationOutcome> {
        let number = self.invocations.fetch_add(1, Ordering::Relaxed) + 1;
        let timer = TimedOperation::start();
        let cold = self.slot.state() != BootstrapState::Ready;

        let root = self.root().await?;
        let (body, worker_cold) = match invocation.worker {
            None => (self.serve_root(&root).await?, false),
            Some(kind) => {
                let workers = self.worker_loader(&root);
                let worker_cold = !workers.is_loaded(&kind.module_id());
                let handle = self.load_worker(workers, kind).await?;
                let body = serve_worker(kind, &handle, number, &invocation.payload).await?;
                (body, worker_cold)
            }
        };

        let outcome = InvocationOutcome {
            invocation: number,
            cold,
            worker: invocation.worker,
            worker_cold,
            elapsed_ms: timer.elapsed_ms(),
            body,
        };
        debug!(
            invocation = number,
            cold,
            worker_cold,
            elapsed_ms = outcome.elapsed_ms,
            "Invocation served"
        );
        Ok(outcome)
    }

    /// Bootstrap the root container and load every configured prewarm worker
    ///
    /// Returns the workers that were loaded. Without configured workers
    /// nothing is bootstrapped, so the first invocation stays cold.
    pub async fn prewarm(&self) -> Result<Vec<WorkerKind>> {
        if self.config.bootstrap.prewarm.is_empty() {
            return Ok(Vec::new());
        }
        let root = self.root().await?;
        let workers = self.worker_loader(&root);
        let mut loaded = Vec::new();
        for &kind in &self.config.bootstrap.prewarm {
            if !loaded.contains(&kind) {
                self.load_worker(workers, kind).await?;
                loaded.push(kind);
            }
        }
        if !loaded.is_empty() {
            info!(workers = ?loaded, "Workers prewarmed");
        }
        Ok(loaded)
    }

    /// Dispose worker modules, then the root container
    pub async fn shutdown(&self) -> bool {
        if let Some(workers) = self.workers.get() {
            workers.unload_all().await;
        }
        self.slot.shutdown().await
    }

    async fn root(&self) -> Result<Arc<ModuleContainer>> {
        self.slot
            .get_root_container(RootModuleFactory::new(Arc::clone(&self.config)))
            .await
    }

    fn worker_loader(&self, root: &Arc<ModuleContainer>) -> &LazyModuleLoader {
        self.workers
            .get_or_init(|| LazyModuleLoader::with_parent(Arc::clone(root)))
    }

    async fn load_worker(&self, workers: &LazyModuleLoader, kind: WorkerKind) -> Result<LoadHandle> {
        let init_delay = Duration::from_millis(self.config.bootstrap.worker_init_delay_ms);
        match kind {
            WorkerKind::Report => workers.load(ReportModuleFactory::new(init_delay)).await,
            WorkerKind::Export => workers.load(ExportModuleFactory::new(init_delay)).await,
        }
    }

    async fn serve_root(&self, root: &ModuleContainer) -> Result<Value> {
        let settings = root.get(&SETTINGS).await?;
        let db = root.get(&DATABASE).await?;
        Ok(json!({
            "app": crate::constants::DEFAULT_APP_NAME,
            "database": settings.data.connection_url,
            "records": db.len(),
        }))
    }
}

async fn serve_worker(
    kind: WorkerKind,
    handle: &LoadHandle,
    number: u64,
    payload: &Value,
) -> Result<Value> {
    match kind {
        WorkerKind::Report => {
            let service = handle.get(&REPORT_SERVICE).await?;
            let key = payload
                .get("key")
                .and_then(Value::as_str)
                .map_or_else(|| format!("invocation-{number}"), str::to_string);
            service.record(&key, payload)
        }
        WorkerKind::Export => {
            let job = handle.get(&EXPORT_JOB).await?;
            job.run(payload.get("prefix").and_then(Value::as_str))
        }
    }
}
