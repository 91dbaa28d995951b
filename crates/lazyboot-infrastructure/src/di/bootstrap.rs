//! Bootstrap Cache
//!
//! Holds the one root container of a process (or the failure that prevented
//! it). The slot is an explicit value owned by the entry point and shared
//! with the dispatcher; there is no global.
//!
//! ```text
//! NotStarted ──get_root_container()──► InFlight ──► Ready ──shutdown()──► ShutDown
//!                                          │
//!                                          └──► Failed (terminal)
//! ```
//!
//! A failed bootstrap is never retried in the same slot: a process without a
//! root container cannot serve invocations and is expected to be replaced.

use crate::di::container::ModuleContainer;
use crate::di::factory::ModuleFactory;
use crate::di::loader::LazyModuleLoader;
use crate::di::memo::{Memo, MemoPhase};
use crate::utils::TimedOperation;
use lazyboot_domain::error::{Error, Result};
use lazyboot_domain::{BootstrapState, ContainerStatus};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// Process-wide holder of the root container
pub struct BootstrapSlot {
    root: Memo<Result<Arc<ModuleContainer>>>,
    loader: LazyModuleLoader,
}

impl BootstrapSlot {
    /// Empty slot
    pub fn new() -> Self {
        Self {
            root: Memo::new(),
            loader: LazyModuleLoader::new(),
        }
    }

    /// Root container, bootstrapping it with `factory` on the first call
    ///
    /// Later calls (in flight or complete) share the first call's outcome and
    /// never invoke their own `factory`. Failures surface as
    /// `BootstrapFailure`; after [`shutdown`](Self::shutdown) calls fail with
    /// `ContainerDisposed`.
    pub async fn get_root_container<F>(&self, factory: F) -> Result<Arc<ModuleContainer>>
    where
        F: ModuleFactory + 'static,
    {
        let loader = self.loader.clone();
        let root = self
            .root
            .get_or_init(move || async move {
                let timer = TimedOperation::start();
                let id = factory.module_id();
                info!(module = %id, "Bootstrapping root container");

                match loader.assemble(Arc::new(factory), Vec::new()).await {
                    Ok(root) => {
                        info!(
                            module = %id,
                            elapsed_ms = timer.elapsed_ms(),
                            "Root container ready"
                        );
                        Ok(root)
                    }
                    Err(e) => {
                        error!(module = %id, error = %e, "Bootstrap failed");
                        Err(Error::bootstrap_failure(e))
                    }
                }
            })
            .await?;
        root.check_ready()?;
        Ok(root)
    }

    /// Current slot state
    pub fn state(&self) -> BootstrapState {
        match self.root.phase() {
            MemoPhase::Empty => BootstrapState::NotStarted,
            MemoPhase::Pending => BootstrapState::InFlight,
            MemoPhase::Settled => match self.root.get() {
                Some(Ok(root)) if root.status() == ContainerStatus::Disposed => {
                    BootstrapState::ShutDown
                }
                Some(Ok(_)) => BootstrapState::Ready,
                Some(Err(_)) => BootstrapState::Failed,
                None => BootstrapState::InFlight,
            },
        }
    }

    /// Ready root container, without triggering a bootstrap
    pub fn root(&self) -> Option<Arc<ModuleContainer>> {
        match self.root.get() {
            Some(Ok(root)) if root.status() == ContainerStatus::Ready => Some(root),
            _ => None,
        }
    }

    /// Captured bootstrap failure, if the slot failed
    pub fn failure(&self) -> Option<Error> {
        self.root.get().and_then(Result::err)
    }

    /// Dispose the root container and every module imported through the slot
    ///
    /// Meant for host shutdown; the slot cannot bootstrap again afterwards.
    /// Returns whether a root container was disposed.
    pub async fn shutdown(&self) -> bool {
        // Root first: its providers may hold instances from its imports
        let disposed = match self.root.get() {
            Some(Ok(root)) => root.dispose().await,
            _ => false,
        };
        let imports = self.loader.unload_all().await;
        if disposed {
            info!(imports, "Root container shut down");
        }
        disposed
    }
}

impl Default for BootstrapSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BootstrapSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapSlot")
            .field("state", &self.state())
            .field("loader", &self.loader)
            .finish()
    }
}
