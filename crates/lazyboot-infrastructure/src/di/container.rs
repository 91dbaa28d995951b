//! Module Container
//!
//! The live form of a [`ModuleDescriptor`]: one dependency graph, the
//! singleton instances resolved from it, and a lifecycle status.
//!
//! ```text
//! new ──► Initializing ──initialize()──► Ready ──dispose()──► Disposed
//!                              │                                 ▲
//!                              └──────────► Failed ──dispose()───┘
//! ```
//!
//! A `Failed` container never retries on its own. It keeps reporting the
//! captured error until its owner (loader or bootstrap slot) disposes it and
//! builds a fresh one.

use crate::di::descriptor::{Instance, ModuleDescriptor, downcast};
use crate::di::graph::DependencyGraph;
use crate::di::memo::Memo;
use crate::utils::TimedOperation;
use lazyboot_domain::error::{Error, Result};
use lazyboot_domain::{ContainerStatus, ModuleId, ProviderToken, Token};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

enum ContainerState {
    Initializing,
    Ready,
    Failed(Error),
    Disposed,
}

/// Instantiated module owning its provider instances
pub struct ModuleContainer {
    id: ModuleId,
    graph: Arc<DependencyGraph>,
    exports: Vec<ProviderToken>,
    imports: Vec<ModuleId>,
    state: RwLock<ContainerState>,
    initialization: Memo<Result<()>>,
}

impl ModuleContainer {
    /// Create an `Initializing` container from a descriptor and already loaded imports
    ///
    /// The exported surface of every import is visible to this container's
    /// providers. Nothing runs until [`initialize`](Self::initialize).
    pub fn new(descriptor: ModuleDescriptor, imports: Vec<Arc<ModuleContainer>>) -> Arc<Self> {
        let (id, providers, exports) = descriptor.into_parts();
        let import_ids = imports.iter().map(|import| import.id().clone()).collect();
        let graph = Arc::new(DependencyGraph::new(id.clone(), providers, imports));

        Arc::new(Self {
            id,
            graph,
            exports,
            imports: import_ids,
            state: RwLock::new(ContainerState::Initializing),
            initialization: Memo::new(),
        })
    }

    /// Create and initialize a container
    ///
    /// Always returns the container; check [`status`](Self::status) or
    /// [`check_ready`](Self::check_ready) for the outcome.
    pub async fn instantiate(
        descriptor: ModuleDescriptor,
        imports: Vec<Arc<ModuleContainer>>,
    ) -> Arc<Self> {
        let container = Self::new(descriptor, imports);
        // The outcome is captured in the container status
        let _ = container.initialize().await;
        container
    }

    /// Validate the graph and resolve every singleton in dependency order
    ///
    /// Runs once; concurrent and later calls observe the same outcome.
    pub async fn initialize(self: &Arc<Self>) -> Result<()> {
        let container = Arc::clone(self);
        self.initialization
            .get_or_init(move || async move { container.run_initialization().await })
            .await
    }

    /// Wait for initialization to settle
    ///
    /// Returns the captured outcome, starting initialization if nobody has.
    pub async fn wait_ready(self: &Arc<Self>) -> Result<()> {
        self.initialize().await
    }

    async fn run_initialization(&self) -> Result<()> {
        let timer = TimedOperation::start();
        let mut result = self.resolve_singletons().await;

        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            match *state {
                ContainerState::Initializing => {
                    *state = match &result {
                        Ok(()) => ContainerState::Ready,
                        Err(e) => ContainerState::Failed(e.clone()),
                    };
                }
                // Disposed while singletons were resolving
                ContainerState::Disposed => {
                    result = Err(Error::ContainerDisposed {
                        module: self.id.clone(),
                    });
                }
                ContainerState::Ready | ContainerState::Failed(_) => {}
            }
        }

        match &result {
            Ok(()) => info!(
                module = %self.id,
                providers = self.graph.resolved_count(),
                elapsed_ms = timer.elapsed_ms(),
                "Container ready"
            ),
            Err(e) => warn!(
                module = %self.id,
                error = %e,
                elapsed_ms = timer.elapsed_ms(),
                "Container failed"
            ),
        }
        result
    }

    async fn resolve_singletons(&self) -> Result<()> {
        self.graph.validate()?;
        for token in self.graph.singleton_tokens() {
            self.graph.resolve(&token).await?;
        }
        Ok(())
    }

    /// Module id
    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    /// Ids of the imported containers, in lookup order
    pub fn imports(&self) -> &[ModuleId] {
        &self.imports
    }

    /// Current lifecycle status
    pub fn status(&self) -> ContainerStatus {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            ContainerState::Initializing => ContainerStatus::Initializing,
            ContainerState::Ready => ContainerStatus::Ready,
            ContainerState::Failed(_) => ContainerStatus::Failed,
            ContainerState::Disposed => ContainerStatus::Disposed,
        }
    }

    /// Fail unless the container can serve providers
    ///
    /// `ContainerNotReady` while initializing, the captured error when
    /// failed, `ContainerDisposed` after disposal.
    pub fn check_ready(&self) -> Result<()> {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            ContainerState::Ready => Ok(()),
            ContainerState::Initializing => Err(Error::ContainerNotReady {
                module: self.id.clone(),
            }),
            ContainerState::Failed(e) => Err(e.clone()),
            ContainerState::Disposed => Err(Error::ContainerDisposed {
                module: self.id.clone(),
            }),
        }
    }

    /// Typed provider lookup
    ///
    /// Singletons return the cached instance; transients run their factory.
    pub async fn get<T: Send + Sync + 'static>(&self, token: &Token<T>) -> Result<Arc<T>> {
        let erased = token.erase();
        let instance = self.get_instance(&erased).await?;
        downcast(&erased, instance)
    }

    /// Type-erased provider lookup
    pub async fn get_instance(&self, token: &ProviderToken) -> Result<Instance> {
        self.check_ready()?;
        self.graph.resolve(token).await
    }

    /// Resolve a token on behalf of an importing container
    pub(crate) async fn resolve_exported(&self, token: &ProviderToken) -> Result<Instance> {
        if !self.exports_name(token.name()) {
            return Err(Error::unknown_provider(token.clone(), self.id.clone()));
        }
        self.get_instance(token).await
    }

    /// Locally registered tokens
    pub fn tokens(&self) -> &[ProviderToken] {
        self.graph.tokens()
    }

    /// Tokens visible to importing containers
    pub fn exports(&self) -> &[ProviderToken] {
        &self.exports
    }

    /// Whether `token` is exported (by name and type)
    pub fn is_exported(&self, token: &ProviderToken) -> bool {
        self.exports.contains(token)
    }

    pub(crate) fn exports_name(&self, name: &str) -> bool {
        self.exports.iter().any(|token| token.name() == name)
    }

    pub(crate) fn exported_token(&self, name: &str) -> Option<ProviderToken> {
        self.exports.iter().find(|token| token.name() == name).cloned()
    }

    /// Release owned instances in reverse dependency order
    ///
    /// Idempotent: returns `true` only for the call that disposed the container.
    pub async fn dispose(&self) -> bool {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if matches!(*state, ContainerState::Disposed) {
                return false;
            }
            *state = ContainerState::Disposed;
        }

        let released = self.graph.release().await;
        info!(module = %self.id, released, "Container disposed");
        true
    }
}

impl fmt::Debug for ModuleContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleContainer")
            .field("id", &self.id)
            .field("status", &self.status())
            .field("imports", &self.imports)
            .field("exports", &self.exports)
            .finish_non_exhaustive()
    }
}
