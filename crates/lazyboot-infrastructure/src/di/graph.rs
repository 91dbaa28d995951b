//! Dependency Graph
//!
//! Resolves provider instances in dependency order for one container.
//!
//! ## Resolution
//!
//! ```text
//! resolve(db) ──► path [db] ──► resolve(config) ──► factory(config)
//!                                                      │
//!            factory(db, deps = [config]) ◄────────────┘
//! ```
//!
//! - Singletons are memoized per graph; racing resolutions share one
//!   factory run and observe the same outcome, success or failure.
//! - Every resolution carries the path of tokens it is nested in; revisiting
//!   a token on the path fails with `CircularDependency` before recursing.
//! - Tokens not registered locally are looked up in the exported surface of
//!   the imported containers, in import order.

use crate::di::container::ModuleContainer;
use crate::di::descriptor::{Instance, ProviderRegistration, ResolvedDependencies, check_type};
use crate::di::memo::Memo;
use futures::FutureExt;
use futures::future::BoxFuture;
use lazyboot_domain::error::{Error, Result};
use lazyboot_domain::{ModuleId, ProviderToken, Scope};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

type SingletonCell = Arc<Memo<Result<Instance>>>;

/// Providers of one container and the instances resolved from them
pub struct DependencyGraph {
    module: ModuleId,
    registrations: HashMap<String, Arc<ProviderRegistration>>,
    order: Vec<ProviderToken>,
    imports: Vec<Arc<ModuleContainer>>,
    singletons: Mutex<Option<HashMap<String, SingletonCell>>>,
    resolved: Mutex<Vec<(Arc<ProviderRegistration>, Instance)>>,
}

impl DependencyGraph {
    /// Build a graph from registrations and the containers they may import from
    pub fn new(
        module: ModuleId,
        registrations: Vec<Arc<ProviderRegistration>>,
        imports: Vec<Arc<ModuleContainer>>,
    ) -> Self {
        let order = registrations.iter().map(|r| r.token().clone()).collect();
        let singletons = registrations
            .iter()
            .filter(|r| r.scope() == Scope::Singleton)
            .map(|r| (r.token().name().to_string(), Arc::new(Memo::new())))
            .collect();
        let registrations = registrations
            .into_iter()
            .map(|r| (r.token().name().to_string(), r))
            .collect();

        Self {
            module,
            registrations,
            order,
            imports,
            singletons: Mutex::new(Some(singletons)),
            resolved: Mutex::new(Vec::new()),
        }
    }

    /// Module this graph belongs to
    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    /// Locally registered tokens, in registration order
    pub fn tokens(&self) -> &[ProviderToken] {
        &self.order
    }

    /// Whether `token` is registered locally (by name and type)
    pub fn contains(&self, token: &ProviderToken) -> bool {
        self.registrations
            .get(token.name())
            .is_some_and(|r| r.token() == token)
    }

    /// Singleton tokens, in registration order
    pub fn singleton_tokens(&self) -> Vec<ProviderToken> {
        self.order
            .iter()
            .filter(|token| {
                self.registrations
                    .get(token.name())
                    .is_some_and(|r| r.scope() == Scope::Singleton)
            })
            .cloned()
            .collect()
    }

    /// Number of singleton instances currently held
    pub fn resolved_count(&self) -> usize {
        lock(&self.resolved).len()
    }

    /// Static check run before any factory executes
    ///
    /// Every dependency must be registered locally or exported by an import,
    /// with a matching type, and local registrations must not form a cycle.
    pub fn validate(&self) -> Result<()> {
        for token in &self.order {
            let registration = &self.registrations[token.name()];
            for dependency in registration.dependencies() {
                if let Some(local) = self.registrations.get(dependency.name()) {
                    check_type(dependency, local.token())?;
                } else {
                    self.exporter_of(dependency)?;
                }
            }
        }

        let mut visiting = Vec::new();
        let mut done = std::collections::HashSet::new();
        for token in &self.order {
            self.visit(token, &mut visiting, &mut done)?;
        }
        Ok(())
    }

    fn visit(
        &self,
        token: &ProviderToken,
        visiting: &mut Vec<ProviderToken>,
        done: &mut std::collections::HashSet<String>,
    ) -> Result<()> {
        if done.contains(token.name()) {
            return Ok(());
        }
        if let Some(start) = visiting.iter().position(|t| t.name() == token.name()) {
            let mut chain = visiting[start..].to_vec();
            chain.push(token.clone());
            return Err(Error::circular_dependency(chain));
        }
        let Some(registration) = self.registrations.get(token.name()) else {
            return Ok(());
        };

        visiting.push(token.clone());
        for dependency in registration.dependencies() {
            self.visit(dependency, visiting, done)?;
        }
        visiting.pop();
        done.insert(token.name().to_string());
        Ok(())
    }

    /// Resolve `token` to an instance
    pub async fn resolve(self: &Arc<Self>, token: &ProviderToken) -> Result<Instance> {
        self.resolve_on_path(token.clone(), Vec::new()).await
    }

    fn resolve_on_path(
        self: &Arc<Self>,
        token: ProviderToken,
        path: Vec<ProviderToken>,
    ) -> BoxFuture<'static, Result<Instance>> {
        let graph = Arc::clone(self);
        async move {
            if path.iter().any(|visited| visited.name() == token.name()) {
                let mut chain = path;
                chain.push(token);
                return Err(Error::circular_dependency(chain));
            }

            let Some(registration) = graph.registrations.get(token.name()).cloned() else {
                return graph.resolve_imported(&token).await;
            };
            check_type(&token, registration.token())?;

            match registration.scope() {
                Scope::Transient => graph.construct(registration, path).await,
                Scope::Singleton => {
                    let cell = graph.singleton_cell(&token)?;
                    let owner = Arc::clone(&graph);
                    cell.get_or_init(move || async move {
                        let instance = owner.construct(Arc::clone(&registration), path).await?;
                        owner.retain(registration, instance).await
                    })
                    .await
                }
            }
        }
        .boxed()
    }

    async fn construct(
        self: &Arc<Self>,
        registration: Arc<ProviderRegistration>,
        mut path: Vec<ProviderToken>,
    ) -> Result<Instance> {
        path.push(registration.token().clone());

        let mut values = Vec::with_capacity(registration.dependencies().len());
        for dependency in registration.dependencies() {
            // Dependency failures already carry the failing token
            let instance = self.resolve_on_path(dependency.clone(), path.clone()).await?;
            values.push((dependency.clone(), instance));
        }

        debug!(
            module = %self.module,
            provider = %registration.token(),
            scope = ?registration.scope(),
            "Constructing provider"
        );
        registration
            .invoke(ResolvedDependencies::new(self.module.clone(), values))
            .await
            .map_err(|e| Error::provider_failed(registration.token().clone(), e))
    }

    /// Hand a freshly built singleton to the graph for later release
    ///
    /// When the graph was released while the factory ran, the instance is
    /// torn down at once and resolution fails with `ContainerDisposed`.
    async fn retain(
        &self,
        registration: Arc<ProviderRegistration>,
        instance: Instance,
    ) -> Result<Instance> {
        {
            // Held while pushing so `release` cannot drain `resolved` in between
            let singletons = lock(&self.singletons);
            if singletons.is_some() {
                lock(&self.resolved).push((registration, Arc::clone(&instance)));
                return Ok(instance);
            }
        }

        self.teardown(&registration, instance).await;
        Err(Error::ContainerDisposed {
            module: self.module.clone(),
        })
    }

    async fn teardown(&self, registration: &ProviderRegistration, instance: Instance) {
        let Some(teardown) = registration.teardown(instance) else {
            return;
        };
        if let Err(e) = teardown.await {
            warn!(
                module = %self.module,
                provider = %registration.token(),
                error = %e,
                "Provider teardown failed"
            );
        }
    }

    async fn resolve_imported(&self, token: &ProviderToken) -> Result<Instance> {
        let exporter = self.exporter_of(token)?;
        exporter.resolve_exported(token).await
    }

    fn exporter_of(&self, token: &ProviderToken) -> Result<&Arc<ModuleContainer>> {
        let exporter = self
            .imports
            .iter()
            .find(|import| import.exports_name(token.name()))
            .ok_or_else(|| Error::unknown_provider(token.clone(), self.module.clone()))?;
        if let Some(exported) = exporter.exported_token(token.name()) {
            check_type(token, &exported)?;
        }
        Ok(exporter)
    }

    fn singleton_cell(&self, token: &ProviderToken) -> Result<SingletonCell> {
        let singletons = lock(&self.singletons);
        let cells = singletons.as_ref().ok_or_else(|| Error::ContainerDisposed {
            module: self.module.clone(),
        })?;
        cells
            .get(token.name())
            .cloned()
            .ok_or_else(|| Error::unknown_provider(token.clone(), self.module.clone()))
    }

    /// Drop every singleton instance, running teardown hooks in reverse resolution order
    ///
    /// Returns the number of instances released. Subsequent singleton
    /// resolutions fail with `ContainerDisposed`.
    pub async fn release(&self) -> usize {
        let resolved = {
            let mut singletons = lock(&self.singletons);
            singletons.take();
            std::mem::take(&mut *lock(&self.resolved))
        };
        let released = resolved.len();

        for (registration, instance) in resolved.into_iter().rev() {
            self.teardown(&registration, instance).await;
        }
        released
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
