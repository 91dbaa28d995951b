//! Lazy Module Loader
//!
//! Instantiates module containers on demand and caches them by module id.
//!
//! ## Entry lifecycle
//!
//! ```text
//! absent ──load()──► in flight ──► ready ──unload()──► absent
//!                        │
//!                        └──► failed ──next load()──► in flight (fresh attempt)
//! ```
//!
//! Concurrent `load` calls for the same id attach to the in-flight
//! instantiation. A failed entry is replaced on the next call, so transient
//! failures are not cached forever.
//!
//! ## Import cycles
//!
//! While a module's assembly waits on one of its imports, the loader records
//! the edge `module -> import`. Before a load attaches to an entry it walks
//! these edges; reaching a module of its own import chain means the two
//! assemblies would wait on each other, and the load fails with
//! `CircularImport` instead.

use crate::di::container::ModuleContainer;
use crate::di::descriptor::ModuleDescriptor;
use crate::di::factory::ModuleFactory;
use crate::di::memo::Memo;
use crate::utils::TimedOperation;
use dashmap::DashMap;
use futures::FutureExt;
use futures::future::BoxFuture;
use lazyboot_domain::error::{Error, Result};
use lazyboot_domain::{ContainerStatus, ModuleId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

type LoadResult = Result<Arc<ModuleContainer>>;

struct LoadSlot {
    attempt: u64,
    memo: Memo<LoadResult>,
}

/// Module assemblies currently waiting on an import load, by waiting module
type WaitEdges = HashMap<ModuleId, Vec<ModuleId>>;

struct LoaderInner {
    parent: Option<Arc<ModuleContainer>>,
    entries: DashMap<ModuleId, Arc<LoadSlot>>,
    attempts: AtomicU64,
    waits: Mutex<WaitEdges>,
}

impl LoaderInner {
    fn new_slot(&self) -> Arc<LoadSlot> {
        Arc::new(LoadSlot {
            attempt: self.attempts.fetch_add(1, Ordering::Relaxed) + 1,
            memo: Memo::new(),
        })
    }

    fn lock_waits(&self) -> MutexGuard<'_, WaitEdges> {
        self.waits.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record that the last module of `chain` waits on `id`
    ///
    /// Fails with `CircularImport` when `id`, or any module it is itself
    /// waiting on, belongs to `chain`. Check and insert happen under one
    /// lock, so of two assemblies importing each other at least one sees
    /// the other's edge.
    fn wait_on(
        self: &Arc<Self>,
        chain: &[ModuleId],
        id: &ModuleId,
    ) -> Result<Option<WaitEdge>> {
        let mut waits = self.lock_waits();
        if let Some(cycle) = find_wait_cycle(&waits, chain, id) {
            return Err(Error::circular_import(cycle));
        }
        let Some(waiter) = chain.last() else {
            return Ok(None);
        };
        waits.entry(waiter.clone()).or_default().push(id.clone());
        Ok(Some(WaitEdge {
            inner: Arc::clone(self),
            waiter: waiter.clone(),
            target: id.clone(),
        }))
    }
}

/// Wait edge removed when the waiting load completes or is dropped
struct WaitEdge {
    inner: Arc<LoaderInner>,
    waiter: ModuleId,
    target: ModuleId,
}

impl Drop for WaitEdge {
    fn drop(&mut self) {
        let mut waits = self.inner.lock_waits();
        if let Some(targets) = waits.get_mut(&self.waiter) {
            if let Some(pos) = targets.iter().position(|t| t == &self.target) {
                targets.swap_remove(pos);
            }
            if targets.is_empty() {
                waits.remove(&self.waiter);
            }
        }
    }
}

/// Import cycle closed by letting the end of `chain` wait on `id`, if any
fn find_wait_cycle(
    waits: &WaitEdges,
    chain: &[ModuleId],
    id: &ModuleId,
) -> Option<Vec<ModuleId>> {
    let mut path = vec![id.clone()];
    let mut seen = HashSet::new();
    walk_waits(waits, chain, &mut path, &mut seen)
}

fn walk_waits(
    waits: &WaitEdges,
    chain: &[ModuleId],
    path: &mut Vec<ModuleId>,
    seen: &mut HashSet<ModuleId>,
) -> Option<Vec<ModuleId>> {
    let current = path.last()?.clone();
    if let Some(start) = chain.iter().position(|m| m == &current) {
        let mut cycle = chain[start..].to_vec();
        cycle.extend(path.iter().cloned());
        return Some(cycle);
    }
    if !seen.insert(current.clone()) {
        return None;
    }
    for next in waits.get(&current).into_iter().flatten() {
        path.push(next.clone());
        if let Some(cycle) = walk_waits(waits, chain, path, seen) {
            return Some(cycle);
        }
        path.pop();
    }
    None
}

/// On-demand container cache keyed by module id
///
/// Cloning is cheap; clones share the same cache.
#[derive(Clone)]
pub struct LazyModuleLoader {
    inner: Arc<LoaderInner>,
}

impl LazyModuleLoader {
    /// Loader without a parent container
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Loader whose modules implicitly import `parent`'s exported surface
    pub fn with_parent(parent: Arc<ModuleContainer>) -> Self {
        Self::build(Some(parent))
    }

    fn build(parent: Option<Arc<ModuleContainer>>) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                parent,
                entries: DashMap::new(),
                attempts: AtomicU64::new(0),
                waits: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Parent container, if any
    pub fn parent(&self) -> Option<&Arc<ModuleContainer>> {
        self.inner.parent.as_ref()
    }

    /// Load the module produced by `factory`, reusing a cached or in-flight container
    pub async fn load<F: ModuleFactory + 'static>(&self, factory: F) -> Result<LoadHandle> {
        self.load_shared(Arc::new(factory)).await
    }

    /// Load through a shared factory
    pub async fn load_shared(&self, factory: Arc<dyn ModuleFactory>) -> Result<LoadHandle> {
        self.load_in_chain(factory, Vec::new())
            .await
            .map(|container| LoadHandle { container })
    }

    fn load_in_chain(
        &self,
        factory: Arc<dyn ModuleFactory>,
        chain: Vec<ModuleId>,
    ) -> BoxFuture<'static, LoadResult> {
        let loader = self.clone();
        async move {
            let id = factory.module_id();
            let _wait = loader.inner.wait_on(&chain, &id)?;

            let slot = loader.slot(&id);
            let attempt = slot.attempt;
            let assembler = loader.clone();
            let result = slot
                .memo
                .get_or_init(move || async move {
                    let timer = TimedOperation::start();
                    let id = factory.module_id();
                    match assembler.assemble(factory, chain).await {
                        Ok(container) => {
                            info!(
                                module = %id,
                                attempt,
                                elapsed_ms = timer.elapsed_ms(),
                                "Module loaded"
                            );
                            Ok(container)
                        }
                        Err(e) => {
                            warn!(module = %id, attempt, error = %e, "Module load failed");
                            Err(Error::module_load_failure(id, e))
                        }
                    }
                })
                .await;

            if result.is_err() {
                loader
                    .inner
                    .entries
                    .remove_if(&id, |_, current| Arc::ptr_eq(current, &slot));
            }
            result
        }
        .boxed()
    }

    /// Cache entry for `id`, replacing a failed one
    fn slot(&self, id: &ModuleId) -> Arc<LoadSlot> {
        let inner = &self.inner;
        let mut entry = inner
            .entries
            .entry(id.clone())
            .or_insert_with(|| inner.new_slot());
        if matches!(entry.memo.get(), Some(Err(_))) {
            debug!(module = %id, "Replacing failed module entry");
            *entry = inner.new_slot();
        }
        Arc::clone(&*entry)
    }

    pub(crate) async fn assemble(
        &self,
        factory: Arc<dyn ModuleFactory>,
        mut chain: Vec<ModuleId>,
    ) -> LoadResult {
        let expected = factory.module_id();
        let descriptor = factory.create().await?;
        if descriptor.id() != &expected {
            return Err(Error::ModuleIdMismatch {
                expected,
                actual: descriptor.id().clone(),
            });
        }

        chain.push(expected);
        let imports = self.load_imports(&descriptor, &chain).await?;
        let container = ModuleContainer::instantiate(descriptor, imports).await;

        if let Err(e) = container.check_ready() {
            container.dispose().await;
            return Err(e);
        }
        Ok(container)
    }

    async fn load_imports(
        &self,
        descriptor: &ModuleDescriptor,
        chain: &[ModuleId],
    ) -> Result<Vec<Arc<ModuleContainer>>> {
        let mut imports = Vec::with_capacity(descriptor.imports().len() + 1);
        for import in descriptor.imports() {
            let container = self
                .load_in_chain(Arc::clone(import), chain.to_vec())
                .await?;
            imports.push(container);
        }
        if let Some(parent) = &self.inner.parent {
            imports.push(Arc::clone(parent));
        }
        Ok(imports)
    }

    /// Dispose the ready container for `id` and clear its entry
    ///
    /// Returns `false` when the module is unknown or still in flight.
    pub async fn unload(&self, id: &ModuleId) -> bool {
        let removed = self
            .inner
            .entries
            .remove_if(id, |_, slot| matches!(slot.memo.get(), Some(Ok(_))));
        let Some((_, slot)) = removed else {
            return false;
        };
        if let Some(Ok(container)) = slot.memo.get() {
            container.dispose().await;
        }
        info!(module = %id, "Module unloaded");
        true
    }

    /// Unload every ready module; returns how many were disposed
    pub async fn unload_all(&self) -> usize {
        let mut unloaded = 0;
        for id in self.loaded_modules() {
            if self.unload(&id).await {
                unloaded += 1;
            }
        }
        unloaded
    }

    /// Whether a ready container is cached for `id`
    pub fn is_loaded(&self, id: &ModuleId) -> bool {
        self.inner.entries.get(id).is_some_and(|slot| {
            matches!(slot.memo.get(), Some(Ok(container)) if container.status() == ContainerStatus::Ready)
        })
    }

    /// Ids of the modules with a ready container
    pub fn loaded_modules(&self) -> Vec<ModuleId> {
        let mut ids: Vec<ModuleId> = self
            .inner
            .entries
            .iter()
            .filter(|entry| matches!(entry.value().memo.get(), Some(Ok(_))))
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }
}

impl Default for LazyModuleLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LazyModuleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyModuleLoader")
            .field("parent", &self.inner.parent.as_ref().map(|p| p.id().clone()))
            .field("entries", &self.inner.entries.len())
            .finish()
    }
}

/// Shared reference to a loaded container
///
/// Every caller that loaded the same module gets a handle to the same
/// container.
#[derive(Debug, Clone)]
pub struct LoadHandle {
    container: Arc<ModuleContainer>,
}

impl LoadHandle {
    /// The loaded container
    pub fn container(&self) -> &Arc<ModuleContainer> {
        &self.container
    }

    /// Take the container out of the handle
    pub fn into_container(self) -> Arc<ModuleContainer> {
        self.container
    }

    /// Whether both handles point at the same container
    pub fn same_container(&self, other: &LoadHandle) -> bool {
        Arc::ptr_eq(&self.container, &other.container)
    }
}

impl Deref for LoadHandle {
    type Target = ModuleContainer;

    fn deref(&self) -> &Self::Target {
        &self.container
    }
}
