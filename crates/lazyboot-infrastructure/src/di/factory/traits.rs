//! DI Factory traits

use crate::di::descriptor::ModuleDescriptor;
use async_trait::async_trait;
use lazyboot_domain::ModuleId;
use lazyboot_domain::error::Result;
use std::future::Future;
use std::sync::Arc;

/// Factory producing a module descriptor
///
/// `module_id` must be known without running `create`: loaders deduplicate
/// and cache by it, so a cached module never re-runs its factory. `create`
/// may suspend (for example to fetch code or remote configuration) and may
/// fail; a descriptor whose id differs from `module_id` is rejected.
///
/// # Example
///
/// ```ignore
/// use lazyboot_infrastructure::di::{ModuleDescriptor, ModuleFactory};
///
/// struct ReportModuleFactory;
///
/// #[async_trait::async_trait]
/// impl ModuleFactory for ReportModuleFactory {
///     fn module_id(&self) -> ModuleId {
///         ModuleId::from_static("report")
///     }
///
///     async fn create(&self) -> Result<ModuleDescriptor> {
///         ModuleDescriptor::builder("report").build()
///     }
/// }
/// ```
#[async_trait]
pub trait ModuleFactory: Send + Sync {
    /// Id of the module this factory produces
    fn module_id(&self) -> ModuleId;

    /// Produce the module descriptor
    async fn create(&self) -> Result<ModuleDescriptor>;
}

#[async_trait]
impl<T: ModuleFactory + ?Sized> ModuleFactory for Arc<T> {
    fn module_id(&self) -> ModuleId {
        (**self).module_id()
    }

    async fn create(&self) -> Result<ModuleDescriptor> {
        (**self).create().await
    }
}

/// Module factory backed by a closure
pub struct FnModuleFactory<F> {
    id: ModuleId,
    create: F,
}

#[async_trait]
impl<F, Fut> ModuleFactory for FnModuleFactory<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<ModuleDescriptor>> + Send + 'static,
{
    fn module_id(&self) -> ModuleId {
        self.id.clone()
    }

    async fn create(&self) -> Result<ModuleDescriptor> {
        (self.create)().await
    }
}

/// Build a module factory from an id and a closure creating the descriptor
pub fn module_factory<F, Fut>(id: impl Into<ModuleId>, create: F) -> FnModuleFactory<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<ModuleDescriptor>> + Send + 'static,
{
    FnModuleFactory {
        id: id.into(),
        create,
    }
}
