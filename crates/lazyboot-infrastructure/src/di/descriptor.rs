//! Module descriptors and provider registrations
//!
//! A [`ModuleDescriptor`] is the static shape of a module: which providers it
//! registers, which modules it imports, and which tokens it exports to
//! containers that import it. Descriptors are immutable once built.
//!
//! ```ignore
//! const SETTINGS: Token<Settings> = Token::new("settings");
//! const DATABASE: Token<Database> = Token::new("database");
//!
//! let descriptor = ModuleDescriptor::builder("root")
//!     .provider(Provider::value(SETTINGS, settings))
//!     .provider(
//!         Provider::singleton(DATABASE)
//!             .depends_on(SETTINGS)
//!             .on_dispose(|db: Arc<Database>| async move { db.close().await })
//!             .build(|deps| async move {
//!                 let settings = deps.get(&SETTINGS)?;
//!                 Database::connect(&settings.connection_url).await
//!             }),
//!     )
//!     .export(SETTINGS)
//!     .export(DATABASE)
//!     .build()?;
//! ```

use crate::di::factory::ModuleFactory;
use futures::FutureExt;
use futures::future::BoxFuture;
use lazyboot_domain::error::{Error, Result};
use lazyboot_domain::{ModuleId, ProviderToken, Scope, Token};
use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Type-erased provider instance
pub type Instance = Arc<dyn Any + Send + Sync>;

type FactoryFn = Arc<dyn Fn(ResolvedDependencies) -> BoxFuture<'static, Result<Instance>> + Send + Sync>;
type TeardownFn = Arc<dyn Fn(Instance) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Downcast an erased instance to the type a token promises
pub(crate) fn downcast<T: Send + Sync + 'static>(
    token: &ProviderToken,
    instance: Instance,
) -> Result<Arc<T>> {
    instance
        .downcast::<T>()
        .map_err(|_| Error::TypeMismatch {
            token: token.clone(),
            registered: token.type_name(),
            expected: std::any::type_name::<T>(),
        })
}

/// Compare a requested token with the registered one by type
pub(crate) fn check_type(requested: &ProviderToken, registered: &ProviderToken) -> Result<()> {
    if requested.type_id() == registered.type_id() {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            token: requested.clone(),
            registered: registered.type_name(),
            expected: requested.type_name(),
        })
    }
}

/// Dependencies handed to a provider factory
///
/// Contains exactly the tokens the registration declared, already resolved.
pub struct ResolvedDependencies {
    module: ModuleId,
    values: Vec<(ProviderToken, Instance)>,
}

impl ResolvedDependencies {
    pub(crate) fn new(module: ModuleId, values: Vec<(ProviderToken, Instance)>) -> Self {
        Self { module, values }
    }

    /// Typed access to a declared dependency
    pub fn get<T: Send + Sync + 'static>(&self, token: &Token<T>) -> Result<Arc<T>> {
        let requested = token.erase();
        let (registered, instance) = self
            .values
            .iter()
            .find(|(registered, _)| registered.name() == requested.name())
            .ok_or_else(|| Error::unknown_provider(requested.clone(), self.module.clone()))?;
        check_type(&requested, registered)?;
        downcast(&requested, Arc::clone(instance))
    }

    /// Module whose container is resolving the provider
    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    /// Number of resolved dependencies
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the provider declared no dependencies
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A provider registered in a module
///
/// Built with [`Provider`]; immutable after construction.
pub struct ProviderRegistration {
    token: ProviderToken,
    dependencies: Vec<ProviderToken>,
    scope: Scope,
    factory: FactoryFn,
    teardown: Option<TeardownFn>,
}

impl ProviderRegistration {
    /// Token this registration provides
    pub fn token(&self) -> &ProviderToken {
        &self.token
    }

    /// Declared dependencies, in resolution order
    pub fn dependencies(&self) -> &[ProviderToken] {
        &self.dependencies
    }

    /// Instance lifetime
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Whether a teardown hook runs when the owning container is disposed
    pub fn has_teardown(&self) -> bool {
        self.teardown.is_some()
    }

    pub(crate) fn invoke(&self, deps: ResolvedDependencies) -> BoxFuture<'static, Result<Instance>> {
        (self.factory)(deps)
    }

    pub(crate) fn teardown(&self, instance: Instance) -> Option<BoxFuture<'static, Result<()>>> {
        self.teardown.as_ref().map(|hook| hook(instance))
    }
}

impl fmt::Debug for ProviderRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistration")
            .field("token", &self.token)
            .field("dependencies", &self.dependencies)
            .field("scope", &self.scope)
            .field("teardown", &self.teardown.is_some())
            .finish_non_exhaustive()
    }
}

/// Typed builder for [`ProviderRegistration`]
pub struct Provider<T> {
    token: Token<T>,
    scope: Scope,
    dependencies: Vec<ProviderToken>,
    teardown: Option<TeardownFn>,
}

impl<T: Send + Sync + 'static> Provider<T> {
    /// Provider created once per container
    pub fn singleton(token: Token<T>) -> Self {
        Self::with_scope(token, Scope::Singleton)
    }

    /// Provider created on every resolution
    pub fn transient(token: Token<T>) -> Self {
        Self::with_scope(token, Scope::Transient)
    }

    /// Provider with an explicit scope
    pub fn with_scope(token: Token<T>, scope: Scope) -> Self {
        Self {
            token,
            scope,
            dependencies: Vec::new(),
            teardown: None,
        }
    }

    /// Singleton registration of an already constructed value
    pub fn value(token: Token<T>, value: T) -> ProviderRegistration {
        let instance: Instance = Arc::new(value);
        Self::singleton(token).build_erased(move |_| {
            let instance = Arc::clone(&instance);
            async move { Ok(instance) }.boxed()
        })
    }

    /// Declare a dependency; the factory receives it resolved
    #[must_use]
    pub fn depends_on<D: 'static>(mut self, token: Token<D>) -> Self {
        self.dependencies.push(token.erase());
        self
    }

    /// Declare an already erased dependency
    #[must_use]
    pub fn depends_on_token(mut self, token: ProviderToken) -> Self {
        self.dependencies.push(token);
        self
    }

    /// Hook run with the instance when the owning container is disposed
    ///
    /// Only singleton instances are torn down; transient instances belong to
    /// whoever resolved them.
    #[must_use]
    pub fn on_dispose<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let token = self.token.erase();
        self.teardown = Some(Arc::new(move |instance: Instance| {
            match downcast::<T>(&token, instance) {
                Ok(typed) => hook(typed).boxed(),
                Err(e) => async move { Err(e) }.boxed(),
            }
        }));
        self
    }

    /// Finish the registration with an asynchronous, fallible factory
    pub fn build<F, Fut>(self, factory: F) -> ProviderRegistration
    where
        F: Fn(ResolvedDependencies) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.build_erased(move |deps| {
            factory(deps)
                .map(|result| result.map(|value| Arc::new(value) as Instance))
                .boxed()
        })
    }

    fn build_erased<F>(self, factory: F) -> ProviderRegistration
    where
        F: Fn(ResolvedDependencies) -> BoxFuture<'static, Result<Instance>> + Send + Sync + 'static,
    {
        ProviderRegistration {
            token: self.token.erase(),
            dependencies: self.dependencies,
            scope: self.scope,
            factory: Arc::new(factory),
            teardown: self.teardown,
        }
    }
}

/// Static description of a module
pub struct ModuleDescriptor {
    id: ModuleId,
    providers: Vec<Arc<ProviderRegistration>>,
    imports: Vec<Arc<dyn ModuleFactory>>,
    exports: Vec<ProviderToken>,
}

impl ModuleDescriptor {
    /// Start describing a module
    pub fn builder(id: impl Into<ModuleId>) -> ModuleDescriptorBuilder {
        ModuleDescriptorBuilder {
            id: id.into(),
            providers: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            export_all: false,
        }
    }

    /// Module identity
    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    /// Registered providers in registration order
    pub fn providers(&self) -> &[Arc<ProviderRegistration>] {
        &self.providers
    }

    /// Factories of imported modules
    pub fn imports(&self) -> &[Arc<dyn ModuleFactory>] {
        &self.imports
    }

    /// Ids of imported modules
    pub fn imported_module_ids(&self) -> Vec<ModuleId> {
        self.imports.iter().map(|import| import.module_id()).collect()
    }

    /// Tokens visible to containers importing this module
    pub fn exports(&self) -> &[ProviderToken] {
        &self.exports
    }

    pub(crate) fn into_parts(
        self,
    ) -> (ModuleId, Vec<Arc<ProviderRegistration>>, Vec<ProviderToken>) {
        (self.id, self.providers, self.exports)
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("id", &self.id)
            .field("providers", &self.providers)
            .field("imports", &self.imported_module_ids())
            .field("exports", &self.exports)
            .finish()
    }
}

/// Builder for [`ModuleDescriptor`]
pub struct ModuleDescriptorBuilder {
    id: ModuleId,
    providers: Vec<ProviderRegistration>,
    imports: Vec<Arc<dyn ModuleFactory>>,
    exports: Vec<ProviderToken>,
    export_all: bool,
}

impl ModuleDescriptorBuilder {
    /// Register a provider
    #[must_use]
    pub fn provider(mut self, registration: ProviderRegistration) -> Self {
        self.providers.push(registration);
        self
    }

    /// Import another module; it is loaded before this one is instantiated
    #[must_use]
    pub fn import<F: ModuleFactory + 'static>(self, factory: F) -> Self {
        self.import_shared(Arc::new(factory))
    }

    /// Import another module through a shared factory
    #[must_use]
    pub fn import_shared(mut self, factory: Arc<dyn ModuleFactory>) -> Self {
        let id = factory.module_id();
        if !self.imports.iter().any(|import| import.module_id() == id) {
            self.imports.push(factory);
        }
        self
    }

    /// Expose a registered token to importing containers
    #[must_use]
    pub fn export<T: 'static>(mut self, token: Token<T>) -> Self {
        self.exports.push(token.erase());
        self
    }

    /// Expose every registered token
    #[must_use]
    pub fn export_all(mut self) -> Self {
        self.export_all = true;
        self
    }

    /// Validate and build the descriptor
    ///
    /// Fails with `DuplicateProvider` when two registrations share a token
    /// name, and with `InvalidExport` when an export names no registration
    /// (or one of a different type).
    pub fn build(self) -> Result<ModuleDescriptor> {
        let mut names = HashSet::new();
        for registration in &self.providers {
            if !names.insert(registration.token().name().to_string()) {
                return Err(Error::DuplicateProvider {
                    token: registration.token().clone(),
                    module: self.id,
                });
            }
        }

        let mut exports = Vec::new();
        if self.export_all {
            exports.extend(self.providers.iter().map(|p| p.token().clone()));
        }
        for export in self.exports {
            let registered = self.providers.iter().any(|p| p.token() == &export);
            if !registered {
                return Err(Error::InvalidExport {
                    token: export,
                    module: self.id,
                });
            }
            if !exports.contains(&export) {
                exports.push(export);
            }
        }

        Ok(ModuleDescriptor {
            id: self.id,
            providers: self.providers.into_iter().map(Arc::new).collect(),
            imports: self.imports,
            exports,
        })
    }
}
