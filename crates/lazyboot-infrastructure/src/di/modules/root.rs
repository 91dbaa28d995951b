//! Root application module
//!
//! Registers the settings value and the database connection every worker
//! module builds on. Both are exported so worker loaders parented on the
//! root container can resolve them.

use crate::config::AppConfig;
use crate::di::descriptor::{ModuleDescriptor, Provider};
use crate::di::factory::ModuleFactory;
use crate::di::modules::data::Database;
use async_trait::async_trait;
use lazyboot_domain::constants::ROOT_MODULE_ID;
use lazyboot_domain::error::Result;
use lazyboot_domain::{ModuleId, Token};
use std::sync::Arc;

/// Application settings
pub const SETTINGS: Token<AppConfig> = Token::new("settings");

/// Shared database connection
pub const DATABASE: Token<Database> = Token::new("database");

/// Root module identity
pub const ROOT_MODULE: ModuleId = ModuleId::from_static(ROOT_MODULE_ID);

/// Factory of the root module descriptor
#[derive(Debug, Clone)]
pub struct RootModuleFactory {
    config: Arc<AppConfig>,
}

impl RootModuleFactory {
    /// Root factory for `config`
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ModuleFactory for RootModuleFactory {
    fn module_id(&self) -> ModuleId {
        ROOT_MODULE
    }

    async fn create(&self) -> Result<ModuleDescriptor> {
        ModuleDescriptor::builder(ROOT_MODULE)
            .provider(Provider::value(SETTINGS, AppConfig::clone(&self.config)))
            .provider(
                Provider::singleton(DATABASE)
                    .depends_on(SETTINGS)
                    .on_dispose(|db: Arc<Database>| async move { db.close().await })
                    .build(|deps| async move {
                        let settings = deps.get(&SETTINGS)?;
                        Database::connect(&settings.data).await
                    }),
            )
            .export(SETTINGS)
            .export(DATABASE)
            .build()
    }
}
