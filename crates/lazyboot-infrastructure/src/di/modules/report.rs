//! Report worker module
//!
//! Loaded lazily for report invocations. Resolves the database from the
//! root container through the loader's parent.

use crate::di::descriptor::{ModuleDescriptor, Provider};
use crate::di::factory::ModuleFactory;
use crate::di::modules::data::Database;
use crate::di::modules::root::DATABASE;
use async_trait::async_trait;
use lazyboot_domain::error::Result;
use lazyboot_domain::{ModuleId, Token};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

/// Report aggregation service
pub const REPORT_SERVICE: Token<ReportService> = Token::new("report.service");

/// Report module identity
pub const REPORT_MODULE: ModuleId = ModuleId::from_static("report");

/// Records invocation payloads and summarizes what is stored
#[derive(Debug)]
pub struct ReportService {
    db: Arc<Database>,
}

impl ReportService {
    /// Service over `db`
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store `payload` under `key` and report the store's totals
    pub fn record(&self, key: &str, payload: &Value) -> Result<Value> {
        self.db.insert(key, payload.clone())?;
        Ok(json!({
            "recorded": key,
            "records": self.db.len(),
            "queries": self.db.query_count(),
        }))
    }
}

/// Factory of the report module descriptor
#[derive(Debug, Clone)]
pub struct ReportModuleFactory {
    init_delay: Duration,
}

impl ReportModuleFactory {
    /// Factory whose service takes `init_delay` to initialize
    pub fn new(init_delay: Duration) -> Self {
        Self { init_delay }
    }
}

#[async_trait]
impl ModuleFactory for ReportModuleFactory {
    fn module_id(&self) -> ModuleId {
        REPORT_MODULE
    }

    async fn create(&self) -> Result<ModuleDescriptor> {
        let init_delay = self.init_delay;
        ModuleDescriptor::builder(REPORT_MODULE)
            .provider(
                Provider::singleton(REPORT_SERVICE)
                    .depends_on(DATABASE)
                    .build(move |deps| async move {
                        tokio::time::sleep(init_delay).await;
                        Ok(ReportService::new(deps.get(&DATABASE)?))
                    }),
            )
            .export(REPORT_SERVICE)
            .build()
    }
}
