//! Export worker module
//!
//! The formatter is a singleton; every export runs in a fresh transient
//! [`ExportJob`].

use crate::di::descriptor::{ModuleDescriptor, Provider};
use crate::di::factory::ModuleFactory;
use crate::di::modules::data::Database;
use crate::di::modules::root::DATABASE;
use async_trait::async_trait;
use lazyboot_domain::error::Result;
use lazyboot_domain::{ModuleId, Token};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Line formatter shared by every export job
pub const EXPORT_FORMATTER: Token<ExportFormatter> = Token::new("export.formatter");

/// One export run, created per resolution
pub const EXPORT_JOB: Token<ExportJob> = Token::new("export.job");

/// Export module identity
pub const EXPORT_MODULE: ModuleId = ModuleId::from_static("export");

/// Renders records as JSON lines
#[derive(Debug, Default)]
pub struct ExportFormatter {
    jobs: AtomicU64,
}

impl ExportFormatter {
    /// Allocate the next job number
    pub fn next_job(&self) -> u64 {
        self.jobs.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Format one record as a JSON line
    pub fn line(&self, key: &str, value: &Value) -> String {
        json!({ "key": key, "value": value }).to_string()
    }
}

/// Single export run
#[derive(Debug)]
pub struct ExportJob {
    number: u64,
    formatter: Arc<ExportFormatter>,
    db: Arc<Database>,
}

impl ExportJob {
    /// Sequence number of this job within the module
    pub fn number(&self) -> u64 {
        self.number
    }

    /// Export every stored record, optionally keeping only keys starting with `prefix`
    pub fn run(&self, prefix: Option<&str>) -> Result<Value> {
        let lines: Vec<String> = self
            .db
            .records()?
            .iter()
            .filter(|(key, _)| prefix.is_none_or(|p| key.starts_with(p)))
            .map(|(key, value)| self.formatter.line(key, value))
            .collect();
        Ok(json!({
            "job": self.number,
            "format": "jsonl",
            "lines": lines,
        }))
    }
}

/// Factory of the export module descriptor
#[derive(Debug, Clone)]
pub struct ExportModuleFactory {
    init_delay: Duration,
}

impl ExportModuleFactory {
    /// Factory whose formatter takes `init_delay` to initialize
    pub fn new(init_delay: Duration) -> Self {
        Self { init_delay }
    }
}

#[async_trait]
impl ModuleFactory for ExportModuleFactory {
    fn module_id(&self) -> ModuleId {
        EXPORT_MODULE
    }

    async fn create(&self) -> Result<ModuleDescriptor> {
        let init_delay = self.init_delay;
        ModuleDescriptor::builder(EXPORT_MODULE)
            .provider(Provider::singleton(EXPORT_FORMATTER).build(move |_| async move {
                tokio::time::sleep(init_delay).await;
                Ok(ExportFormatter::default())
            }))
            .provider(
                Provider::transient(EXPORT_JOB)
                    .depends_on(EXPORT_FORMATTER)
                    .depends_on(DATABASE)
                    .build(|deps| async move {
                        let formatter = deps.get(&EXPORT_FORMATTER)?;
                        Ok(ExportJob {
                            number: formatter.next_job(),
                            formatter,
                            db: deps.get(&DATABASE)?,
                        })
                    }),
            )
            .export_all()
            .build()
    }
}
