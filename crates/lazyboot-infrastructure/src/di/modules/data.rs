//! Simulated data store shared through the root container
//!
//! Stands in for the connection pool a real application opens during cold
//! start: connecting costs `data.connect_delay_ms`, and a `fail://` url
//! simulates an unreachable backend.

use crate::config::DataConfig;
use dashmap::DashMap;
use lazyboot_domain::error::{Error, Result};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Url scheme whose connections always fail
pub const FAILING_URL_SCHEME: &str = "fail://";

/// In-memory record store with connection semantics
#[derive(Debug)]
pub struct Database {
    url: String,
    records: DashMap<String, Value>,
    queries: AtomicU64,
    open: AtomicBool,
}

impl Database {
    /// Open a connection, paying the configured latency
    pub async fn connect(config: &DataConfig) -> Result<Self> {
        tokio::time::sleep(Duration::from_millis(config.connect_delay_ms)).await;

        if config.connection_url.starts_with(FAILING_URL_SCHEME) {
            return Err(Error::factory(format!(
                "Connection refused: {}",
                config.connection_url
            )));
        }

        info!(url = %config.connection_url, "Database connected");
        Ok(Self {
            url: config.connection_url.clone(),
            records: DashMap::new(),
            queries: AtomicU64::new(0),
            open: AtomicBool::new(true),
        })
    }

    /// Connection url
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether the connection is still open
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Store a record, replacing any previous value under `key`
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Result<()> {
        self.ensure_open()?;
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.records.insert(key.into(), value);
        Ok(())
    }

    /// Fetch a record
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        self.ensure_open()?;
        self.queries.fetch_add(1, Ordering::Relaxed);
        Ok(self.records.get(key).map(|entry| entry.value().clone()))
    }

    /// Every record, sorted by key
    pub fn records(&self) -> Result<Vec<(String, Value)>> {
        self.ensure_open()?;
        self.queries.fetch_add(1, Ordering::Relaxed);
        let mut records: Vec<_> = self
            .records
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        records.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(records)
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record is stored
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of queries served since connecting
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    /// Close the connection; later queries fail
    pub async fn close(&self) -> Result<()> {
        if self.open.swap(false, Ordering::AcqRel) {
            debug!(url = %self.url, "Database closed");
        }
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(Error::infrastructure(format!(
                "Database connection closed: {}",
                self.url
            )))
        }
    }
}
