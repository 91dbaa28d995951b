//! DI Layer Tests
//!
//! Tests for the bootstrap-and-lazy-load core:
//! - Dependency graph resolution, memoization and cycle detection
//! - Container lifecycle
//! - Lazy module loading, retries and unloading
//! - Bootstrap slot concurrency and failure handling
//! - Reference dispatcher wiring

mod dispatch_test;
