//! Utility Tests
