//! Infrastructure layer constants
//!
//! Domain-specific constants are defined in `lazyboot_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "lazyboot.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "lazyboot";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "LAZYBOOT";

/// Separator between nested keys in environment variables (`LAZYBOOT_DATA__CONNECTION_URL`)
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the configured log filter
pub const LOG_FILTER_ENV: &str = "LAZYBOOT_LOG";

/// File stem used for rotated log files when none is configured
pub const DEFAULT_LOG_FILE_STEM: &str = "lazyboot";

// ============================================================================
// APPLICATION CONSTANTS
// ============================================================================

/// Default application name reported by invocations
pub const DEFAULT_APP_NAME: &str = "lazyboot";

/// Default connection url of the simulated data store
pub const DEFAULT_CONNECTION_URL: &str = "memory://lazyboot";

/// Default simulated connection latency in milliseconds
pub const DEFAULT_CONNECT_DELAY_MS: u64 = 50;

/// Default simulated initialization latency of worker modules in milliseconds
pub const DEFAULT_WORKER_INIT_DELAY_MS: u64 = 20;
