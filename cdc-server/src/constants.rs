//! Defaults for server options and the coordination service health check.

/// Default GC safepoint TTL in seconds (24 hours)
pub const DEFAULT_GC_TTL_SECS: u64 = 24 * 60 * 60;

/// Interval between coordination service liveness probes in milliseconds
pub const HEALTH_CHECK_TICK_INTERVAL_MS: u64 = 3_000;

/// Upper bound on a single liveness probe in milliseconds
pub const HEALTH_CHECK_PROBE_TIMEOUT_MS: u64 = 2_000;

/// Consecutive failed probes before the coordination service is declared unreachable
pub const HEALTH_CHECK_FAILURE_THRESHOLD: u32 = 3;

/// Path of the etcd health endpoint, relative to a client URL
pub const ETCD_HEALTH_PATH: &str = "/health";

/// Log file name inside the configured logs directory
pub const LOG_FILE_NAME: &str = "cdc.log";
