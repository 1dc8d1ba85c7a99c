use std::time::Duration;

use planner_core::scheduling::{CLEANUP_INTERVAL_SECS, DISPATCH_INTERVAL_SECS, RETENTION_DAYS};

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Time between dispatcher ticks.
    pub dispatch_interval: Duration,
    /// Time between cleanup runs.
    pub cleanup_interval: Duration,
    /// Records triggered more than this many days ago are deleted.
    pub retention_days: i64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            dispatch_interval: Duration::from_secs(DISPATCH_INTERVAL_SECS),
            cleanup_interval: Duration::from_secs(CLEANUP_INTERVAL_SECS),
            retention_days: RETENTION_DAYS,
        }
    }
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default |
    /// |--------------------------|---------|
    /// | `DISPATCH_INTERVAL_SECS` | `60`    |
    /// | `CLEANUP_INTERVAL_SECS`  | `86400` |
    /// | `RETENTION_DAYS`         | `7`     |
    ///
    /// Push credentials are read separately by `FcmConfig::from_env`.
    pub fn from_env() -> Self {
        let dispatch_secs: u64 = std::env::var("DISPATCH_INTERVAL_SECS")
            .unwrap_or_else(|_| DISPATCH_INTERVAL_SECS.to_string())
            .parse()
            .expect("DISPATCH_INTERVAL_SECS must be a valid u64");

        let cleanup_secs: u64 = std::env::var("CLEANUP_INTERVAL_SECS")
            .unwrap_or_else(|_| CLEANUP_INTERVAL_SECS.to_string())
            .parse()
            .expect("CLEANUP_INTERVAL_SECS must be a valid u64");

        let retention_days: i64 = std::env::var("RETENTION_DAYS")
            .unwrap_or_else(|_| RETENTION_DAYS.to_string())
            .parse()
            .expect("RETENTION_DAYS must be a valid i64");

        assert!(dispatch_secs > 0, "DISPATCH_INTERVAL_SECS must be positive");
        assert!(cleanup_secs > 0, "CLEANUP_INTERVAL_SECS must be positive");

        Self {
            dispatch_interval: Duration::from_secs(dispatch_secs),
            cleanup_interval: Duration::from_secs(cleanup_secs),
            retention_days,
        }
    }
}
