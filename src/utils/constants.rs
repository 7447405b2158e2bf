//! Constants used across the relay.

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/relay.json";

/// Gas limit used for relayed and callback transactions unless configured
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;

/// Interval between receipt lookups
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;

/// How long a submitted transaction may stay unmined before the attempt is abandoned
pub const DEFAULT_RECEIPT_TIMEOUT_MS: u64 = 120_000;

/// Upper bound on the delay between resubscription attempts
pub const MAX_RESUBSCRIBE_DELAY_MS: u64 = 30_000;

/// Resubscription attempts before the engine gives up on the source chain
pub const MAX_RESUBSCRIBE_ATTEMPTS: usize = 10;

/// Default address for the metrics server
pub const DEFAULT_METRICS_ADDRESS: &str = "127.0.0.1:8081";

/// Default directory for log files
pub const DEFAULT_LOG_DIR: &str = "logs/";
