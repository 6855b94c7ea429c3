//! Environment variable parsing with warn-level logging for invalid values.

use std::path::PathBuf;

use crate::constants::{
    BUSY_TIMEOUT_ENV, DB_PATH_ENV, DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_POOL_SIZE, POOL_SIZE_ENV,
};

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    match std::env::var(var) {
        Ok(v) => match v.parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        Err(_) => default,
    }
}

/// Database location: `STATLINES_DB_PATH`, else the platform data dir.
#[must_use]
pub fn db_path_from_env() -> PathBuf {
    match std::env::var(DB_PATH_ENV) {
        Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("statlines")
            .join("statlines.db"),
    }
}

#[must_use]
pub fn pool_size_from_env() -> u32 {
    env_parse_with_default(POOL_SIZE_ENV, DEFAULT_POOL_SIZE).max(1)
}

#[must_use]
pub fn busy_timeout_ms_from_env() -> u32 {
    env_parse_with_default(BUSY_TIMEOUT_ENV, DEFAULT_BUSY_TIMEOUT_MS)
}
