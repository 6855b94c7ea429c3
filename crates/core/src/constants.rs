//! Shared constants for statlines.

/// Overrides the database file location.
pub const DB_PATH_ENV: &str = "STATLINES_DB_PATH";

/// r2d2 pool size.
pub const POOL_SIZE_ENV: &str = "STATLINES_DB_POOL_SIZE";

/// SQLite busy timeout in milliseconds.
pub const BUSY_TIMEOUT_ENV: &str = "STATLINES_BUSY_TIMEOUT_MS";

pub const DEFAULT_POOL_SIZE: u32 = 4;

pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;

/// Short name of the competition that pre-competition rows are back-filled to.
pub const DEFAULT_COMPETITION: &str = "EPL";

/// Upper bound on short codes derived from team names.
pub const SHORT_CODE_LEN: usize = 3;
