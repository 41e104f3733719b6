//! Store configuration loaded from environment variables.

use std::env;
use std::time::Duration;

/// Document store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub db_name: String,
    /// Server-side deadline for individual queries.
    pub op_timeout: Duration,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// `MONGODB_URL` is required when the mongo adapter is used;
    /// `MONGODB_DB_NAME` defaults to "quill", `STORE_TIMEOUT_SECS` to 10.
    pub fn from_env() -> Option<Self> {
        let url = env::var("MONGODB_URL").ok()?;
        Some(Self {
            url,
            db_name: env::var("MONGODB_DB_NAME").unwrap_or_else(|_| "quill".to_string()),
            op_timeout: Duration::from_secs(
                env::var("STORE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        })
    }
}
