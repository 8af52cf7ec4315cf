use std::env;
use std::time::Duration;

use crate::errors::SetupError;

#[derive(Debug, Clone, Default)]
pub struct HarnessConfig {
    /// Service under test. `None` starts one in-process.
    pub api_url: Option<String>,
    /// Store to verify against. `None` uses a scratch SQLite file.
    pub database_url: Option<String>,
    pub http_timeout: Option<Duration>,
}

impl HarnessConfig {
    pub fn from_env() -> Result<Self, SetupError> {
        // Load .env for ORDERS_API_URL / DATABASE_URL when present.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SetupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = non_empty("ORDERS_API_URL");
        let database_url = non_empty("DATABASE_URL");
        if api_url.is_some() && database_url.is_none() {
            return Err(SetupError::Config(
                "ORDERS_API_URL is set but DATABASE_URL is not; \
                 the harness needs the service's store to verify against"
                    .into(),
            ));
        }

        let http_timeout = non_empty("ORDERS_HTTP_TIMEOUT_SECS")
            .map(|raw| {
                raw.parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| SetupError::Config(format!("ORDERS_HTTP_TIMEOUT_SECS {raw:?}: {e}")))
            })
            .transpose()?;

        Ok(Self {
            api_url,
            database_url,
            http_timeout,
        })
    }
}
