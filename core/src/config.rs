//! Client configuration.

use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

/// Context.IO Lite API root.
pub const LITE_HOST: &str = "https://api.context.io/lite";

/// Context.IO 2.0 API root.
pub const V2_HOST: &str = "https://api.context.io/2.0";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout used by clients pointed at a local stand-in server.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Credentials and endpoint for one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Config {
    pub fn new(consumer_key: &str, consumer_secret: &str) -> Self {
        Self {
            consumer_key: consumer_key.to_string(),
            consumer_secret: consumer_secret.to_string(),
            base_url: LITE_HOST.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads from `.env` file if present. Required variables:
    /// - `CIO_API_KEY`
    /// - `CIO_API_SECRET`
    ///
    /// Optional (with defaults):
    /// - `CIO_BASE_URL` (default: the Lite API root)
    /// - `CIO_TIMEOUT_SECS` (default: `120`)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Config(format!("{name} not set")))
        };
        let timeout = match lookup("CIO_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .map_err(|e| Error::Config(format!("Invalid CIO_TIMEOUT_SECS: {e}")))?,
            ),
            None => DEFAULT_TIMEOUT,
        };
        Ok(Self {
            consumer_key: required("CIO_API_KEY")?,
            consumer_secret: required("CIO_API_SECRET")?,
            base_url: lookup("CIO_BASE_URL").unwrap_or_else(|| LITE_HOST.to_string()),
            timeout,
        })
    }
}
