use std::env;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

use jdbias_http_service::{HttpServiceConfig, HttpServiceConfigBuilder};

const API_URL_KEY: &str = "JDBIAS_API_URL";
const TIMEOUT_KEY: &str = "JDBIAS_TIMEOUT_SECS";
const LOG_FILE_KEY: &str = "JDBIAS_LOG_FILE";
const PLAIN_KEY: &str = "JDBIAS_PLAIN";

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// An environment variable that holds an unusable value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigError {
    key: &'static str,
    value: String,
    reason: &'static str,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}={:?}: {}", self.key, self.value, self.reason)
    }
}

impl Error for ConfigError {}

/// Settings of the terminal client, read once at start-up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the analysis API.
    pub api_url: String,
    /// How long a single analysis request may take.
    pub timeout: Duration,
    /// Where to write logs, if anywhere.
    pub log_file: Option<PathBuf>,
    /// Whether to use the line-mode front end instead of the full-screen
    /// one.
    pub plain: bool,
}

impl AppConfig {
    /// Reads the configuration from `JDBIAS_*` environment variables.
    #[inline]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value
    /// of a variable if it is set.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_url = lookup(API_URL_KEY)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned());

        let timeout = match lookup(TIMEOUT_KEY) {
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError {
                        key: TIMEOUT_KEY,
                        value,
                        reason: "expected a positive number of seconds",
                    });
                }
            },
        };

        let log_file = lookup(LOG_FILE_KEY)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let plain = match lookup(PLAIN_KEY).as_deref().map(str::trim) {
            None | Some("") | Some("0") => false,
            Some(v) if v.eq_ignore_ascii_case("false") => false,
            Some("1") => true,
            Some(v) if v.eq_ignore_ascii_case("true") => true,
            Some(v) => {
                return Err(ConfigError {
                    key: PLAIN_KEY,
                    value: v.to_owned(),
                    reason: "expected 1, 0, true or false",
                });
            }
        };

        Ok(Self {
            api_url,
            timeout,
            log_file,
            plain,
        })
    }

    /// Returns the configuration of the HTTP analysis service.
    #[inline]
    pub fn http_config(&self) -> HttpServiceConfig {
        HttpServiceConfigBuilder::with_base_url(&self.api_url)
            .with_timeout(self.timeout)
            .build()
    }
}
