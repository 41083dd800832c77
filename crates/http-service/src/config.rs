use std::fmt::Debug;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Builder for [`HttpServiceConfig`].
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct HttpServiceConfigBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpServiceConfigBuilder {
    /// Creates a builder with the given base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: Some(base_url.into()),
            timeout: None,
        }
    }

    /// Sets the timeout of a whole request, from connecting until the
    /// reply body is read.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> HttpServiceConfig {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        HttpServiceConfig {
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
        }
    }
}

impl Debug for HttpServiceConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpServiceConfigBuilder")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Configuration for the HTTP analysis service.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpServiceConfig {
    pub(crate) base_url: String,
    pub(crate) timeout: Duration,
}

impl HttpServiceConfig {
    /// Returns the base URL, without a trailing slash.
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the request timeout.
    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HttpServiceConfigBuilder::default().build();
        assert_eq!(config.base_url(), "http://localhost:8000");
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_trailing_slash() {
        let config =
            HttpServiceConfigBuilder::with_base_url("https://bias.example/api/")
                .with_timeout(Duration::from_secs(5))
                .build();
        assert_eq!(config.endpoint("/chat"), "https://bias.example/api/chat");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }
}
