// Shared transport configuration for building reqwest::Client instances.
//
// Every vendor call goes through one client built here, so the request
// timeout bounds token grants, status fetches, log queries and
// specification lookups alike.

use std::time::Duration;

const USER_AGENT: &str = concat!("cloudtel/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Upper bound for a single request, connect to last body byte.
    pub timeout: Duration,
    /// Upper bound for establishing the TCP/TLS connection.
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl TransportConfig {
    /// Config with a custom request timeout; connect timeout is capped by it.
    pub fn with_timeout(timeout: Duration) -> Self {
        let defaults = Self::default();
        Self {
            timeout,
            connect_timeout: defaults.connect_timeout.min(timeout),
        }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(crate::error::Error::Transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_timeout_never_exceeds_request_timeout() {
        let cfg = TransportConfig::with_timeout(Duration::from_secs(2));
        assert_eq!(cfg.timeout, Duration::from_secs(2));
        assert_eq!(cfg.connect_timeout, Duration::from_secs(2));

        let cfg = TransportConfig::with_timeout(Duration::from_secs(30));
        assert_eq!(cfg.connect_timeout, Duration::from_secs(5));
    }
}
