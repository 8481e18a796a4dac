// HTTP client configuration
// Requests are single-shot: a failed request is reported, never retried

use musicplayer_core::{AudioError, Result};
use std::time::Duration;

/// HTTP agent settings
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub user_agent: String,
    pub max_redirects: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
            user_agent: format!("MusicPlayer/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
        }
    }
}

/// HTTP client wrapper
#[derive(Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.connect_timeout)
            .timeout_read(config.read_timeout)
            .user_agent(&config.user_agent)
            .redirects(config.max_redirects)
            .build();
        Self { agent }
    }

    pub fn get(&self, url: &str) -> Result<ureq::Response> {
        self.agent.get(url).call().map_err(|e| map_error(url, e))
    }

    /// GET starting at byte `offset` (open-ended range)
    pub fn get_from(&self, url: &str, offset: u64) -> Result<ureq::Response> {
        self.agent
            .get(url)
            .set("Range", &format!("bytes={}-", offset))
            .call()
            .map_err(|e| map_error(url, e))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(&HttpConfig::default())
    }
}

fn map_error(url: &str, err: ureq::Error) -> AudioError {
    match err {
        ureq::Error::Status(code, _) => {
            AudioError::Network(format!("GET {} returned HTTP {}", url, code))
        }
        ureq::Error::Transport(transport) => {
            AudioError::Network(format!("GET {} failed: {}", url, transport))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpConfig::default();
        assert_eq!(config.max_redirects, 10);
        assert!(config.user_agent.starts_with("MusicPlayer/"));
    }

    #[test]
    fn test_unreachable_host_is_network_error() {
        let config = HttpConfig {
            connect_timeout: Duration::from_millis(500),
            ..HttpConfig::default()
        };
        let client = HttpClient::new(&config);
        // Port 9 on localhost: nothing listens there in a test environment
        let err = client.get("http://127.0.0.1:9/song.mp3").unwrap_err();
        assert!(matches!(err, AudioError::Network(_)));
    }
}
