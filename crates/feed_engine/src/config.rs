use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// Where pages come from and which credential to attach.
#[derive(Clone, PartialEq, Eq)]
pub struct FeedEndpoint {
    pub base_url: String,
    /// Appended verbatim to `base_url`; may already carry a query string.
    pub path: String,
    pub api_key: String,
    pub api_key_header: String,
}

impl FeedEndpoint {
    pub fn new(
        base_url: impl Into<String>,
        path: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            path: path.into(),
            api_key: api_key.into(),
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
        }
    }

    pub fn credential_header(&self) -> (String, String) {
        (self.api_key_header.clone(), self.api_key.clone())
    }
}

// Keeps the credential out of logs.
impl fmt::Debug for FeedEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedEndpoint")
            .field("base_url", &self.base_url)
            .field("path", &self.path)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("api_key_header", &self.api_key_header)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
        }
    }
}
