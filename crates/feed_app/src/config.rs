//! RON configuration for feed_app.
//!
//! Every key is optional; missing keys fall back to `AppConfig::default()`.
//! `FEED_API_KEY` in the environment takes precedence over `api_key`.
use std::fs;
use std::path::Path;
use std::time::Duration;

use feed_engine::{FeedEndpoint, TransportSettings, DEFAULT_API_KEY_HEADER};
use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;

use crate::logging::LogDestination;
use crate::photo::ImageSize;

pub const API_KEY_ENV: &str = "FEED_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid RON in config file: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("page_size must be greater than zero")]
    ZeroPageSize,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub path: String,
    pub api_key: String,
    pub api_key_header: String,
    pub page_size: u32,
    /// Stop after this many pages; `None` pages until the feed runs out.
    pub max_pages: Option<u32>,
    pub image_size: ImageSize,
    pub transport: TransportConfig,
    pub log: LogDestination,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.thecatapi.com/v1/".to_string(),
            path: "images/search?format=json&order=asc&size=small&has_breeds=false".to_string(),
            api_key: String::new(),
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            page_size: 20,
            max_pages: None,
            image_size: ImageSize::default(),
            transport: TransportConfig::default(),
            log: LogDestination::default(),
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        let settings = TransportSettings::default();
        Self {
            connect_timeout_ms: settings.connect_timeout.as_millis() as u64,
            request_timeout_ms: settings.request_timeout.as_millis() as u64,
            redirect_limit: settings.redirect_limit,
            max_bytes: settings.max_bytes,
        }
    }
}

impl AppConfig {
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = ron::from_str(text)?;
        if config.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(config)
    }

    /// Replaces values with environment overrides found through `lookup`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(API_KEY_ENV).filter(|key| !key.trim().is_empty()) {
            self.api_key = key.trim().to_string();
        }
        self
    }

    pub fn endpoint(&self) -> FeedEndpoint {
        FeedEndpoint {
            base_url: self.base_url.clone(),
            path: self.path.clone(),
            api_key: self.api_key.clone(),
            api_key_header: self.api_key_header.clone(),
        }
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            connect_timeout: Duration::from_millis(self.transport.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.transport.request_timeout_ms),
            redirect_limit: self.transport.redirect_limit,
            max_bytes: self.transport.max_bytes,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}

pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = fs::read_to_string(path)?;
    AppConfig::from_ron(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config = AppConfig::from_ron("()").expect("parses");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.api_key_header, "x-api-key");
        assert_eq!(config.log, LogDestination::Terminal);
        assert_eq!(
            config.transport_settings().request_timeout,
            Duration::from_secs(30)
        );
    }

    #[test]
    fn partial_config_overrides_selected_keys() {
        let config = AppConfig::from_ron(
            r#"(
                base_url: "https://photos.example.com/",
                path: "list?kind=cats",
                page_size: 5,
                max_pages: Some(2),
                image_size: (width: 200, height: 100),
                transport: (request_timeout_ms: 1500),
                log: Both,
            )"#,
        )
        .expect("parses");

        let endpoint = config.endpoint();
        assert_eq!(endpoint.base_url, "https://photos.example.com/");
        assert_eq!(endpoint.path, "list?kind=cats");
        assert_eq!(config.max_pages, Some(2));
        assert_eq!(config.image_size.width, 200);
        assert_eq!(
            config.transport_settings().request_timeout,
            Duration::from_millis(1500)
        );
        assert_eq!(config.transport.redirect_limit, 5);
        assert_eq!(config.log, LogDestination::Both);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = AppConfig::from_ron("(page_size: 0)").err().expect("expected an error");
        assert!(matches!(err, ConfigError::ZeroPageSize));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let err = AppConfig::from_ron("(page_size: \"ten\")").err().expect("expected an error");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_key_takes_precedence() {
        let config = AppConfig::from_ron(r#"(api_key: "from-file")"#).expect("parses");
        let config = config.with_env_overrides(|name| {
            (name == API_KEY_ENV).then(|| " from-env ".to_string())
        });
        assert_eq!(config.endpoint().api_key, "from-env");

        let config = config.with_env_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.api_key, "from-env");
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "(page_size: 7, verbose: true)").expect("write");

        let config = load(file.path()).expect("loads");
        assert_eq!(config.page_size, 7);
        assert_eq!(config.log_level(), LevelFilter::Debug);

        let missing = load(Path::new("/definitely/not/here.ron")).err().expect("expected an error");
        assert!(matches!(missing, ConfigError::Io(_)));
    }
}
