use crate::demo;
use query_framework::{RestTransport, Transport};
use serde::Deserialize;
use std::env::vars;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CHANNEL_BUFFER: usize = 32;

// The final, validated configuration struct.
#[derive(Debug, Clone)]
pub struct AppConfig {
    api_base_url: Option<String>,
    api_token: Option<String>,
    page_size: u32,
    request_timeout: Duration,
    channel_buffer: usize,
}

// An intermediate struct for deserializing environment variables
// where everything is optional.
#[derive(Deserialize)]
struct RawConfig {
    api_base_url: Option<String>,
    api_token: Option<String>,
    page_size: Option<u32>,
    request_timeout_secs: Option<u64>,
    channel_buffer: Option<usize>,
}

impl AppConfig {
    /// A configuration for tests: the given API, no token, default sizes.
    pub fn new_for_test(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: Some(api_base_url.into()),
            api_token: None,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(5),
            channel_buffer: DEFAULT_CHANNEL_BUFFER,
        }
    }

    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url.as_deref()
    }

    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn channel_buffer(&self) -> usize {
        self.channel_buffer
    }

    /// Reads `API_BASE_URL`, `API_TOKEN`, `PAGE_SIZE`, `REQUEST_TIMEOUT_SECS` and
    /// `CHANNEL_BUFFER` from the environment.
    pub fn init() -> anyhow::Result<Self> {
        info!("Loading configuration from environment variables");
        let raw_config: RawConfig = serde_env::from_iter(vars())?;
        Self::from_raw(raw_config)
    }

    fn from_raw(raw_config: RawConfig) -> anyhow::Result<Self> {
        let RawConfig {
            api_base_url,
            api_token,
            page_size,
            request_timeout_secs,
            channel_buffer,
        } = raw_config;

        let api_base_url = api_base_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        if let Some(url) = &api_base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("API_BASE_URL must start with http:// or https://, got {url}");
            }
        }

        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            anyhow::bail!("PAGE_SIZE must be at least 1");
        }

        let channel_buffer = channel_buffer.unwrap_or(DEFAULT_CHANNEL_BUFFER);
        if channel_buffer == 0 {
            anyhow::bail!("CHANNEL_BUFFER must be at least 1");
        }

        let timeout_secs = request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be at least 1");
        }

        Ok(Self {
            api_base_url,
            api_token: api_token.filter(|token| !token.is_empty()),
            page_size,
            request_timeout: Duration::from_secs(timeout_secs),
            channel_buffer,
        })
    }

    /// The REST API when `API_BASE_URL` is set, the bundled sample data otherwise.
    pub fn transport(&self) -> anyhow::Result<Arc<dyn Transport>> {
        let Some(url) = &self.api_base_url else {
            warn!("API_BASE_URL not set, serving sample data from memory");
            return Ok(Arc::new(demo::seeded_backend()));
        };

        info!(%url, timeout = ?self.request_timeout, "Using REST API");
        let mut transport = RestTransport::new(url.clone(), self.request_timeout)?;
        if let Some(token) = &self.api_token {
            transport = transport.with_token(token.clone());
        }
        Ok(Arc::new(transport))
    }
}
