use regex::Regex;
use serde::Deserialize;

/// Default number of entities requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 500;
/// Default number of operations submitted per mutate call.
pub const DEFAULT_BATCH_SIZE: usize = 2000;

const DEFAULT_BASE_URL: &str = "https://adwords.google.com";
const DEFAULT_API_VERSION: &str = "v201809";

/// Connection and tuning settings shared by every call made through an `AdsClient`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub base_url: String,
    pub api_version: String,
    pub developer_token: String,
    pub access_token: String,
    pub client_customer_id: String,
    pub page_size: u32,
    pub batch_size: usize,
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub cache_capacity: u64,
}

impl Config {
    /// Builds a config with defaults for every optional setting.
    pub fn new(
        developer_token: impl Into<String>,
        access_token: impl Into<String>,
        client_customer_id: impl Into<String>,
    ) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            developer_token: developer_token.into(),
            access_token: access_token.into(),
            client_customer_id: client_customer_id.into(),
            page_size: DEFAULT_PAGE_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            request_timeout_secs: 30,
            cache_ttl_secs: 300,
            cache_capacity: 1_000,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            base_url: std::env::var("ADS_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_version: std::env::var("ADS_API_VERSION")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            developer_token: std::env::var("ADS_DEVELOPER_TOKEN")
                .map_err(|_| anyhow::anyhow!("ADS_DEVELOPER_TOKEN environment variable required"))
                .and_then(|token| {
                    if token.trim().is_empty() {
                        anyhow::bail!("ADS_DEVELOPER_TOKEN cannot be empty");
                    }
                    Ok(token)
                })?,
            access_token: std::env::var("ADS_ACCESS_TOKEN")
                .map_err(|_| anyhow::anyhow!("ADS_ACCESS_TOKEN environment variable required"))
                .and_then(|token| {
                    if token.trim().is_empty() {
                        anyhow::bail!("ADS_ACCESS_TOKEN cannot be empty");
                    }
                    Ok(token)
                })?,
            client_customer_id: std::env::var("ADS_CLIENT_CUSTOMER_ID").map_err(|_| {
                anyhow::anyhow!("ADS_CLIENT_CUSTOMER_ID environment variable required")
            })?,
            page_size: std::env::var("ADS_PAGE_SIZE")
                .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("ADS_PAGE_SIZE must be a positive number"))?,
            batch_size: std::env::var("ADS_BATCH_SIZE")
                .unwrap_or_else(|_| DEFAULT_BATCH_SIZE.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("ADS_BATCH_SIZE must be a positive number"))?,
            request_timeout_secs: std::env::var("ADS_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("ADS_REQUEST_TIMEOUT_SECS must be a number"))?,
            cache_ttl_secs: std::env::var("ADS_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("ADS_CACHE_TTL_SECS must be a number"))?,
            cache_capacity: std::env::var("ADS_CACHE_CAPACITY")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("ADS_CACHE_CAPACITY must be a number"))?,
        };

        config.validate()?;

        // Never log tokens
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Ads API base URL: {}", config.base_url);
        tracing::debug!("Ads API version: {}", config.api_version);
        tracing::debug!("Client customer ID: {}", config.client_customer_id);
        tracing::debug!(
            "Page size: {}, batch size: {}",
            config.page_size,
            config.batch_size
        );

        Ok(config)
    }

    /// Checks the settings that `from_env` cannot enforce through parsing alone.
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| anyhow::anyhow!("ADS_BASE_URL is not a valid URL: {}", e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!("ADS_BASE_URL must start with http:// or https://");
        }

        let customer_id_pattern = Regex::new(r"^\d{3}-\d{3}-\d{4}$")?;
        if !customer_id_pattern.is_match(self.client_customer_id.trim()) {
            anyhow::bail!("ADS_CLIENT_CUSTOMER_ID must look like 123-456-7890");
        }

        if self.page_size == 0 {
            anyhow::bail!("ADS_PAGE_SIZE must be greater than zero");
        }
        if self.batch_size == 0 {
            anyhow::bail!("ADS_BATCH_SIZE must be greater than zero");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("ADS_REQUEST_TIMEOUT_SECS must be greater than zero");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new("dev", "access", "123-456-7890");
        assert_eq!(config.page_size, 500);
        assert_eq!(config.batch_size, 2000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_malformed_customer_id() {
        let config = Config::new("dev", "access", "1234567890");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("123-456-7890"));
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut config = Config::new("dev", "access", "123-456-7890");
        config.base_url = "ftp://ads.example.com".to_string();
        assert!(config.validate().is_err());

        config.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_sizes() {
        let mut config = Config::new("dev", "access", "123-456-7890");
        config.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = Config::new("dev", "access", "123-456-7890");
        config.request_timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ADS_REQUEST_TIMEOUT_SECS"));
    }
}
