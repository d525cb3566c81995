use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::batch::{MutateService, Operation};
use crate::config::Config;
use crate::entity::{CacheSettings, EntityKind, EntityService};
use crate::errors::AdsError;
use crate::paging::{ListingService, Page};
use crate::reports::{ReportDefinition, ReportDownloader};
use crate::selector::Selector;

/// HTTP client for the ads management API.
///
/// Cheap to clone; every clone shares the same connection pool.
#[derive(Clone)]
pub struct AdsClient {
    client: reqwest::Client,
    base_url: String,
    api_version: String,
    developer_token: String,
    access_token: String,
    client_customer_id: String,
    cache: CacheSettings,
}

impl AdsClient {
    /// Creates a new `AdsClient` from validated settings.
    pub fn new(config: &Config) -> Result<Self, AdsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                AdsError::Configuration(format!("Failed to create ads API client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            developer_token: config.developer_token.clone(),
            access_token: config.access_token.clone(),
            client_customer_id: config.client_customer_id.clone(),
            cache: CacheSettings {
                ttl: Duration::from_secs(config.cache_ttl_secs),
                capacity: config.cache_capacity,
            },
        })
    }

    /// Typed handle on the remote service that owns entity kind `K`.
    pub fn service<K: EntityKind>(&self) -> ServiceClient<K::Record> {
        ServiceClient {
            client: self.clone(),
            service: K::SERVICE,
            _record: PhantomData,
        }
    }

    /// Entity operations for kind `K`, with listing cache settings from config.
    pub fn entities<K: EntityKind>(&self) -> EntityService<K, ServiceClient<K::Record>> {
        EntityService::new(self.service::<K>(), self.cache)
    }

    fn service_url(&self, service: &str, operation: &str) -> String {
        format!(
            "{}/api/adwords/cm/{}/{}/{}",
            self.base_url, self.api_version, service, operation
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("developer-token", &self.developer_token)
            .header("client-customer-id", &self.client_customer_id)
    }

    /// POSTs `body` to `{service}/{operation}` and decodes the JSON response.
    async fn call<B, T>(&self, service: &str, operation: &str, body: &B) -> Result<T, AdsError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.service_url(service, operation);
        tracing::debug!("Calling {}.{}: {}", service, operation, url);

        let response = self
            .authorized(self.client.post(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| AdsError::remote(service, operation, format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("{}.{} returned {}: {}", service, operation, status, error_text);
            return Err(AdsError::remote(
                service,
                operation,
                format!("returned {}: {}", status, error_text),
            ));
        }

        response.json().await.map_err(|e| {
            AdsError::remote(
                service,
                operation,
                format!("failed to parse response: {}", e),
            )
        })
    }
}

#[async_trait]
impl ReportDownloader for AdsClient {
    async fn download(&self, definition: &ReportDefinition) -> Result<String, AdsError> {
        let url = format!(
            "{}/api/adwords/reportdownload/{}",
            self.base_url, self.api_version
        );
        tracing::info!("Downloading {} from {}", definition.report_type.as_str(), url);

        let response = self
            .authorized(self.client.post(&url))
            .header("skipReportHeader", "true")
            .header("skipReportSummary", "true")
            .json(&json!({ "reportDefinition": definition }))
            .send()
            .await
            .map_err(|e| {
                AdsError::remote("ReportDownloader", "download", format!("request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AdsError::remote(
                "ReportDownloader",
                "download",
                format!("returned {}: {}", status, error_text),
            ));
        }

        let body = response.text().await.map_err(|e| {
            AdsError::remote(
                "ReportDownloader",
                "download",
                format!("failed to read report body: {}", e),
            )
        })?;

        tracing::info!("✓ Report downloaded ({} bytes)", body.len());
        Ok(body)
    }
}

/// One remote service (e.g. `CampaignService`) addressed through an [`AdsClient`].
pub struct ServiceClient<R> {
    client: AdsClient,
    service: &'static str,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for ServiceClient<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            service: self.service,
            _record: PhantomData,
        }
    }
}

impl<R> ServiceClient<R> {
    pub fn name(&self) -> &'static str {
        self.service
    }
}

#[derive(Serialize)]
struct GetRequest<'a> {
    selector: &'a Selector,
}

#[derive(Serialize)]
struct MutateRequest<'a, R> {
    operations: &'a [Operation<R>],
}

#[derive(Deserialize)]
struct MutateResponse<R> {
    #[serde(default = "Vec::new")]
    value: Vec<R>,
}

#[async_trait]
impl<R> ListingService<R> for ServiceClient<R>
where
    R: DeserializeOwned + Send + 'static,
{
    async fn get(&self, selector: &Selector) -> Result<Page<R>, AdsError> {
        let mut page: Page<R> = self
            .client
            .call(self.service, "get", &GetRequest { selector })
            .await?;
        page.start_index = selector.paging().map(|p| p.start_index).unwrap_or(0);
        Ok(page)
    }
}

#[async_trait]
impl<R> MutateService<R> for ServiceClient<R>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn mutate(&self, operations: &[Operation<R>]) -> Result<Vec<R>, AdsError> {
        tracing::info!("{}: mutating {} operations", self.service, operations.len());
        let response: MutateResponse<R> = self
            .client
            .call(self.service, "mutate", &MutateRequest { operations })
            .await?;

        // Results must pair up with the submitted operations by position.
        if response.value.len() != operations.len() {
            tracing::error!(
                "{}: {} operations submitted but {} results returned",
                self.service,
                operations.len(),
                response.value.len()
            );
            return Err(AdsError::remote(
                self.service,
                "mutate",
                format!(
                    "{} operations submitted but {} results returned",
                    operations.len(),
                    response.value.len()
                ),
            ));
        }
        Ok(response.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaigns::Campaigns;

    #[test]
    fn test_client_creation() {
        let config = Config::new("dev", "token", "123-456-7890");
        let client = AdsClient::new(&config);
        assert!(client.is_ok());
    }

    #[test]
    fn test_service_url() {
        let mut config = Config::new("dev", "token", "123-456-7890");
        config.base_url = "https://ads.example.com/".to_string();
        config.api_version = "v201809".to_string();
        let client = AdsClient::new(&config).unwrap();

        assert_eq!(
            client.service_url(client.service::<Campaigns>().name(), "get"),
            "https://ads.example.com/api/adwords/cm/v201809/CampaignService/get"
        );
    }
}
