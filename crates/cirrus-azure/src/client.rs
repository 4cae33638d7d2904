//! ARM API client
//!
//! Thin bearer-token client for the Resource Manager API. Pagination
//! follows the `nextLink` continuation URL; the overall deadline for a
//! listing is carried by the client-level timeout, so an expired
//! deadline surfaces as a transport error.

use crate::environment::AzureEnvironment;
use crate::error::{ListError, Result};
use crate::subscriptions::{
    list_matching, ApiSubscription, SubscriptionFilter, SubscriptionRecord, SubscriptionSource,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::VecDeque;
use std::time::Duration;

const SUBSCRIPTIONS_API_VERSION: &str = "2020-01-01";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Configuration for the ARM client
#[derive(Debug, Clone)]
pub struct ArmConfig {
    pub access_token: String,
    pub tenant_id: String,
    pub environment: AzureEnvironment,
    pub timeout: Duration,
}

impl ArmConfig {
    /// Create ArmConfig from environment variables
    pub fn from_env() -> Result<Self> {
        let access_token = std::env::var("ARM_ACCESS_TOKEN")
            .map_err(|_| ListError::MissingEnvVar("ARM_ACCESS_TOKEN".to_string()))?;
        let tenant_id = std::env::var("ARM_TENANT_ID")
            .map_err(|_| ListError::MissingEnvVar("ARM_TENANT_ID".to_string()))?;
        let environment = match std::env::var("ARM_ENVIRONMENT") {
            Ok(value) => value
                .parse()
                .map_err(|e: String| ListError::InvalidConfig(e))?,
            Err(_) => AzureEnvironment::default(),
        };

        Ok(Self {
            access_token,
            tenant_id,
            environment,
            timeout: DEFAULT_TIMEOUT,
        })
    }
}

/// Resource Manager API client
pub struct ArmClient {
    http: reqwest::Client,
    config: ArmConfig,
}

impl ArmClient {
    pub fn new(config: ArmConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// The tenant this client is authenticated against
    pub fn tenant_id(&self) -> &str {
        &self.config.tenant_id
    }

    fn subscriptions_url(&self) -> String {
        format!(
            "{}/subscriptions?api-version={}",
            self.config.environment.resource_manager_endpoint(),
            SUBSCRIPTIONS_API_VERSION
        )
    }

    /// Start a paginated listing of all subscriptions visible to the token
    pub fn subscriptions(&self) -> SubscriptionPager<'_> {
        SubscriptionPager {
            client: self,
            buffer: VecDeque::new(),
            next_url: Some(self.subscriptions_url()),
        }
    }

    /// List subscriptions whose display name matches the filter
    pub async fn list_subscriptions(
        &self,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<SubscriptionRecord>> {
        let mut pager = self.subscriptions();
        list_matching(&mut pager, filter).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ListError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

/// Pull-based pager over the subscriptions listing.
///
/// Entities are served from the current page; fetching the next page
/// happens lazily when the buffer runs out. A fetch failure is
/// terminal per the [`SubscriptionSource`] contract.
pub struct SubscriptionPager<'a> {
    client: &'a ArmClient,
    buffer: VecDeque<ApiSubscription>,
    next_url: Option<String>,
}

#[async_trait]
impl SubscriptionSource for SubscriptionPager<'_> {
    async fn next(&mut self) -> Result<Option<ApiSubscription>> {
        loop {
            if let Some(entity) = self.buffer.pop_front() {
                return Ok(Some(entity));
            }
            let Some(url) = self.next_url.take() else {
                return Ok(None);
            };

            let page: ListResponse = self.client.get_json(&url).await?;
            tracing::debug!("Fetched page with {} subscriptions", page.value.len());
            self.buffer = page.value.into();
            self.next_url = page.next_link;
        }
    }
}

// ============ API Types ============

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    value: Vec<ApiSubscription>,
    #[serde(rename = "nextLink")]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[allow(dead_code)]
    code: String,
    message: String,
}
