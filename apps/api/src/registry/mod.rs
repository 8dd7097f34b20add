/// Registry client for 기업마당 (bizinfo) support-program announcements.
///
/// A refresh pulls each configured category and assembles them into one
/// `SourceDocument` keyed by category name, the shape the matcher reads.
use std::time::Duration;

use reqwest::Client;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::matching::models::{SourceDocument, RECORDS_KEY};
use crate::models::category::Category;

pub mod handlers;
pub mod snapshot;

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("registry returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response for {0} has no 'jsonArray' array")]
    MissingRecords(Category),

    #[error("no category could be fetched")]
    NothingFetched,
}

#[derive(Clone)]
pub struct BizInfoClient {
    client: Client,
    base_url: String,
    api_key: String,
    search_cnt: u32,
    use_hashtags: bool,
}

impl BizInfoClient {
    pub fn new(config: &Config) -> Result<Self, RegistryError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url: config.bizinfo_base_url.clone(),
            api_key: config.bizinfo_api_key.clone(),
            search_cnt: config.registry_search_cnt,
            use_hashtags: config.registry_hashtags,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Category filter and count. Hashtags only when `REGISTRY_HASHTAGS` is on,
    /// since the registry treats them as an extra narrowing filter.
    fn query_params(&self, category: Category) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("crtfcKey", self.api_key.clone()),
            ("dataType", "json".to_string()),
            ("searchLclasId", category.code().to_string()),
            ("searchCnt", self.search_cnt.to_string()),
        ];
        if self.use_hashtags {
            params.push(("hashtags", category.hashtags().join(",")));
        }
        params
    }

    /// Fetches one category's announcements. The response object is returned
    /// as-is once it is known to carry a records array.
    /// Retries on transport errors, 429 and 5xx with exponential backoff.
    pub async fn fetch_category(&self, category: Category) -> Result<Value, RegistryError> {
        let params = self.query_params(category);
        let mut last_error: Option<RegistryError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Registry fetch for {} failed (attempt {}), retrying after {}ms",
                    category,
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.get(&self.base_url).query(&params).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(RegistryError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                last_error = Some(RegistryError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(RegistryError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let body = response.text().await?;
            let value: Value = serde_json::from_str(&body)?;
            if !value.get(RECORDS_KEY).is_some_and(Value::is_array) {
                return Err(RegistryError::MissingRecords(category));
            }
            return Ok(value);
        }

        Err(last_error.unwrap_or(RegistryError::Api {
            status: 0,
            message: "retries exhausted".to_string(),
        }))
    }

    /// Fetches every category in order. A category that fails is logged and
    /// left out; the refresh only fails when nothing was fetched.
    pub async fn fetch_all(&self, categories: &[Category]) -> Result<SourceDocument, RegistryError> {
        let mut document = Map::new();
        for &category in categories {
            info!("Fetching {} announcements from registry", category);
            match self.fetch_category(category).await {
                Ok(value) => {
                    document.insert(category.name().to_string(), value);
                }
                Err(e) => error!("Registry fetch for {} failed: {}", category, e),
            }
        }

        if document.is_empty() && !categories.is_empty() {
            return Err(RegistryError::NothingFetched);
        }
        Ok(SourceDocument(document))
    }
}
