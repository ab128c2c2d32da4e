//! PostHog events client.

use crate::config::{DEFAULT_EVENT_LIMIT, PostHogConfig};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use upsell_core::{EventBatch, EventSource, Result, UpsellError};

#[derive(Debug, Deserialize)]
struct EventsPage {
    #[serde(default)]
    results: Vec<Value>,
}

pub struct PostHogClient {
    client: Client,
    config: PostHogConfig,
    limit: u32,
}

impl PostHogClient {
    pub fn new(config: PostHogConfig) -> Result<Self> {
        if !config.is_complete() {
            return Err(UpsellError::Config(
                "API key and project ID required for API access".to_string(),
            ));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| UpsellError::Remote(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config, limit: DEFAULT_EVENT_LIMIT })
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn config(&self) -> &PostHogConfig {
        &self.config
    }

    /// Fetch up to `limit` of the project's most recent events.
    pub async fn fetch_events(&self, limit: u32) -> Result<EventBatch> {
        let url = self.config.events_url();
        tracing::debug!(url = %url, limit, "fetching PostHog events");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(|e| UpsellError::Remote(format!("Error fetching events from API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "PostHog rejected events request");
            return Err(UpsellError::Remote(format!(
                "Failed to fetch events from PostHog: {}",
                body
            )));
        }

        let page: EventsPage = response
            .json()
            .await
            .map_err(|e| UpsellError::Remote(format!("Failed to parse PostHog response: {}", e)))?;

        tracing::info!(total_events = page.results.len(), "fetched PostHog events");
        Ok(EventBatch::from(page.results))
    }
}

#[async_trait]
impl EventSource for PostHogClient {
    fn describe(&self) -> String {
        format!("PostHog project {}", self.config.project_id)
    }

    async fn fetch(&self) -> Result<EventBatch> {
        self.fetch_events(self.limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_config_is_rejected() {
        let err = PostHogClient::new(PostHogConfig::new("", "42")).err().unwrap();
        assert!(matches!(err, UpsellError::Config(_)));
    }

    #[test]
    fn test_limit_defaults() {
        let client = PostHogClient::new(PostHogConfig::new("key", "42")).unwrap();
        assert_eq!(client.limit(), DEFAULT_EVENT_LIMIT);
        assert_eq!(client.with_limit(5).limit(), 5);
    }
}
