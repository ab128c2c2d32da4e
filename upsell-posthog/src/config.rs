//! Configuration types for the PostHog events API.

use serde::{Deserialize, Serialize};

/// Default PostHog cloud host.
pub const POSTHOG_API_BASE: &str = "https://app.posthog.com";

/// Events requested per fetch unless overridden.
pub const DEFAULT_EVENT_LIMIT: u32 = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostHogConfig {
    /// Personal API key, sent as a bearer token.
    pub api_key: String,
    pub project_id: String,
    /// Self-hosted or regional host; defaults to [`POSTHOG_API_BASE`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl PostHogConfig {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), project_id: project_id.into(), base_url: None }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn is_complete(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.project_id.trim().is_empty()
    }

    /// `{base}/api/projects/{project_id}/events/`
    pub fn events_url(&self) -> String {
        let base = self.base_url.as_deref().unwrap_or(POSTHOG_API_BASE);
        format!("{}/api/projects/{}/events/", base.trim_end_matches('/'), self.project_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_url() {
        let config = PostHogConfig::new("key", "42");
        assert_eq!(config.events_url(), "https://app.posthog.com/api/projects/42/events/");

        let config = config.with_base_url("https://eu.posthog.com/");
        assert_eq!(config.events_url(), "https://eu.posthog.com/api/projects/42/events/");
    }

    #[test]
    fn test_is_complete() {
        assert!(PostHogConfig::new("key", "42").is_complete());
        assert!(!PostHogConfig::new("", "42").is_complete());
        assert!(!PostHogConfig::new("key", " ").is_complete());
    }
}
