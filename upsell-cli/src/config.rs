use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use upsell_core::{DEFAULT_SAMPLE_EVENTS_FILE, DEFAULT_TASKS_FILE};
use upsell_posthog::PostHogConfig;

pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_STATUS_FILE: &str = ".upsell/status.json";

/// Settings read from `config.json`; every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub posthog_api_key: Option<String>,
    /// PostHog shows project ids as numbers; both forms are accepted.
    #[serde(deserialize_with = "string_or_number")]
    pub posthog_project_id: Option<String>,
    pub posthog_base_url: Option<String>,
    pub events_file: Option<PathBuf>,
    pub sample_events_file: PathBuf,
    pub upload_dir: PathBuf,
    pub tasks_file: PathBuf,
    pub status_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            posthog_api_key: None,
            posthog_project_id: None,
            posthog_base_url: None,
            events_file: None,
            sample_events_file: PathBuf::from(DEFAULT_SAMPLE_EVENTS_FILE),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            tasks_file: PathBuf::from(DEFAULT_TASKS_FILE),
            status_file: PathBuf::from(DEFAULT_STATUS_FILE),
        }
    }
}

impl AppConfig {
    /// Read the config file. A missing file falls back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text)
                .with_context(|| format!("Invalid JSON in config file '{}'", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %path.display(),
                    "config file not found, PostHog API access disabled unless set via environment"
                );
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read '{}'", path.display())),
        }
    }

    /// Override PostHog settings from `POSTHOG_API_KEY`, `POSTHOG_PROJECT_ID`
    /// and `POSTHOG_BASE_URL`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = non_empty("POSTHOG_API_KEY") {
            self.posthog_api_key = Some(key);
        }
        if let Some(project) = non_empty("POSTHOG_PROJECT_ID") {
            self.posthog_project_id = Some(project);
        }
        if let Some(base) = non_empty("POSTHOG_BASE_URL") {
            self.posthog_base_url = Some(base);
        }
        self
    }

    pub fn posthog(&self) -> PostHogConfig {
        let config = PostHogConfig::new(
            self.posthog_api_key.clone().unwrap_or_default(),
            self.posthog_project_id.clone().unwrap_or_default(),
        );
        match &self.posthog_base_url {
            Some(base) => config.with_base_url(base),
            None => config,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(Option::<Id>::deserialize(deserializer)?.map(|id| match id {
        Id::Text(text) => text,
        Id::Number(n) => n.to_string(),
    }))
}
