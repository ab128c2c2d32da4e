use crate::event::EventBatch;
use crate::{Result, UpsellError};
use async_trait::async_trait;
use std::path::PathBuf;

/// What the analyst gets to look at.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    /// Where the events came from, e.g. `file 'events.json'`.
    pub source: String,
    pub events: EventBatch,
}

/// The external, LLM-backed collaborator that narrates upsell opportunities.
///
/// Implementations return free text; structure is recovered afterwards by
/// [`extract_opportunities`](crate::extract_opportunities).
#[async_trait]
pub trait Analyst: Send + Sync {
    fn name(&self) -> &str;
    async fn analyze(&self, input: &AnalysisInput) -> Result<String>;
}

/// Replays a report the agent produced in an earlier, separate run.
pub struct TranscriptAnalyst {
    path: PathBuf,
}

impl TranscriptAnalyst {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Analyst for TranscriptAnalyst {
    fn name(&self) -> &str {
        "transcript"
    }

    async fn analyze(&self, input: &AnalysisInput) -> Result<String> {
        tracing::debug!(
            transcript = %self.path.display(),
            source = %input.source,
            total_events = input.events.len(),
            "replaying analyst transcript"
        );
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            UpsellError::Analyst(format!(
                "failed to read transcript '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}
