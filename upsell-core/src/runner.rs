use crate::analyst::{AnalysisInput, Analyst};
use crate::opportunity::{OpportunityRecord, extract_opportunities};
use crate::source::{EventSource, FileEventSource};
use crate::status::{AnalysisState, AnalysisStatus, StatusStore};
use crate::{Result, UpsellError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

pub const DEFAULT_SAMPLE_EVENTS_FILE: &str = "sample_events.json";
pub const DEFAULT_TASKS_FILE: &str = "tasks.txt";

/// Which event file an analysis should run against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub events_file_path: Option<PathBuf>,
    #[serde(default)]
    pub use_sample_data: bool,
}

impl AnalysisRequest {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self { events_file_path: Some(path.into()), use_sample_data: false }
    }

    pub fn sample() -> Self {
        Self { events_file_path: None, use_sample_data: true }
    }

    /// Sample data wins over an explicit path.
    pub fn resolve(&self, sample_events: &Path) -> Result<PathBuf> {
        if self.use_sample_data {
            Ok(sample_events.to_path_buf())
        } else {
            self.events_file_path.clone().ok_or(UpsellError::NoEventsSource)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub job_id: String,
    pub success: bool,
    pub message: String,
    pub tasks: Vec<OpportunityRecord>,
    pub analysis_time: String,
    pub total_events: usize,
}

pub struct AnalysisRunner {
    analyst: Arc<dyn Analyst>,
    status: Arc<dyn StatusStore>,
    sample_events: PathBuf,
    tasks_file: Option<PathBuf>,
}

impl AnalysisRunner {
    pub fn new(analyst: Arc<dyn Analyst>, status: Arc<dyn StatusStore>) -> Self {
        Self {
            analyst,
            status,
            sample_events: PathBuf::from(DEFAULT_SAMPLE_EVENTS_FILE),
            tasks_file: None,
        }
    }

    pub fn with_sample_events(mut self, path: impl Into<PathBuf>) -> Self {
        self.sample_events = path.into();
        self
    }

    /// Copy the analyst's raw report to `path` after each completed run.
    pub fn with_tasks_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.tasks_file = Some(path.into());
        self
    }

    pub fn status_store(&self) -> &Arc<dyn StatusStore> {
        &self.status
    }

    /// Run one analysis against the file `request` resolves to. A request
    /// naming no file still gets a job, recorded as failed.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisReport> {
        let file_source;
        let source: Result<&dyn EventSource> = match request.resolve(&self.sample_events) {
            Ok(path) => {
                file_source = FileEventSource::new(path);
                Ok(&file_source as &dyn EventSource)
            }
            Err(e) => Err(e),
        };
        self.start(source).await
    }

    /// Run one analysis job end to end, recording its status as it goes.
    pub async fn run_source(&self, source: &dyn EventSource) -> Result<AnalysisReport> {
        self.start(Ok(source)).await
    }

    async fn start(&self, source: Result<&dyn EventSource>) -> Result<AnalysisReport> {
        let mut status = AnalysisStatus::new_job();
        let span = tracing::info_span!(
            "analysis.run",
            job.id = %status.job_id,
            analyst = self.analyst.name(),
        );

        self.run_job(&mut status, source).instrument(span).await
    }

    async fn run_job(
        &self,
        status: &mut AnalysisStatus,
        source: Result<&dyn EventSource>,
    ) -> Result<AnalysisReport> {
        status.transition(AnalysisState::Running, "Processing events...")?;
        self.status.save(status).await?;

        let (report, text) = match self.analyze(&status.job_id, source).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.record_failure(status, &e).await;
                return Err(e);
            }
        };

        let mut completed = status.clone();
        completed.transition(
            AnalysisState::Completed,
            format!("Analysis completed. Found {} opportunities.", report.tasks.len()),
        )?;
        if let Err(e) = self.status.save(&completed).await {
            self.record_failure(status, &e).await;
            return Err(e);
        }
        *status = completed;

        tracing::info!(
            total_events = report.total_events,
            opportunities = report.tasks.len(),
            analysis_time = %report.analysis_time,
            "analysis completed"
        );

        if let Some(path) = &self.tasks_file {
            if let Err(e) = write_tasks_file(path, &text).await {
                tracing::warn!(path = %path.display(), error = %e, "failed to write tasks file");
            }
        }
        Ok(report)
    }

    async fn record_failure(&self, status: &mut AnalysisStatus, error: &UpsellError) {
        tracing::error!(error = %error, "analysis failed");
        if status.state.is_terminal() {
            return;
        }
        let message = format!("Analysis failed: {}", error);
        if let Err(e) = status.transition(AnalysisState::Failed, message) {
            tracing::warn!(error = %e, "cannot mark analysis as failed");
            return;
        }
        if let Err(save_err) = self.status.save(status).await {
            tracing::warn!(error = %save_err, "failed to record analysis failure");
        }
    }

    async fn analyze(
        &self,
        job_id: &str,
        source: Result<&dyn EventSource>,
    ) -> Result<(AnalysisReport, String)> {
        let source = source?;
        let description = source.describe();
        let events = source
            .fetch()
            .instrument(tracing::info_span!("events.fetch", source = %description))
            .await?;
        let total_events = events.len();
        tracing::info!(source = %description, total_events, "events loaded");

        let input = AnalysisInput { source: description, events };
        let started = Instant::now();
        let text = self.analyst.analyze(&input).await?;
        let elapsed = started.elapsed();

        let tasks = extract_opportunities(&text);
        let report = AnalysisReport {
            job_id: job_id.to_string(),
            success: true,
            message: format!(
                "Analysis completed successfully. Found {} upsell opportunities.",
                tasks.len()
            ),
            tasks,
            analysis_time: format!("{:.2}s", elapsed.as_secs_f64()),
            total_events,
        };
        Ok((report, text))
    }
}

/// Keep a copy of the analyst's raw report next to the extracted records.
pub async fn write_tasks_file(path: impl AsRef<Path>, report: &str) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, report).await?;
    tracing::info!(path = %path.display(), "tasks written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_resolution() {
        let sample = Path::new("sample.json");
        assert_eq!(AnalysisRequest::sample().resolve(sample).unwrap(), sample);
        assert_eq!(
            AnalysisRequest::file("mine.json").resolve(sample).unwrap(),
            PathBuf::from("mine.json")
        );

        let both = AnalysisRequest { events_file_path: Some("mine.json".into()), use_sample_data: true };
        assert_eq!(both.resolve(sample).unwrap(), sample);

        let neither = AnalysisRequest::default();
        assert!(matches!(neither.resolve(sample), Err(UpsellError::NoEventsSource)));
    }

    #[tokio::test]
    async fn test_write_tasks_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.txt");
        write_tasks_file(&path, "User ID: u1").await.unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "User ID: u1");
    }
}
