//! Analysis job status.
//!
//! Every analysis run gets its own job id and walks through
//! `idle -> running -> completed | failed`. Stores keep one status per job,
//! so concurrent runs never overwrite each other.

use crate::{Result, UpsellError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tempfile::NamedTempFile;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisState {
    Idle,
    Running,
    Completed,
    Failed,
}

impl AnalysisState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn can_transition_to(&self, next: AnalysisState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for AnalysisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStatus {
    pub job_id: String,
    pub state: AnalysisState,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisStatus {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            state: AnalysisState::Idle,
            message: "Agent ready".to_string(),
            timestamp: Utc::now(),
        }
    }

    /// A fresh idle status under a random job id.
    pub fn new_job() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    pub fn transition(&mut self, to: AnalysisState, message: impl Into<String>) -> Result<()> {
        if !self.state.can_transition_to(to) {
            return Err(UpsellError::InvalidTransition { from: self.state, to });
        }
        self.state = to;
        self.message = message.into();
        self.timestamp = Utc::now();
        Ok(())
    }
}

#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn save(&self, status: &AnalysisStatus) -> Result<()>;
    async fn get(&self, job_id: &str) -> Result<Option<AnalysisStatus>>;
    /// The most recently saved job.
    async fn latest(&self) -> Result<Option<AnalysisStatus>>;
}

/// Finished jobs kept per store, besides the latest one.
pub const DEFAULT_RETAINED_JOBS: usize = 100;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StatusDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    latest: Option<String>,
    #[serde(default)]
    jobs: HashMap<String, AnalysisStatus>,
}

impl StatusDocument {
    fn insert(&mut self, status: &AnalysisStatus, retained: usize) {
        self.latest = Some(status.job_id.clone());
        self.jobs.insert(status.job_id.clone(), status.clone());
        self.prune(retained);
    }

    /// Drop the oldest finished jobs beyond `retained`. Jobs still in flight
    /// and the latest job are never dropped.
    fn prune(&mut self, retained: usize) {
        let mut finished: Vec<(DateTime<Utc>, String)> = self
            .jobs
            .values()
            .filter(|s| s.state.is_terminal() && self.latest.as_ref() != Some(&s.job_id))
            .map(|s| (s.timestamp, s.job_id.clone()))
            .collect();
        if finished.len() <= retained {
            return;
        }
        finished.sort();
        let excess = finished.len() - retained;
        for (_, job_id) in finished.into_iter().take(excess) {
            self.jobs.remove(&job_id);
        }
    }

    fn latest(&self) -> Option<AnalysisStatus> {
        self.latest.as_ref().and_then(|id| self.jobs.get(id)).cloned()
    }
}

pub struct InMemoryStatusStore {
    inner: RwLock<StatusDocument>,
    retained: usize,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        Self { inner: RwLock::new(StatusDocument::default()), retained: DEFAULT_RETAINED_JOBS }
    }

    pub fn with_retained_jobs(mut self, retained: usize) -> Self {
        self.retained = retained;
        self
    }
}

impl Default for InMemoryStatusStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatusStore for InMemoryStatusStore {
    async fn save(&self, status: &AnalysisStatus) -> Result<()> {
        let mut doc = self.inner.write().unwrap_or_else(|e| e.into_inner());
        doc.insert(status, self.retained);
        Ok(())
    }

    async fn get(&self, job_id: &str) -> Result<Option<AnalysisStatus>> {
        let doc = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(doc.jobs.get(job_id).cloned())
    }

    async fn latest(&self) -> Result<Option<AnalysisStatus>> {
        let doc = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(doc.latest())
    }
}

/// Status store backed by a single JSON file, shared by every process that
/// points at the same path.
///
/// Saves hold an exclusive lock on a sidecar `<file>.lock` for the whole
/// read-modify-write, and replace the document by renaming a temporary file
/// over it, so readers never see a partial write.
pub struct FileStatusStore {
    path: PathBuf,
    retained: usize,
}

impl FileStatusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), retained: DEFAULT_RETAINED_JOBS }
    }

    pub fn with_retained_jobs(mut self, retained: usize) -> Self {
        self.retained = retained;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    async fn read_document(&self) -> Result<StatusDocument> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_document(&path))
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?
    }
}

fn read_document(path: &Path) -> Result<StatusDocument> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StatusDocument::default()),
        Err(e) => Err(e.into()),
    }
}

fn write_document(path: &Path, doc: &StatusDocument) -> Result<()> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, doc)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn save_locked(
    path: &Path,
    lock_path: &Path,
    status: &AnalysisStatus,
    retained: usize,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    // Held until `lock` drops at the end of this function.
    let lock = OpenOptions::new().create(true).truncate(false).write(true).open(lock_path)?;
    lock.lock_exclusive()?;

    let mut doc = read_document(path)?;
    doc.insert(status, retained);
    write_document(path, &doc)
}

#[async_trait]
impl StatusStore for FileStatusStore {
    async fn save(&self, status: &AnalysisStatus) -> Result<()> {
        let path = self.path.clone();
        let lock_path = self.lock_path();
        let retained = self.retained;
        let saved = status.clone();
        tokio::task::spawn_blocking(move || save_locked(&path, &lock_path, &saved, retained))
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))??;

        tracing::debug!(
            job_id = %status.job_id,
            state = %status.state,
            path = %self.path.display(),
            "saved analysis status"
        );
        Ok(())
    }

    async fn get(&self, job_id: &str) -> Result<Option<AnalysisStatus>> {
        Ok(self.read_document().await?.jobs.remove(job_id))
    }

    async fn latest(&self) -> Result<Option<AnalysisStatus>> {
        Ok(self.read_document().await?.latest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_transitions() {
        let mut status = AnalysisStatus::new("job-1");
        assert_eq!(status.state, AnalysisState::Idle);
        status.transition(AnalysisState::Running, "Processing events...").unwrap();
        status.transition(AnalysisState::Completed, "done").unwrap();
        assert_eq!(status.state, AnalysisState::Completed);
        assert_eq!(status.message, "done");
        assert!(status.state.is_terminal());
    }

    #[test]
    fn test_rejected_transitions() {
        let mut status = AnalysisStatus::new("job-1");
        let err = status.transition(AnalysisState::Completed, "too early").unwrap_err();
        assert!(matches!(
            err,
            UpsellError::InvalidTransition { from: AnalysisState::Idle, to: AnalysisState::Completed }
        ));
        assert_eq!(status.message, "Agent ready");

        status.transition(AnalysisState::Running, "go").unwrap();
        status.transition(AnalysisState::Failed, "boom").unwrap();
        assert!(status.transition(AnalysisState::Running, "again").is_err());
    }

    #[test]
    fn test_state_serializes_lowercase() {
        let json = serde_json::to_value(AnalysisState::Running).unwrap();
        assert_eq!(json, serde_json::json!("running"));
    }

    #[tokio::test]
    async fn test_in_memory_store_tracks_latest() {
        let store = InMemoryStatusStore::new();
        assert!(store.latest().await.unwrap().is_none());

        let first = AnalysisStatus::new("a");
        let second = AnalysisStatus::new("b");
        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();

        assert_eq!(store.latest().await.unwrap().unwrap().job_id, "b");
        assert_eq!(store.get("a").await.unwrap(), Some(first));
        assert!(store.get("missing").await.unwrap().is_none());
    }

    fn finished(job_id: &str, state: AnalysisState) -> AnalysisStatus {
        let mut status = AnalysisStatus::new(job_id);
        status.transition(AnalysisState::Running, "Processing events...").unwrap();
        status.transition(state, "done").unwrap();
        status
    }

    #[tokio::test]
    async fn test_oldest_finished_jobs_are_pruned() {
        let store = InMemoryStatusStore::new().with_retained_jobs(2);

        let mut in_flight = AnalysisStatus::new("in-flight");
        in_flight.transition(AnalysisState::Running, "Processing events...").unwrap();
        store.save(&in_flight).await.unwrap();

        let states = [
            AnalysisState::Completed,
            AnalysisState::Failed,
            AnalysisState::Completed,
            AnalysisState::Completed,
        ];
        for (i, state) in states.into_iter().enumerate() {
            store.save(&finished(&format!("job-{i}"), state)).await.unwrap();
        }

        assert!(store.get("in-flight").await.unwrap().is_some());
        assert!(store.get("job-0").await.unwrap().is_none());
        assert!(store.get("job-1").await.unwrap().is_some());
        assert!(store.get("job-2").await.unwrap().is_some());
        assert_eq!(store.latest().await.unwrap().unwrap().job_id, "job-3");
    }
}
