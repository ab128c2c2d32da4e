use crate::event::{EventBatch, load_events};
use crate::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Somewhere events can be read from: a local file or a remote analytics API.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Human-readable description used in logs and analyst input.
    fn describe(&self) -> String;
    async fn fetch(&self) -> Result<EventBatch>;
}

#[derive(Debug, Clone)]
pub struct FileEventSource {
    path: PathBuf,
}

impl FileEventSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EventSource for FileEventSource {
    fn describe(&self) -> String {
        format!("file '{}'", self.path.display())
    }

    async fn fetch(&self) -> Result<EventBatch> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || load_events(path))
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?
    }
}
