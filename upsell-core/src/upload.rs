//! Importing user-supplied event files into the upload directory.

use crate::{Result, UpsellError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub success: bool,
    pub message: String,
    pub file_path: PathBuf,
    pub total_events: usize,
}

/// Validate `bytes` as an event array and store them as `upload_dir/file_name`.
///
/// Uploads are stricter than [`load_events`](crate::load_events): only a bare
/// JSON array is accepted. Nothing is written unless validation passes.
pub async fn import_events_file(
    upload_dir: impl AsRef<Path>,
    file_name: &str,
    bytes: &[u8],
) -> Result<UploadReceipt> {
    let file_name = Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| name.ends_with(".json"))
        .ok_or_else(|| UpsellError::InvalidUpload("Only JSON files are allowed".to_string()))?;

    let document: Value = serde_json::from_slice(bytes).map_err(UpsellError::MalformedInput)?;
    let total_events = match &document {
        Value::Array(items) => items.len(),
        _ => {
            return Err(UpsellError::InvalidUpload(
                "JSON file must contain an array of events".to_string(),
            ));
        }
    };

    let upload_dir = upload_dir.as_ref();
    tokio::fs::create_dir_all(upload_dir).await?;
    let file_path = upload_dir.join(file_name);
    tokio::fs::write(&file_path, bytes).await?;

    tracing::info!(path = %file_path.display(), total_events, "imported events file");

    Ok(UploadReceipt {
        success: true,
        message: format!("File uploaded successfully. Found {} events.", total_events),
        file_path,
        total_events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_import_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let receipt = import_events_file(dir.path(), "week1.json", b"[{}, {}]").await.unwrap();

        assert!(receipt.success);
        assert_eq!(receipt.total_events, 2);
        assert_eq!(receipt.file_path, dir.path().join("week1.json"));
        assert_eq!(receipt.message, "File uploaded successfully. Found 2 events.");
        assert_eq!(std::fs::read(&receipt.file_path).unwrap(), b"[{}, {}]");
    }

    #[tokio::test]
    async fn test_import_strips_directories_from_name() {
        let dir = tempfile::tempdir().unwrap();
        let receipt = import_events_file(dir.path(), "../../escape.json", b"[]").await.unwrap();
        assert_eq!(receipt.file_path, dir.path().join("escape.json"));
    }

    #[tokio::test]
    async fn test_import_rejects_non_json_name() {
        let dir = tempfile::tempdir().unwrap();
        let err = import_events_file(dir.path(), "events.csv", b"[]").await.unwrap_err();
        assert!(matches!(err, UpsellError::InvalidUpload(ref m) if m == "Only JSON files are allowed"));
    }

    #[tokio::test]
    async fn test_import_rejects_invalid_content_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().join("uploads");

        let err = import_events_file(&upload_dir, "bad.json", b"{not json").await.unwrap_err();
        assert!(matches!(err, UpsellError::MalformedInput(_)));

        let err = import_events_file(&upload_dir, "obj.json", br#"{"events": []}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, UpsellError::InvalidUpload(_)));

        assert!(!upload_dir.exists());
    }
}
