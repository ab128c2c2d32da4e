use crate::status::AnalysisState;

#[derive(Debug, thiserror::Error)]
pub enum UpsellError {
    #[error("Malformed input: {0}")]
    MalformedInput(#[source] serde_json::Error),

    #[error(
        "Unsupported format: expected an array of events or an object with a 'results'/'events' key"
    )]
    UnsupportedFormat,

    #[error("Events file not found: {0}")]
    NotFound(String),

    #[error("No events file specified")]
    NoEventsSource,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: AnalysisState, to: AnalysisState },

    #[error("Analyst error: {0}")]
    Analyst(String),

    #[error("Remote source error: {0}")]
    Remote(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, UpsellError>;
