//! # upsell-core
//!
//! Event loading, opportunity extraction and analysis bookkeeping for the
//! upsell toolkit.
//!
//! ## Overview
//!
//! - [`load_events`] / [`parse_events`] - Normalize event files into an [`EventBatch`]
//! - [`extract_opportunities`] - Recover [`OpportunityRecord`]s from an analyst report
//! - [`Analyst`] / [`EventSource`] - Seams for the external agent and event providers
//! - [`AnalysisRunner`] - Runs one analysis job and records its [`AnalysisStatus`]
//! - [`UpsellError`] / [`Result`] - Unified error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use upsell_core::extract_opportunities;
//!
//! let report = "User ID: u1\nOpportunity type: upgrade\n";
//! let tasks = extract_opportunities(report);
//! assert_eq!(tasks[0].user_id.as_deref(), Some("u1"));
//! ```

pub mod analyst;
pub mod error;
pub mod event;
pub mod opportunity;
pub mod runner;
pub mod source;
pub mod status;
pub mod upload;

pub use analyst::{AnalysisInput, Analyst, TranscriptAnalyst};
pub use error::{Result, UpsellError};
pub use event::{EventBatch, EventRecord, load_events, parse_events};
pub use opportunity::{OpportunityRecord, extract_opportunities};
pub use runner::{
    AnalysisReport, AnalysisRequest, AnalysisRunner, DEFAULT_SAMPLE_EVENTS_FILE,
    DEFAULT_TASKS_FILE, write_tasks_file,
};
pub use source::{EventSource, FileEventSource};
pub use status::{
    AnalysisState, AnalysisStatus, DEFAULT_RETAINED_JOBS, FileStatusStore, InMemoryStatusStore,
    StatusStore,
};
pub use upload::{UploadReceipt, import_events_file};
