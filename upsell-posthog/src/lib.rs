//! # upsell-posthog
//!
//! Reads recent events from the PostHog events API so they can be analysed
//! like a local event file.
//!
//! ```rust,ignore
//! use upsell_posthog::{PostHogClient, PostHogConfig};
//! use upsell_core::EventSource;
//!
//! let client = PostHogClient::new(PostHogConfig::new(api_key, "12345"))?.with_limit(500);
//! let events = client.fetch().await?;
//! ```

pub mod client;
pub mod config;

pub use client::PostHogClient;
pub use config::{DEFAULT_EVENT_LIMIT, POSTHOG_API_BASE, PostHogConfig};
