//! Span helpers for common toolkit operations

use tracing::Span;

/// Create a span for fetching events from a source
///
/// # Example
/// ```
/// use upsell_telemetry::fetch_span;
/// let span = fetch_span("posthog project 42");
/// let _enter = span.enter();
/// ```
pub fn fetch_span(source: &str) -> Span {
    tracing::info_span!("events.fetch", source = source)
}

/// Create a span for a CLI command
pub fn command_span(command: &str) -> Span {
    tracing::info_span!("command", command = command)
}
