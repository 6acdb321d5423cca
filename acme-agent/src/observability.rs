//! Logging setup and small helpers for log fields.

use std::time::Instant;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::errors::{AgentError, AgentResult};

const PREVIEW_CHARS: usize = 100;
const SHORT_ID_CHARS: usize = 8;

/// Installs the global `tracing` subscriber. `RUST_LOG`, when set, replaces
/// the configured level.
pub fn init_tracing(config: &LoggingConfig) -> AgentResult<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.filter_directive());

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| AgentError::Internal {
            component: "tracing".to_string(),
            reason: e.to_string(),
        })
}

/// First characters of a task id, enough to correlate log lines.
#[must_use]
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_CHARS) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Text truncated for logging, with `...` appended when cut.
#[must_use]
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

#[must_use]
pub fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
