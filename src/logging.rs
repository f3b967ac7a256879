//! Severity levels and the structured log bridge.
//!
//! Severity is advisory routing metadata: it tells the owning service how loud
//! an error should be when it reaches a log sink, nothing more. The bridge
//! here consumes an error and emits one `tracing` event at the mapped level;
//! it never stores or mutates the error.

use serde_json::json;

use crate::ServiceError;

/// How loudly an error should be logged. Advisory only; carries no behavior
/// beyond the [`log`] mapping.
///
/// Ordered from least to most severe so thresholds compare naturally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Not set. Logged as an error: an unclassified failure should be loud,
    /// not silent.
    #[default]
    Unspecified,
    Debug,
    Info,
    Warn,
    Error,
}

impl Severity {
    /// Canonical lowercase name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Unspecified => "unspecified",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

/// Emit one structured event for `err` at its severity-mapped level.
///
/// The event carries the classification code, the message and the accumulated
/// runtime state (as a JSON object, insertion order preserved via array of
/// pairs when names repeat). [`Severity::Unspecified`] maps to the error
/// level.
pub fn log(err: &ServiceError) {
    let state = json!(err
        .runtime_state()
        .iter()
        .map(|var| json!({ "name": var.name, "value": var.value }))
        .collect::<Vec<_>>())
    .to_string();
    let code = err.code().name();
    let message = err.message();

    match err.severity() {
        Severity::Debug => tracing::debug!(code, state = %state, "{message}"),
        Severity::Info => tracing::info!(code, state = %state, "{message}"),
        Severity::Warn => tracing::warn!(code, state = %state, "{message}"),
        Severity::Error | Severity::Unspecified => {
            tracing::error!(code, state = %state, "{message}");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
