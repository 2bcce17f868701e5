//! Severity plumbing for traversal diagnostics.
//!
//! The deletion state machine emits its cascade notices at a caller-chosen
//! level so the same code path serves user-facing drops (NOTICE), silent
//! cleanup passes (DEBUG2), and distributed execution (DEBUG1).

/// Severity of a traversal diagnostic, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReportLevel {
    Debug2,
    Debug1,
    Notice,
}

/// Route a diagnostic to the tracing layer at the requested severity.
pub fn report(level: ReportLevel, message: &str) {
    match level {
        ReportLevel::Debug2 => tracing::trace!("{message}"),
        ReportLevel::Debug1 => tracing::debug!("{message}"),
        ReportLevel::Notice => tracing::info!("{message}"),
    }
}
