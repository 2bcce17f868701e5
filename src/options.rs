//! Engine configuration supplied by the embedding environment.

use crate::report::ReportLevel;
use serde::{Deserialize, Serialize};

/// Knobs the embedding environment sets once per session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Set when this process executes a plan dispatched by another node.
    /// Cascade notices were already emitted where the drop was issued, so
    /// executors repeat them at DEBUG1 instead of NOTICE.
    pub distributed_execute: bool,
}

impl EngineOptions {
    /// The severity user-facing cascade notices are emitted at.
    pub fn notice_level(&self) -> ReportLevel {
        if self.distributed_execute {
            ReportLevel::Debug1
        } else {
            ReportLevel::Notice
        }
    }
}
