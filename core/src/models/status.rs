use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a server-side job.
///
/// The set is open: the server may introduce new states, which are kept
/// verbatim in `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkflowStatus {
    Running,
    Completed,
    Failed,
    Other(String),
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &str {
        match self {
            WorkflowStatus::Running => "running",
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::Failed => "failed",
            WorkflowStatus::Other(s) => s,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, WorkflowStatus::Completed)
    }

    /// Completed or failed; polling can stop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStatus::Completed | WorkflowStatus::Failed)
    }
}

impl From<String> for WorkflowStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "running" => WorkflowStatus::Running,
            "completed" => WorkflowStatus::Completed,
            "failed" => WorkflowStatus::Failed,
            _ => WorkflowStatus::Other(value),
        }
    }
}

impl From<&str> for WorkflowStatus {
    fn from(value: &str) -> Self {
        WorkflowStatus::from(value.to_string())
    }
}

impl From<WorkflowStatus> for String {
    fn from(status: WorkflowStatus) -> Self {
        match status {
            WorkflowStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
