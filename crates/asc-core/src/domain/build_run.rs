//! Build run status as observed while waiting for a remote build.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a build run is in its lifecycle.
///
/// Only `COMPLETE` is terminal. Values the service adds later decode as
/// [`ExecutionProgress::Unknown`] and are treated as still in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionProgress {
    /// Queued, not yet started.
    Pending,
    /// Actively building.
    Running,
    /// Finished, successfully or not.
    Complete,
    /// Any value this client does not know about.
    #[serde(other)]
    Unknown,
}

impl ExecutionProgress {
    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Complete => "COMPLETE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ExecutionProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a completed build run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionStatus {
    Succeeded,
    Failed,
    Errored,
    Canceled,
    Skipped,
    /// Any value this client does not know about.
    #[serde(other)]
    Unknown,
}

impl CompletionStatus {
    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Errored => "ERRORED",
            Self::Canceled => "CANCELED",
            Self::Skipped => "SKIPPED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a build run, produced by one status fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRunStatus {
    /// Build run resource ID.
    pub id: String,
    /// Lifecycle position.
    pub execution_progress: ExecutionProgress,
    /// Set once the run completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_status: Option<CompletionStatus>,
}

impl BuildRunStatus {
    /// Create a status snapshot.
    pub fn new(
        id: impl Into<String>,
        execution_progress: ExecutionProgress,
        completion_status: Option<CompletionStatus>,
    ) -> Self {
        Self {
            id: id.into(),
            execution_progress,
            completion_status,
        }
    }

    /// Terminal predicate: the run has finished, whatever the outcome.
    pub fn is_complete(&self) -> bool {
        self.execution_progress == ExecutionProgress::Complete
    }

    /// The run finished and succeeded.
    pub fn is_successful(&self) -> bool {
        self.is_complete() && self.completion_status == Some(CompletionStatus::Succeeded)
    }
}

impl fmt::Display for BuildRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.completion_status {
            Some(outcome) => write!(f, "{} ({outcome})", self.execution_progress),
            None => write!(f, "{}", self.execution_progress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_complete_is_terminal() {
        assert!(!BuildRunStatus::new("1", ExecutionProgress::Pending, None).is_complete());
        assert!(!BuildRunStatus::new("1", ExecutionProgress::Running, None).is_complete());
        assert!(!BuildRunStatus::new("1", ExecutionProgress::Unknown, None).is_complete());
        assert!(BuildRunStatus::new("1", ExecutionProgress::Complete, None).is_complete());
    }

    #[test]
    fn test_failed_build_is_terminal_but_not_successful() {
        let status = BuildRunStatus::new(
            "run-1",
            ExecutionProgress::Complete,
            Some(CompletionStatus::Failed),
        );
        assert!(status.is_complete());
        assert!(!status.is_successful());
    }

    #[test]
    fn test_succeeded_is_successful() {
        let status = BuildRunStatus::new(
            "run-1",
            ExecutionProgress::Complete,
            Some(CompletionStatus::Succeeded),
        );
        assert!(status.is_successful());
    }

    #[test]
    fn test_unknown_wire_values_decode() {
        let progress: ExecutionProgress = serde_json::from_str("\"ARCHIVED\"").unwrap();
        assert_eq!(progress, ExecutionProgress::Unknown);

        let outcome: CompletionStatus = serde_json::from_str("\"SUPERSEDED\"").unwrap();
        assert_eq!(outcome, CompletionStatus::Unknown);
    }

    #[test]
    fn test_display() {
        let running = BuildRunStatus::new("1", ExecutionProgress::Running, None);
        assert_eq!(running.to_string(), "RUNNING");

        let failed = BuildRunStatus::new(
            "1",
            ExecutionProgress::Complete,
            Some(CompletionStatus::Errored),
        );
        assert_eq!(failed.to_string(), "COMPLETE (ERRORED)");
    }
}
