use std::fmt;

use thiserror::Error;

use crate::api::client::ApiError;

/// The operations this client can attempt against a job, used to phrase
/// the operation-specific failure message when the backend rejects one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    StartWork,
    FinishWork,
    CompleteJob,
    AddCost,
    SaveNote,
    Refresh,
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phrase = match self {
            JobAction::StartWork => "start work",
            JobAction::FinishWork => "finish work",
            JobAction::CompleteJob => "complete the job",
            JobAction::AddCost => "add the additional cost",
            JobAction::SaveNote => "save the job note",
            JobAction::Refresh => "refresh the job",
        };
        f.write_str(phrase)
    }
}

/// Failure taxonomy for tracker operations.
///
/// The precondition variants are detected client-side against the cached
/// job snapshot and never cause a network call; each carries its exact
/// user-facing message. `Backend` wraps a transport or non-200 failure
/// after a request was actually sent.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("This job has already been completed.")]
    JobCompleted,

    #[error("You are not assigned to this job.")]
    NotAssigned,

    #[error("You have already finished your work session on this job.")]
    SessionFinished,

    #[error("You have not started your work session yet.")]
    SessionNotStarted,

    #[error("An additional cost was already recorded for your assignment.")]
    CostAlreadyRecorded,

    #[error("The additional cost cannot be negative.")]
    NegativeCost,

    #[error("A note is required when recording an additional cost.")]
    MissingCostNote,

    #[error("The note text cannot be empty.")]
    EmptyNote,

    #[error("Failed to {action}. Please try again.")]
    Backend {
        action: JobAction,
        #[source]
        source: ApiError,
    },
}

impl TrackerError {
    pub fn backend(action: JobAction, source: ApiError) -> Self {
        TrackerError::Backend { action, source }
    }

    /// Whether the failure was caught before any request was issued.
    pub fn is_precondition(&self) -> bool {
        !matches!(self, TrackerError::Backend { .. })
    }
}
