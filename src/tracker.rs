//! `JobProgressTracker`: one appointment job's snapshot and the five
//! mutating operations the backend exposes for it.
//!
//! Every operation checks its preconditions against the cached snapshot
//! first and refuses with a distinct message before any request is
//! sent. On the success path exactly one PATCH goes out, followed by a
//! full re-fetch of the job record, so the displayed state is always
//! server-authoritative. Failures raise a transient banner and leave
//! the snapshot untouched.

use std::time::Duration;

use bigdecimal::{BigDecimal, Zero};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::CurrentUser;
use crate::error::{JobAction, TrackerError};
use crate::models::job::{AppointmentJob, EmployeeAssignment, JobStatus, SessionState};
use crate::models::requests::{
    AddCostsRequest, LogEndTimeRequest, LogStartTimeRequest, SaveJobNoteRequest,
    UpdateJobStatusRequest,
};
use crate::utils::timefmt;

/// How long a failure banner stays visible before it auto-clears.
pub const BANNER_TTL: Duration = Duration::from_secs(3);

/// Transient failure message shown below the screen. Never retried
/// automatically; expires on its own after [`BANNER_TTL`].
#[derive(Debug)]
pub struct Banner {
    message: String,
    raised_at: Instant,
}

impl Banner {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            raised_at: Instant::now(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_expired(&self) -> bool {
        self.raised_at.elapsed() >= BANNER_TTL
    }
}

/// Which of the mutating controls the UI currently offers.
///
/// Gating is stricter than the operations' own precondition lists in
/// one place: `start` is only offered while the session has not been
/// started at all, even though `start_work` itself only refuses once
/// the session is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionSet {
    pub start: bool,
    pub finish: bool,
    pub complete: bool,
    pub add_cost: bool,
    pub add_note: bool,
}

impl ActionSet {
    /// Evaluate the offered controls for one caller against a job
    /// snapshot. Everything is off once the job is completed or when
    /// the caller has no assignment on it.
    pub fn evaluate(job: &AppointmentJob, user: &CurrentUser) -> Self {
        if job.is_completed() {
            return Self::default();
        }
        let Some(assignment) = job.assignment_for(user.employee_id) else {
            return Self::default();
        };

        Self {
            start: assignment.session_state() == SessionState::NotStarted,
            finish: assignment.session_state() == SessionState::InProgress,
            complete: true,
            add_cost: !assignment.has_cost(),
            add_note: true,
        }
    }

    pub fn any(&self) -> bool {
        self.start || self.finish || self.complete || self.add_cost || self.add_note
    }
}

#[derive(Debug)]
pub struct JobProgressTracker {
    client: ApiClient,
    user: CurrentUser,
    job: AppointmentJob,
    banner: Option<Banner>,
}

impl JobProgressTracker {
    /// Fetch the initial snapshot. A failure here is surfaced as the
    /// raw [`ApiError`] so the shell can render a full-page error state
    /// instead of a screen with no data behind it.
    pub async fn load(
        client: ApiClient,
        user: CurrentUser,
        assignment_id: i64,
    ) -> Result<Self, ApiError> {
        let job = client.fetch_job(assignment_id).await?;
        info!(
            assignment_id,
            employee_id = user.employee_id,
            status = job.job_status.badge_label(),
            "loaded job snapshot"
        );
        Ok(Self {
            client,
            user,
            job,
            banner: None,
        })
    }

    pub fn job(&self) -> &AppointmentJob {
        &self.job
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    /// The acting employee's assignment on this job, if any.
    pub fn own_assignment(&self) -> Option<&EmployeeAssignment> {
        self.job.assignment_for(self.user.employee_id)
    }

    pub fn actions(&self) -> ActionSet {
        ActionSet::evaluate(&self.job, &self.user)
    }

    /// Current failure banner, if one is still within its TTL.
    pub fn banner(&self) -> Option<&str> {
        self.banner
            .as_ref()
            .filter(|b| !b.is_expired())
            .map(Banner::message)
    }

    /// Drop an expired banner so the screen line frees up.
    pub fn clear_expired_banner(&mut self) {
        if self.banner.as_ref().is_some_and(Banner::is_expired) {
            self.banner = None;
        }
    }

    /// Re-fetch the job snapshot (periodic refresh or manual reload).
    pub async fn refresh(&mut self) -> Result<(), TrackerError> {
        self.resync().await
    }

    /// Record the current wall-clock time as the caller's session
    /// start. The job's own status is not changed by this; only the
    /// explicit `complete_job` call moves it.
    pub async fn start_work(&mut self) -> Result<(), TrackerError> {
        if let Err(e) = self.check_start() {
            return self.fail(e);
        }
        let body = LogStartTimeRequest {
            status: JobStatus::Ongoing,
            start_time: timefmt::wall_clock_now(),
        };
        let sent = self.client.log_start_time(self.job.assignment_id, &body).await;
        if let Err(e) = sent {
            return self.fail(TrackerError::backend(JobAction::StartWork, e));
        }
        info!(assignment_id = self.job.assignment_id, "work session started");
        self.resync().await
    }

    /// Record the current wall-clock time as the caller's session end.
    pub async fn finish_work(&mut self) -> Result<(), TrackerError> {
        if let Err(e) = self.check_finish() {
            return self.fail(e);
        }
        let body = LogEndTimeRequest {
            end_time: timefmt::wall_clock_now(),
        };
        let sent = self.client.log_end_time(self.job.assignment_id, &body).await;
        if let Err(e) = sent {
            return self.fail(TrackerError::backend(JobAction::FinishWork, e));
        }
        info!(assignment_id = self.job.assignment_id, "work session finished");
        self.resync().await
    }

    /// Advance the job to `COMPLETED`. Deliberately unconditional on
    /// open work sessions; the only precondition is that the job is not
    /// already completed.
    pub async fn complete_job(&mut self) -> Result<(), TrackerError> {
        if self.job.is_completed() {
            return self.fail(TrackerError::JobCompleted);
        }
        let body = UpdateJobStatusRequest {
            job_status: JobStatus::Completed,
        };
        let sent = self
            .client
            .update_job_status(self.job.assignment_id, &body)
            .await;
        if let Err(e) = sent {
            return self.fail(TrackerError::backend(JobAction::CompleteJob, e));
        }
        info!(assignment_id = self.job.assignment_id, "job completed");
        self.resync().await
    }

    /// Record the caller's one-time additional cost with its
    /// justification note.
    pub async fn add_cost(&mut self, amount: BigDecimal, note: &str) -> Result<(), TrackerError> {
        if let Err(e) = self.check_add_cost(&amount, note) {
            return self.fail(e);
        }
        let body = AddCostsRequest {
            additional_cost: amount,
            cost_note: note.trim().to_string(),
        };
        let sent = self.client.add_costs(self.job.assignment_id, &body).await;
        if let Err(e) = sent {
            return self.fail(TrackerError::backend(JobAction::AddCost, e));
        }
        info!(assignment_id = self.job.assignment_id, "additional cost recorded");
        self.resync().await
    }

    /// Save the job-level note, replacing any previous value.
    pub async fn add_note(&mut self, text: &str) -> Result<(), TrackerError> {
        if let Err(e) = self.check_add_note(text) {
            return self.fail(e);
        }
        let body = SaveJobNoteRequest {
            job_note: text.trim().to_string(),
        };
        let sent = self
            .client
            .save_job_note(self.job.assignment_id, &body)
            .await;
        if let Err(e) = sent {
            return self.fail(TrackerError::backend(JobAction::SaveNote, e));
        }
        info!(assignment_id = self.job.assignment_id, "job note saved");
        self.resync().await
    }

    fn check_start(&self) -> Result<(), TrackerError> {
        if self.job.is_completed() {
            return Err(TrackerError::JobCompleted);
        }
        let assignment = self.own_assignment().ok_or(TrackerError::NotAssigned)?;
        if assignment.end_time.is_some() {
            return Err(TrackerError::SessionFinished);
        }
        Ok(())
    }

    fn check_finish(&self) -> Result<(), TrackerError> {
        if self.job.is_completed() {
            return Err(TrackerError::JobCompleted);
        }
        let assignment = self.own_assignment().ok_or(TrackerError::NotAssigned)?;
        match assignment.session_state() {
            SessionState::NotStarted => Err(TrackerError::SessionNotStarted),
            SessionState::Finished => Err(TrackerError::SessionFinished),
            SessionState::InProgress => Ok(()),
        }
    }

    fn check_add_cost(&self, amount: &BigDecimal, note: &str) -> Result<(), TrackerError> {
        if self.job.is_completed() {
            return Err(TrackerError::JobCompleted);
        }
        let assignment = self.own_assignment().ok_or(TrackerError::NotAssigned)?;
        if assignment.has_cost() {
            return Err(TrackerError::CostAlreadyRecorded);
        }
        if *amount < BigDecimal::zero() {
            return Err(TrackerError::NegativeCost);
        }
        if note.trim().is_empty() {
            return Err(TrackerError::MissingCostNote);
        }
        Ok(())
    }

    fn check_add_note(&self, text: &str) -> Result<(), TrackerError> {
        if self.job.is_completed() {
            return Err(TrackerError::JobCompleted);
        }
        if text.trim().is_empty() {
            return Err(TrackerError::EmptyNote);
        }
        Ok(())
    }

    /// Replace the snapshot with the backend's current record. Called
    /// after every successful mutation and by the periodic refresh.
    async fn resync(&mut self) -> Result<(), TrackerError> {
        let fetched = self.client.fetch_job(self.job.assignment_id).await;
        match fetched {
            Ok(job) => {
                self.job = job;
                Ok(())
            }
            Err(e) => self.fail(TrackerError::backend(JobAction::Refresh, e)),
        }
    }

    fn fail(&mut self, error: TrackerError) -> Result<(), TrackerError> {
        warn!(
            assignment_id = self.job.assignment_id,
            precondition = error.is_precondition(),
            %error,
            "operation refused"
        );
        self.banner = Some(Banner::new(error.to_string()));
        Err(error)
    }
}
