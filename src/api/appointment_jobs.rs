//! Endpoints on the `/appointment-jobs` surface: fetching the job
//! record, advancing its status, and saving the job-level note.

use crate::models::job::AppointmentJob;
use crate::models::requests::{SaveJobNoteRequest, UpdateJobStatusRequest};

use super::client::{ApiClient, ApiError};

impl ApiClient {
    /// GET `/appointment-jobs/{assignmentId}`: the canonical job
    /// snapshot, re-fetched after every mutation.
    pub async fn fetch_job(&self, assignment_id: i64) -> Result<AppointmentJob, ApiError> {
        let path = format!("/appointment-jobs/{assignment_id}");
        let response = self.send(self.http_get(&path), &path).await?;
        response
            .json::<AppointmentJob>()
            .await
            .map_err(ApiError::Decode)
    }

    /// PATCH `/appointment-jobs/update-job-status/{assignmentId}`.
    pub async fn update_job_status(
        &self,
        assignment_id: i64,
        body: &UpdateJobStatusRequest,
    ) -> Result<(), ApiError> {
        let path = format!("/appointment-jobs/update-job-status/{assignment_id}");
        self.send(self.http_patch(&path, body), &path).await?;
        Ok(())
    }

    /// PATCH `/appointment-jobs/save-job-note/{assignmentId}`.
    /// Replaces the job's single note value.
    pub async fn save_job_note(
        &self,
        assignment_id: i64,
        body: &SaveJobNoteRequest,
    ) -> Result<(), ApiError> {
        let path = format!("/appointment-jobs/save-job-note/{assignment_id}");
        self.send(self.http_patch(&path, body), &path).await?;
        Ok(())
    }
}
