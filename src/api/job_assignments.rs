//! Endpoints on the `/job-assignments` surface: the acting employee's
//! work-session timer and their one-time additional cost.
//!
//! The backend resolves which assignment row to touch from the bearer
//! token, so every path is keyed by the job's assignment id only.

use crate::models::requests::{AddCostsRequest, LogEndTimeRequest, LogStartTimeRequest};

use super::client::{ApiClient, ApiError};

impl ApiClient {
    /// PATCH `/job-assignments/log-start-time/{assignmentId}`.
    pub async fn log_start_time(
        &self,
        assignment_id: i64,
        body: &LogStartTimeRequest,
    ) -> Result<(), ApiError> {
        let path = format!("/job-assignments/log-start-time/{assignment_id}");
        self.send(self.http_patch(&path, body), &path).await?;
        Ok(())
    }

    /// PATCH `/job-assignments/log-end-time/{assignmentId}`.
    pub async fn log_end_time(
        &self,
        assignment_id: i64,
        body: &LogEndTimeRequest,
    ) -> Result<(), ApiError> {
        let path = format!("/job-assignments/log-end-time/{assignment_id}");
        self.send(self.http_patch(&path, body), &path).await?;
        Ok(())
    }

    /// PATCH `/job-assignments/add-costs/{assignmentId}`. Write-once
    /// per assignment; the backend enforces it and the client never
    /// offers the input again once a cost is recorded.
    pub async fn add_costs(
        &self,
        assignment_id: i64,
        body: &AddCostsRequest,
    ) -> Result<(), ApiError> {
        let path = format!("/job-assignments/add-costs/{assignment_id}");
        self.send(self.http_patch(&path, body), &path).await?;
        Ok(())
    }
}
