//! PATCH request bodies for the six backend endpoints.

use bigdecimal::BigDecimal;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::job::JobStatus;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStartTimeRequest {
    pub status: JobStatus,
    pub start_time: NaiveTime,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEndTimeRequest {
    pub end_time: NaiveTime,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobStatusRequest {
    pub job_status: JobStatus,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCostsRequest {
    pub additional_cost: BigDecimal,
    pub cost_note: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveJobNoteRequest {
    pub job_note: String,
}
