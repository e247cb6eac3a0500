pub mod appointment_jobs;
pub mod client;
pub mod job_assignments;

pub use client::{ApiClient, ApiError};
