//! Terminal client for the appointment job-details screen of a
//! service-shop management backend.
//!
//! The crate is built around [`tracker::JobProgressTracker`]: one
//! appointment job's snapshot plus the five mutating operations the
//! backend exposes for it (start/finish a work session, complete the
//! job, record an additional cost, save the job note). Every mutation
//! re-fetches the full job record afterwards, so the displayed state is
//! always server-authoritative.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod refresh;
pub mod tracker;
pub mod ui;
pub mod utils;
