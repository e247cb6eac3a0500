use bigdecimal::BigDecimal;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::utils::timefmt;

/// Job-level status as the backend reports it.
///
/// Unrecognized wire values are carried through unchanged in `Other` so
/// a status this client does not know about still renders verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    New,
    Ongoing,
    Completed,
    Other(String),
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "NEW" => JobStatus::New,
            "ONGOING" => JobStatus::Ongoing,
            "COMPLETED" => JobStatus::Completed,
            _ => JobStatus::Other(value),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::New => "NEW".to_string(),
            JobStatus::Ongoing => "ONGOING".to_string(),
            JobStatus::Completed => "COMPLETED".to_string(),
            JobStatus::Other(value) => value,
        }
    }
}

impl JobStatus {
    /// Human-readable badge label for the status chip.
    pub fn badge_label(&self) -> &str {
        match self {
            JobStatus::New => "New",
            JobStatus::Ongoing => "In Progress",
            JobStatus::Completed => "Completed",
            JobStatus::Other(value) => value,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }
}

/// Catalog entry the job was booked against. Read-only reference data;
/// the estimated duration is displayed verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItem {
    pub name: String,
    pub estimated_duration: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub brand: String,
    pub model: String,
    pub plate_number: String,
}

impl Vehicle {
    pub fn label(&self) -> String {
        format!("{} {} ({})", self.brand, self.model, self.plate_number)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub contact_number: String,
}

impl Customer {
    pub fn label(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One employee's participation in a job: their individual work-session
/// timer plus any additional cost they logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeAssignment {
    pub employee_id: i64,
    pub employee_name: String,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub additional_cost: Option<BigDecimal>,
    pub cost_note: Option<String>,
}

/// Work-session sub-state, derived from the two optional times. Never a
/// wire field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Finished,
}

impl EmployeeAssignment {
    pub fn session_state(&self) -> SessionState {
        match (self.start_time, self.end_time) {
            (None, _) => SessionState::NotStarted,
            (Some(_), None) => SessionState::InProgress,
            (Some(_), Some(_)) => SessionState::Finished,
        }
    }

    /// `"Xh Ym"` for a finished session; `None` while the session is
    /// open or when the recorded times are not a valid same-day range.
    pub fn elapsed_label(&self) -> Option<String> {
        let start = self.start_time?;
        let end = self.end_time?;
        timefmt::elapsed_label(start, end)
    }

    pub fn has_cost(&self) -> bool {
        self.additional_cost.is_some()
    }
}

/// One unit of billable work within a service appointment, as fetched
/// from `/appointment-jobs/{assignmentId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentJob {
    pub assignment_id: i64,
    pub job_status: JobStatus,
    pub service_item: ServiceItem,
    pub vehicle: Vehicle,
    pub customer: Customer,
    pub job_assignments: Vec<EmployeeAssignment>,
    pub additional_cost: Option<BigDecimal>,
    pub job_note: Option<String>,
}

impl AppointmentJob {
    /// Look up one employee's assignment on this job. `None` means the
    /// employee is not assigned and no mutating operation applies.
    pub fn assignment_for(&self, employee_id: i64) -> Option<&EmployeeAssignment> {
        self.job_assignments
            .iter()
            .find(|a| a.employee_id == employee_id)
    }

    pub fn is_completed(&self) -> bool {
        self.job_status.is_completed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn at(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn assignment(start: Option<NaiveTime>, end: Option<NaiveTime>) -> EmployeeAssignment {
        EmployeeAssignment {
            employee_id: 7,
            employee_name: "Dana Cole".to_string(),
            start_time: start,
            end_time: end,
            additional_cost: None,
            cost_note: None,
        }
    }

    #[test]
    fn badge_labels_map_known_statuses() {
        assert_eq!(JobStatus::New.badge_label(), "New");
        assert_eq!(JobStatus::Ongoing.badge_label(), "In Progress");
        assert_eq!(JobStatus::Completed.badge_label(), "Completed");
    }

    #[test]
    fn unrecognized_status_passes_through_unchanged() {
        let status = JobStatus::from("PAUSED".to_string());
        assert_eq!(status, JobStatus::Other("PAUSED".to_string()));
        assert_eq!(status.badge_label(), "PAUSED");
        assert_eq!(String::from(status), "PAUSED");
    }

    #[test]
    fn status_round_trips_through_wire_strings() {
        for wire in ["NEW", "ONGOING", "COMPLETED"] {
            let status = JobStatus::from(wire.to_string());
            assert_eq!(String::from(status), wire);
        }
    }

    #[test]
    fn session_state_follows_the_two_timestamps() {
        assert_eq!(
            assignment(None, None).session_state(),
            SessionState::NotStarted
        );
        assert_eq!(
            assignment(Some(at(9, 0, 0)), None).session_state(),
            SessionState::InProgress
        );
        assert_eq!(
            assignment(Some(at(9, 0, 0)), Some(at(11, 30, 0))).session_state(),
            SessionState::Finished
        );
    }

    #[test]
    fn elapsed_label_for_a_finished_session() {
        let done = assignment(Some(at(9, 0, 0)), Some(at(11, 30, 0)));
        assert_eq!(done.elapsed_label(), Some("2h 30m".to_string()));

        let open = assignment(Some(at(9, 0, 0)), None);
        assert_eq!(open.elapsed_label(), None);
    }

    #[test]
    fn job_record_deserializes_from_camel_case_wire_json() {
        let raw = serde_json::json!({
            "assignmentId": 31,
            "jobStatus": "ONGOING",
            "serviceItem": {"name": "Brake pad replacement", "estimatedDuration": "2 hours"},
            "vehicle": {"brand": "Toyota", "model": "Corolla", "plateNumber": "KV-2041"},
            "customer": {"firstName": "Maya", "lastName": "Perera", "contactNumber": "0771234567"},
            "jobAssignments": [{
                "employeeId": 7,
                "employeeName": "Dana Cole",
                "startTime": "09:00:00",
                "endTime": null,
                "additionalCost": "1500.50",
                "costNote": "Replacement clips"
            }],
            "additionalCost": "1500.50",
            "jobNote": null
        });

        let job: AppointmentJob = serde_json::from_value(raw).unwrap();
        assert_eq!(job.assignment_id, 31);
        assert_eq!(job.job_status, JobStatus::Ongoing);
        assert_eq!(job.job_assignments.len(), 1);

        let assignment = &job.job_assignments[0];
        assert_eq!(assignment.start_time, Some(at(9, 0, 0)));
        assert_eq!(assignment.end_time, None);
        assert_eq!(
            assignment.additional_cost,
            Some(BigDecimal::from_str("1500.50").unwrap())
        );
        assert!(job.job_note.is_none());
    }

    #[test]
    fn assignment_lookup_matches_on_employee_id() {
        let job = AppointmentJob {
            assignment_id: 31,
            job_status: JobStatus::New,
            service_item: ServiceItem {
                name: "Full service".to_string(),
                estimated_duration: "3 hours".to_string(),
            },
            vehicle: Vehicle {
                brand: "Honda".to_string(),
                model: "Civic".to_string(),
                plate_number: "CAB-7710".to_string(),
            },
            customer: Customer {
                first_name: "Ruwan".to_string(),
                last_name: "Silva".to_string(),
                contact_number: "0719876543".to_string(),
            },
            job_assignments: vec![assignment(None, None)],
            additional_cost: None,
            job_note: None,
        };

        assert!(job.assignment_for(7).is_some());
        assert!(job.assignment_for(99).is_none());
    }
}
