//! In-process mock of the service-shop backend: the six endpoints the
//! client consumes, served over a real TCP socket on an ephemeral
//! port, with per-endpoint hit counters and a forced-failure switch.
//!
//! The mock resolves the acting employee from the bearer token the
//! same way the real backend does, so the client under test exercises
//! its full auth/header path.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bigdecimal::Zero;
use tokio::net::TcpListener;

use shopfloor::api::ApiClient;
use shopfloor::auth::{self, Claims};
use shopfloor::models::job::{
    AppointmentJob, Customer, EmployeeAssignment, JobStatus, ServiceItem, Vehicle,
};
use shopfloor::models::requests::{
    AddCostsRequest, LogEndTimeRequest, LogStartTimeRequest, SaveJobNoteRequest,
    UpdateJobStatusRequest,
};

#[derive(Default)]
pub struct Hits {
    pub fetch: AtomicUsize,
    pub start: AtomicUsize,
    pub end: AtomicUsize,
    pub status: AtomicUsize,
    pub costs: AtomicUsize,
    pub note: AtomicUsize,
}

pub struct BackendState {
    pub job: Mutex<AppointmentJob>,
    pub hits: Hits,
    fail_all: AtomicBool,
    start_responds_created: AtomicBool,
}

pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<BackendState>,
}

impl MockBackend {
    pub async fn spawn(job: AppointmentJob) -> Self {
        let state = Arc::new(BackendState {
            job: Mutex::new(job),
            hits: Hits::default(),
            fail_all: AtomicBool::new(false),
            start_responds_created: AtomicBool::new(false),
        });

        let router = Router::new()
            .route("/appointment-jobs/{id}", get(fetch_job))
            .route(
                "/appointment-jobs/update-job-status/{id}",
                patch(update_job_status),
            )
            .route("/appointment-jobs/save-job-note/{id}", patch(save_job_note))
            .route(
                "/job-assignments/log-start-time/{id}",
                patch(log_start_time),
            )
            .route("/job-assignments/log-end-time/{id}", patch(log_end_time))
            .route("/job-assignments/add-costs/{id}", patch(add_costs))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self, token: &str) -> ApiClient {
        ApiClient::new(&self.base_url(), token, Duration::from_secs(5)).unwrap()
    }

    pub fn job(&self) -> AppointmentJob {
        self.state.job.lock().unwrap().clone()
    }

    /// Make every endpoint answer 500 with the standard error envelope.
    pub fn fail_all(&self, on: bool) {
        self.state.fail_all.store(on, Ordering::SeqCst);
    }

    /// Make `log-start-time` answer 201 with an empty body, to probe
    /// the client's exact-200 success rule.
    pub fn respond_created_to_start(&self, on: bool) {
        self.state.start_responds_created.store(on, Ordering::SeqCst);
    }
}

/// A structurally valid JWT for the mock: real header and payload
/// segments, throwaway signature. The client never verifies signatures.
pub fn token_for(employee_id: i64, username: &str) -> String {
    let claims = Claims {
        sub: employee_id.to_string(),
        username: username.to_string(),
        role: "EMPLOYEE".to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

/// Fresh job: two assigned employees, no timers started, no costs.
pub fn sample_job(assignment_id: i64) -> AppointmentJob {
    AppointmentJob {
        assignment_id,
        job_status: JobStatus::New,
        service_item: ServiceItem {
            name: "Brake pad replacement".to_string(),
            estimated_duration: "2 hours".to_string(),
        },
        vehicle: Vehicle {
            brand: "Toyota".to_string(),
            model: "Corolla".to_string(),
            plate_number: "KV-2041".to_string(),
        },
        customer: Customer {
            first_name: "Maya".to_string(),
            last_name: "Perera".to_string(),
            contact_number: "0771234567".to_string(),
        },
        job_assignments: vec![
            EmployeeAssignment {
                employee_id: 7,
                employee_name: "Dana Cole".to_string(),
                start_time: None,
                end_time: None,
                additional_cost: None,
                cost_note: None,
            },
            EmployeeAssignment {
                employee_id: 8,
                employee_name: "Rui Mendes".to_string(),
                start_time: None,
                end_time: None,
                additional_cost: None,
                cost_note: None,
            },
        ],
        additional_cost: None,
        job_note: None,
    }
}

fn acting_employee(headers: &HeaderMap) -> Option<i64> {
    let header = headers.get("authorization")?.to_str().ok()?;
    auth::current_user_from_token(header)
        .ok()
        .map(|u| u.employee_id)
}

fn failure_envelope() -> Response {
    let body = serde_json::json!({
        "success": false,
        "status_code": 500,
        "message": "Simulated backend failure",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

async fn fetch_job(State(state): State<Arc<BackendState>>, Path(_id): Path<i64>) -> Response {
    state.hits.fetch.fetch_add(1, Ordering::SeqCst);
    if state.fail_all.load(Ordering::SeqCst) {
        return failure_envelope();
    }
    let job = state.job.lock().unwrap().clone();
    Json(job).into_response()
}

async fn log_start_time(
    State(state): State<Arc<BackendState>>,
    Path(_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<LogStartTimeRequest>,
) -> Response {
    state.hits.start.fetch_add(1, Ordering::SeqCst);
    if state.fail_all.load(Ordering::SeqCst) {
        return failure_envelope();
    }
    if state.start_responds_created.load(Ordering::SeqCst) {
        return StatusCode::CREATED.into_response();
    }
    let Some(employee_id) = acting_employee(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let mut job = state.job.lock().unwrap();
    if let Some(assignment) = job
        .job_assignments
        .iter_mut()
        .find(|a| a.employee_id == employee_id)
    {
        assignment.start_time = Some(body.start_time);
    }
    StatusCode::OK.into_response()
}

async fn log_end_time(
    State(state): State<Arc<BackendState>>,
    Path(_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<LogEndTimeRequest>,
) -> Response {
    state.hits.end.fetch_add(1, Ordering::SeqCst);
    if state.fail_all.load(Ordering::SeqCst) {
        return failure_envelope();
    }
    let Some(employee_id) = acting_employee(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let mut job = state.job.lock().unwrap();
    if let Some(assignment) = job
        .job_assignments
        .iter_mut()
        .find(|a| a.employee_id == employee_id)
    {
        assignment.end_time = Some(body.end_time);
    }
    StatusCode::OK.into_response()
}

async fn update_job_status(
    State(state): State<Arc<BackendState>>,
    Path(_id): Path<i64>,
    Json(body): Json<UpdateJobStatusRequest>,
) -> Response {
    state.hits.status.fetch_add(1, Ordering::SeqCst);
    if state.fail_all.load(Ordering::SeqCst) {
        return failure_envelope();
    }
    state.job.lock().unwrap().job_status = body.job_status;
    StatusCode::OK.into_response()
}

async fn add_costs(
    State(state): State<Arc<BackendState>>,
    Path(_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<AddCostsRequest>,
) -> Response {
    state.hits.costs.fetch_add(1, Ordering::SeqCst);
    if state.fail_all.load(Ordering::SeqCst) {
        return failure_envelope();
    }
    let Some(employee_id) = acting_employee(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let mut job = state.job.lock().unwrap();
    if let Some(assignment) = job
        .job_assignments
        .iter_mut()
        .find(|a| a.employee_id == employee_id)
    {
        assignment.additional_cost = Some(body.additional_cost);
        assignment.cost_note = Some(body.cost_note);
    }
    let total = job
        .job_assignments
        .iter()
        .filter_map(|a| a.additional_cost.clone())
        .fold(bigdecimal::BigDecimal::zero(), |acc, cost| acc + cost);
    job.additional_cost = Some(total);
    StatusCode::OK.into_response()
}

async fn save_job_note(
    State(state): State<Arc<BackendState>>,
    Path(_id): Path<i64>,
    Json(body): Json<SaveJobNoteRequest>,
) -> Response {
    state.hits.note.fetch_add(1, Ordering::SeqCst);
    if state.fail_all.load(Ordering::SeqCst) {
        return failure_envelope();
    }
    state.job.lock().unwrap().job_note = Some(body.job_note);
    StatusCode::OK.into_response()
}
