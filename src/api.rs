//! REST API handlers for Shift Scheduling.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::SchedulerConfig;
use crate::demo_data::{self, DemoData};
use crate::diagnosis;
use crate::dto::{
    DiagnosisDto, ErrorResponse, HealthResponse, InfoResponse, OutcomeDto, WorkbookDto,
};
use crate::error::DataFormatError;
use crate::input;
use crate::solver::{self, ExactGate};

/// Application state shared across handlers.
///
/// Every request builds and solves its own model. Requests share the
/// configuration and the gate bounding concurrent exact phases.
pub struct AppState {
    pub config: SchedulerConfig,
    pub gate: ExactGate,
}

impl AppState {
    pub fn new(config: SchedulerConfig) -> Self {
        let gate = ExactGate::new(config.max_exact_solves);
        Self { config, gate }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Uploaded tables could not be interpreted.
    DataFormat(DataFormatError),
    NotFound(String),
    Internal(String),
}

impl From<DataFormatError> for AppError {
    fn from(err: DataFormatError) -> Self {
        AppError::DataFormat(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::DataFormat(e) => (
                StatusCode::BAD_REQUEST,
                "DATA_FORMAT_ERROR",
                e.to_string(),
                None,
            ),
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{} not found", what),
                None,
            ),
            AppError::Internal(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Solver run failed".to_string(),
                Some(details),
            ),
        };

        let body = ErrorResponse {
            code,
            message,
            details,
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Router and Handlers
// ============================================================================

/// Creates the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health & Info
        .route("/health", get(health))
        .route("/info", get(info))
        // Demo data
        .route("/demo-data", get(list_demo_data))
        .route("/demo-data/{id}", get(get_demo_data))
        // Schedules
        .route("/schedules", post(create_schedule))
        .route("/schedules/diagnose", put(diagnose_schedule))
        .with_state(state)
}

/// GET /health - Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "UP" })
}

/// GET /info - Application info endpoint.
async fn info() -> Json<InfoResponse> {
    Json(InfoResponse {
        name: "Shift Scheduling",
        version: env!("CARGO_PKG_VERSION"),
        solver_engine: "good_lp/microlp",
    })
}

/// GET /demo-data - List available demo data sets.
async fn list_demo_data() -> Json<Vec<&'static str>> {
    Json(demo_data::list_demo_data())
}

/// GET /demo-data/{id} - Get a specific demo workbook.
async fn get_demo_data(Path(id): Path<String>) -> Result<Json<WorkbookDto>, AppError> {
    let demo = id
        .parse::<DemoData>()
        .map_err(|_| AppError::NotFound(format!("demo data '{}'", id)))?;
    let workbook = demo_data::generate(demo);
    Ok(Json(WorkbookDto::from(&workbook)))
}

/// POST /schedules - Solve a workbook and return the schedule or diagnosis.
///
/// The solve blocks, so it runs on the blocking pool.
async fn create_schedule(
    State(state): State<Arc<AppState>>,
    Json(dto): Json<WorkbookDto>,
) -> Result<Json<OutcomeDto>, AppError> {
    let workbook = dto.to_domain();
    let outcome = tokio::task::spawn_blocking(move || {
        solver::run_pipeline(&workbook, &state.config, &state.gate)
    })
    .await
    .map_err(|e| {
        error!(error = %e, "Solver task failed");
        AppError::Internal(e.to_string())
    })??;

    info!(status = outcome.status().as_str(), "Schedule request done");
    Ok(Json(OutcomeDto::from(&outcome)))
}

/// PUT /schedules/diagnose - Eligibility report without solving.
async fn diagnose_schedule(
    State(state): State<Arc<AppState>>,
    Json(dto): Json<WorkbookDto>,
) -> Result<Json<DiagnosisDto>, AppError> {
    let plan = input::build_plan(&dto.to_domain(), state.config.marker())?;
    let diagnosis = diagnosis::diagnose(&plan);
    Ok(Json(DiagnosisDto::from(&diagnosis)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(AppState::default()))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn workbook(amy_on_8th: &str) -> Value {
        json!({
            "task_schedule": {
                "columns": ["date", "Fair", "Market"],
                "rows": [["2025-08-07", "Setup", "Guide"], ["2025-08-08", "Setup", null]]
            },
            "personal_schedule": {
                "columns": ["date", "Amy", "Ben"],
                "rows": [["2025-08-07", null, null], ["2025-08-08", amy_on_8th, "x"]]
            },
            "staff": {
                "columns": ["name", "Setup", "Guide"],
                "rows": [["Amy", null, null], ["Ben", null, "x"]]
            }
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "UP"}));
    }

    #[tokio::test]
    async fn test_demo_data() {
        let (status, body) = send(get_request("/demo-data")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(["SMALL", "LARGE"]));

        let (status, body) = send(get_request("/demo-data/SMALL")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["task_schedule"]["columns"][0], "date");

        let (status, body) = send(get_request("/demo-data/HUGE")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_create_schedule() {
        let request = json_request(Method::POST, "/schedules", workbook(""));
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "SCHEDULED");
        assert_eq!(body["solverStatus"], "OPTIMAL");
        assert_eq!(body["spread"], 1);
        assert_eq!(body["taskTable"]["columns"][0]["label"], "sample2025/08/07");
        // Only Amy can guide.
        assert_eq!(body["taskTable"]["rows"][0]["cells"][1], "Guide+Amy");
    }

    #[tokio::test]
    async fn test_create_schedule_infeasible() {
        // Amy is off on the 8th and Ben too, so nobody covers Fair@8.
        let request = json_request(Method::POST, "/schedules", workbook("x"));
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "DIAGNOSED");
        assert_eq!(body["solverStatus"], "INFEASIBLE");
        assert_eq!(body["diagnosis"]["unassignable"][0]["task"], "Fair");
        assert_eq!(body["diagnosis"]["unassignable"][0]["date"], "2025-08-08");
    }

    #[tokio::test]
    async fn test_malformed_workbook() {
        let mut body = workbook("");
        body["task_schedule"]["rows"][1][0] = json!("someday");
        let (status, body) = send(json_request(Method::POST, "/schedules", body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "DATA_FORMAT_ERROR");
        assert!(body["message"].as_str().unwrap().contains("task_schedule"));
    }

    #[tokio::test]
    async fn test_diagnose() {
        let request = json_request(Method::PUT, "/schedules/diagnose", workbook(""));
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["allClear"], true);
        assert_eq!(body["unassignable"], json!([]));
    }
}
