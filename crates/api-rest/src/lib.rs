//! # API REST
//!
//! REST adapter over the guardia admission workflow.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON bodies, status mapping, CORS)
//!
//! Every handler is a thin translation: DTO in, core service call, DTO out. Staff identity
//! arrives in the request body already authenticated by whatever fronts this service.

#![warn(rust_2018_idioms)]

use api_shared::{
    optional_doctor, AdmissionRes, AttentionReq, AttentionRes, ClaimReq, ClinicianDto,
    DemographicsDto, ErrorRes, HealthRes, HealthService, ListAdmissionsRes, PatientRes,
    RegisterUrgencyReq, VitalsDto,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use guardia_core::services::arrival_clock_for;
use guardia_core::{
    AdmissionService, AttentionService, CoreConfig, CoreError, CoreResult, ErrorKind, Stores,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST handlers.
#[derive(Clone)]
pub struct AppState {
    admissions: AdmissionService,
    attention: AttentionService,
}

impl AppState {
    /// Wires both services over `stores`, resuming the arrival clock from what is stored.
    pub fn new(cfg: Arc<CoreConfig>, stores: &Stores) -> CoreResult<Self> {
        let clock = Arc::new(arrival_clock_for(stores.queue.as_ref())?);
        Ok(Self {
            admissions: AdmissionService::new(cfg, stores, clock),
            attention: AttentionService::new(stores),
        })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        register_urgency,
        list_admissions,
        list_pending,
        claim_next,
        cancel_attention,
        register_attention,
        get_patient,
    ),
    components(schemas(
        HealthRes,
        ErrorRes,
        ClinicianDto,
        VitalsDto,
        DemographicsDto,
        RegisterUrgencyReq,
        ClaimReq,
        AttentionReq,
        AttentionRes,
        AdmissionRes,
        ListAdmissionsRes,
        PatientRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/admissions", get(list_admissions).post(register_urgency))
        .route("/admissions/pending", get(list_pending))
        .route("/admissions/claim", post(claim_next))
        .route("/admissions/:patient_id/cancel", post(cancel_attention))
        .route("/admissions/:patient_id/attention", post(register_attention))
        .route("/patients/:national_id", get(get_patient))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// A `CoreError` rendered as a JSON error body with a matching status.
#[derive(Debug)]
pub struct ApiError(CoreError);

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::Validation | ErrorKind::NullArgument => StatusCode::BAD_REQUEST,
            ErrorKind::InvalidOperation => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("internal error: {:?}", self.0);
            "Internal error".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(ErrorRes { error })).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/admissions",
    request_body = RegisterUrgencyReq,
    responses(
        (status = 201, description = "Urgency registered", body = AdmissionRes),
        (status = 400, description = "Missing note, negative vital or bad identifier", body = ErrorRes)
    )
)]
/// Register a new urgency and enqueue the patient.
async fn register_urgency(
    State(state): State<AppState>,
    Json(req): Json<RegisterUrgencyReq>,
) -> ApiResult<(StatusCode, Json<AdmissionRes>)> {
    let record = state.admissions.register_urgency(req.into_request()?)?;
    Ok((StatusCode::CREATED, Json(AdmissionRes::from(&record))))
}

#[utoipa::path(
    get,
    path = "/admissions",
    responses(
        (status = 200, description = "Every admission regardless of state", body = ListAdmissionsRes)
    )
)]
async fn list_admissions(State(state): State<AppState>) -> ApiResult<Json<ListAdmissionsRes>> {
    let records = state.admissions.get_all_admissions()?;
    Ok(Json(ListAdmissionsRes::from_records(&records)))
}

#[utoipa::path(
    get,
    path = "/admissions/pending",
    responses(
        (status = 200, description = "Waiting admissions in triage priority order", body = ListAdmissionsRes)
    )
)]
async fn list_pending(State(state): State<AppState>) -> ApiResult<Json<ListAdmissionsRes>> {
    let records = state.admissions.get_pending_admissions()?;
    Ok(Json(ListAdmissionsRes::from_records(&records)))
}

#[utoipa::path(
    post,
    path = "/admissions/claim",
    request_body = ClaimReq,
    responses(
        (status = 200, description = "Highest-priority admission, now in progress", body = AdmissionRes),
        (status = 400, description = "Physician missing", body = ErrorRes),
        (status = 409, description = "No patients waiting", body = ErrorRes)
    )
)]
/// Claim the highest-priority waiting patient.
async fn claim_next(
    State(state): State<AppState>,
    Json(req): Json<ClaimReq>,
) -> ApiResult<Json<AdmissionRes>> {
    let physician = optional_doctor(req.physician)?;
    let record = state.admissions.claim_next_patient(physician.as_ref())?;
    Ok(Json(AdmissionRes::from(&record)))
}

#[utoipa::path(
    post,
    path = "/admissions/{patient_id}/cancel",
    params(("patient_id" = String, Path, description = "Patient national id")),
    responses(
        (status = 204, description = "Admission returned to the queue"),
        (status = 409, description = "No in-progress admission for the patient", body = ErrorRes)
    )
)]
async fn cancel_attention(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.admissions.cancel_attention(&patient_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/admissions/{patient_id}/attention",
    params(("patient_id" = String, Path, description = "Patient national id")),
    request_body = AttentionReq,
    responses(
        (status = 200, description = "Admission finalised", body = AttentionRes),
        (status = 400, description = "Physician or note missing", body = ErrorRes),
        (status = 409, description = "Admission not in progress", body = ErrorRes)
    )
)]
/// Finalise the patient's in-progress admission with the physician's report.
async fn register_attention(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    Json(req): Json<AttentionReq>,
) -> ApiResult<Json<AttentionRes>> {
    let physician = optional_doctor(req.physician)?;
    let attention = state
        .attention
        .attend_patient(&patient_id, &req.note, physician.as_ref())?;
    Ok(Json(AttentionRes::from(&attention)))
}

#[utoipa::path(
    get,
    path = "/patients/{national_id}",
    params(("national_id" = String, Path, description = "Patient national id")),
    responses(
        (status = 200, description = "Patient on file", body = PatientRes),
        (status = 404, description = "Unknown patient", body = ErrorRes)
    )
)]
async fn get_patient(
    State(state): State<AppState>,
    Path(national_id): Path<String>,
) -> ApiResult<Json<PatientRes>> {
    let patient = state
        .admissions
        .find_patient(&national_id)?
        .ok_or_else(|| CoreError::NotFound(format!("patient {national_id}")))?;
    Ok(Json(PatientRes::from(&patient)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use guardia_core::config::locality_from_env_value;
    use guardia_core::StoreKind;
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use tower::ServiceExt;

    fn app() -> Router {
        let cfg = Arc::new(CoreConfig::new(
            PathBuf::from("unused"),
            StoreKind::Memory,
            locality_from_env_value(None),
        ));
        let stores = Stores::from_config(&cfg).unwrap();
        router(AppState::new(cfg, &stores).unwrap())
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(match body {
                Some(b) => Body::from(b.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn urgency(patient_id: &str, level: &str) -> Value {
        json!({
            "patient_id": patient_id,
            "nurse": { "name": "Marta Ruiz", "license": "MN-908" },
            "note": "dolor abdominal",
            "triage_level": level,
            "vitals": {
                "temperature": 37.0,
                "heart_rate": 90.0,
                "respiratory_rate": 18.0,
                "systolic_pressure": 125.0,
                "diastolic_pressure": 82.0
            }
        })
    }

    fn physician() -> Value {
        json!({ "name": "Dra. Luna", "license": "MP-300" })
    }

    #[tokio::test]
    async fn test_full_workflow_over_http() {
        let app = app();

        let (status, _) = send(&app, "POST", "/admissions", Some(urgency("1", "NON_URGENT"))).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, created) = send(&app, "POST", "/admissions", Some(urgency("2", "CRITICAL"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["state"], "PENDING");

        let (_, pending) = send(&app, "GET", "/admissions/pending", None).await;
        assert_eq!(pending["admissions"][0]["triage_level"], "CRITICAL");
        assert_eq!(pending["admissions"][1]["triage_level"], "NON_URGENT");

        let (status, claimed) = send(
            &app,
            "POST",
            "/admissions/claim",
            Some(json!({ "physician": physician() })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(claimed["patient_id"], "2");
        assert_eq!(claimed["state"], "IN_PROGRESS");

        let (status, attention) = send(
            &app,
            "POST",
            "/admissions/2/attention",
            Some(json!({ "note": "IAM, derivar a hemodinamia", "physician": physician() })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let report = attention["report"].as_str().unwrap();
        assert!(report.contains("dolor abdominal"));
        assert!(report.contains("IAM, derivar a hemodinamia"));

        let (_, all) = send(&app, "GET", "/admissions", None).await;
        assert_eq!(all["admissions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let app = app();

        let (status, body) = send(&app, "POST", "/admissions/claim", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "physician is required");

        let (status, body) = send(
            &app,
            "POST",
            "/admissions/claim",
            Some(json!({ "physician": physician() })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "no patients waiting");

        let mut bad = urgency("1", "URGENT");
        bad["vitals"]["heart_rate"] = json!(-1.0);
        let (status, body) = send(&app, "POST", "/admissions", Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "heart rate cannot be negative");

        let (status, _) = send(&app, "GET", "/patients/20301234563", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cancel_and_placeholder_patient() {
        let app = app();
        send(&app, "POST", "/admissions", Some(urgency("20301234563", "URGENT"))).await;

        let (status, _) = send(&app, "POST", "/admissions/20301234563/cancel", None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        send(
            &app,
            "POST",
            "/admissions/claim",
            Some(json!({ "physician": physician() })),
        )
        .await;
        let (status, _) = send(&app, "POST", "/admissions/20301234563/cancel", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, pending) = send(&app, "GET", "/admissions/pending", None).await;
        assert_eq!(pending["admissions"][0]["patient_id"], "20301234563");

        let (status, patient) = send(&app, "GET", "/patients/20301234563", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(patient["first_name"], "Unregistered");
        assert_eq!(patient["number"], 999);
        assert_eq!(patient["registered"], false);
    }
}
