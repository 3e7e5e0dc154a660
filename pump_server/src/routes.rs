//! Route handlers: the command dispatch boundary.
//!
//! Each request authenticates via the `session` query parameter, takes the
//! device mutex, performs exactly one operation and produces a complete,
//! connection-closing reply. Domain errors are converted here into
//! `{status:"error", message}` payloads; none propagate as uncaught faults.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use serde::Deserialize;
use serde_json::{Value, json};

use pump_core::{Device, DeviceError, GlucoseSnapshot};
use pump_traits::{GlucoseSensor, Indicator, Pump};

use crate::pages;

/// The concrete device type behind the router: hardware seams are boxed so
/// simulated and GPIO backends share one state type.
pub type DynDevice = Device<
    Box<dyn GlucoseSensor + Send>,
    Box<dyn Pump + Send>,
    Box<dyn Indicator + Send>,
>;

#[derive(Clone)]
pub struct AppState {
    pub device: Arc<Mutex<DynDevice>>,
}

impl AppState {
    pub fn new(device: Arc<Mutex<DynDevice>>) -> Self {
        Self { device }
    }

    fn lock(&self) -> MutexGuard<'_, DynDevice> {
        match self.device.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/dashboard", get(dashboard))
        .route("/api/glucose", get(glucose))
        .route("/api/login", post(login))
        .route("/api/register", post(register))
        .route("/api/logout", post(logout))
        .route("/api/injection/start", post(injection_start))
        .route("/api/injection/stop", post(injection_stop))
        .layer(middleware::map_response(close_connection))
        .with_state(state)
}

/// Every reply closes the connection; no persistent connections or
/// pipelining.
async fn close_connection(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}

// ── Error mapping ────────────────────────────────────────────────────────

/// A domain error mapped onto an HTTP status and structured payload.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<eyre::Report> for ApiError {
    fn from(err: eyre::Report) -> Self {
        let (status, message) = match err.downcast_ref::<DeviceError>() {
            Some(DeviceError::Auth(msg)) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Some(DeviceError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg.clone()),
            Some(DeviceError::State(msg)) => (StatusCode::CONFLICT, msg.clone()),
            Some(DeviceError::Storage(msg)) => {
                tracing::error!(error = %err, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            Some(DeviceError::Hardware(msg)) => {
                tracing::error!(error = %err, "hardware failure");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            None => {
                tracing::error!(error = %err, "unexpected failure");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };
        Self { status, message }
    }
}

impl ApiError {
    fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "status": "error", "message": self.message }));
        (self.status, body).into_response()
    }
}

// ── Pages ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SessionQuery {
    #[serde(default)]
    session: String,
}

async fn index() -> Html<&'static str> {
    Html(pages::LOGIN_PAGE)
}

async fn dashboard(State(state): State<AppState>, Query(q): Query<SessionQuery>) -> Response {
    if state.lock().is_authenticated(&q.session) {
        Html(pages::DASHBOARD_PAGE).into_response()
    } else {
        // 302 back to the login page for unauthenticated visitors.
        (
            StatusCode::FOUND,
            [(header::LOCATION, HeaderValue::from_static("/"))],
        )
            .into_response()
    }
}

// ── JSON API ─────────────────────────────────────────────────────────────

async fn glucose(
    State(state): State<AppState>,
    Query(q): Query<SessionQuery>,
) -> Result<Json<GlucoseSnapshot>, ApiError> {
    let mut device = state.lock();
    device.authenticate(&q.session)?;
    let snapshot = device.glucose_snapshot()?;
    Ok(Json(snapshot))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let token = state.lock().login(&req.username, &req.password)?;
    Ok(Json(json!({ "status": "ok", "session_id": token })))
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    age: Value,
    #[serde(default)]
    weight: Value,
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<Value>, ApiError> {
    // Form clients send age/weight as strings; convert and reject
    // non-numeric input before touching the store.
    let age = parse_u32(&req.age).ok_or_else(|| ApiError::validation("invalid age"))?;
    let weight = parse_f32(&req.weight).ok_or_else(|| ApiError::validation("invalid weight"))?;

    state
        .lock()
        .register(&req.username, &req.password, &req.email, age, weight)?;
    Ok(Json(json!({ "status": "ok", "message": "account created" })))
}

async fn logout(
    State(state): State<AppState>,
    Query(q): Query<SessionQuery>,
) -> Result<Json<Value>, ApiError> {
    state.lock().logout(&q.session)?;
    Ok(Json(json!({ "status": "ok" })))
}

#[derive(Debug, Deserialize)]
struct StartRequest {
    #[serde(default)]
    dose: Value,
}

async fn injection_start(
    State(state): State<AppState>,
    Query(q): Query<SessionQuery>,
    Json(req): Json<StartRequest>,
) -> Result<Json<Value>, ApiError> {
    let dose = parse_f32(&req.dose).ok_or_else(|| ApiError::validation("invalid dose"))?;
    state.lock().start_injection(&q.session, dose)?;
    Ok(Json(json!({ "status": "ok", "message": "injection started" })))
}

async fn injection_stop(
    State(state): State<AppState>,
    Query(q): Query<SessionQuery>,
) -> Result<Json<Value>, ApiError> {
    state.lock().stop_injection(&q.session)?;
    Ok(Json(json!({ "status": "ok", "message": "injection stopped" })))
}

// ── Field coercion ───────────────────────────────────────────────────────

fn parse_u32(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|x| u32::try_from(x).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_f32(v: &Value) -> Option<f32> {
    let f = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f as f32)
}

#[cfg(test)]
mod coercion_tests {
    use super::{parse_f32, parse_u32};
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings_are_accepted() {
        assert_eq!(parse_u32(&json!(34)), Some(34));
        assert_eq!(parse_u32(&json!("34")), Some(34));
        assert_eq!(parse_f32(&json!(61.5)), Some(61.5));
        assert_eq!(parse_f32(&json!(" 61.5 ")), Some(61.5));
    }

    #[test]
    fn non_numeric_input_is_rejected() {
        assert_eq!(parse_u32(&json!("abc")), None);
        assert_eq!(parse_u32(&json!(null)), None);
        assert_eq!(parse_u32(&json!(-3)), None);
        assert_eq!(parse_f32(&json!("heavy")), None);
        assert_eq!(parse_f32(&json!(null)), None);
    }
}
