//! Route handlers.
//!
//! Every handler is a thin adapter: read headers/body, call the flow,
//! translate the result. Identity values travel in headers on the legacy
//! routes (`Aadhar-no`, `Reference-id`, `Profile-id`) — that shape is load
//! bearing for deployed clients.

use crate::error::RpcError;
use crate::server::AppState;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use idgate_flows::{CallbackAck, PanRequest};
use idgate_types::{ProfileId, ReferenceId};
use idgate_utils::AuditEvent;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn required_header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, RpcError> {
    header(headers, name)
        .ok_or_else(|| RpcError::bad_request(format!("{name} header is missing")))
}

fn required_profile_id(headers: &HeaderMap) -> Result<ProfileId, RpcError> {
    header(headers, "Profile-id")
        .map(ProfileId::new)
        .ok_or_else(|| RpcError::bad_request("Profile-id is missing in request headers"))
}

pub async fn index() -> &'static str {
    "idgate verification gateway v0.1"
}

// ── Aadhaar (task vendor) ────────────────────────────────────────────────

pub async fn aadhaar_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, RpcError> {
    let submission = state
        .aadhaar
        .submit(header(&headers, "Aadhar-no"))
        .await?;
    state.audit.record(AuditEvent::new(
        "/aadharcard",
        "aadhaar task submitted",
        json!({"reference_id": submission.reference_id.clone()}),
    ));
    Ok(Json(submission).into_response())
}

pub async fn aadhaar_data(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, RpcError> {
    let reference_id = ReferenceId::new(required_header(&headers, "Reference-id")?);
    let data = state.aadhaar.retrieve(&reference_id)?;
    Ok(Json(data).into_response())
}

// ── Callback ─────────────────────────────────────────────────────────────

/// Diagnostic echo for vendor-side connectivity checks.
pub async fn callback_echo(
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Option<Json<Value>>,
) -> Response {
    let headers: HashMap<String, String> = headers
        .iter()
        .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_owned())))
        .collect();
    Json(json!({
        "idfy_callback_get_response_data": {
            "params": params,
            "json": body.map(|Json(v)| v),
            "headers": headers,
        }
    }))
    .into_response()
}

pub async fn callback_receive(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<Response, RpcError> {
    let ack = state.callbacks.dispatch(payload).await?;
    state.audit.record(AuditEvent::new(
        "/callback",
        "vendor callback processed",
        json!({}),
    ));
    Ok(match ack {
        CallbackAck::Aadhaar => "Received IDFY Aadhar Data".into_response(),
        CallbackAck::VideoKyc { error: None } => "Received Video KYC data".into_response(),
        // Identity mismatch is data for the vendor's reviewer, not a webhook
        // failure: HTTP 200 with a body-level error key.
        CallbackAck::VideoKyc { error: Some(message) } => {
            (StatusCode::OK, Json(json!({"error": message}))).into_response()
        }
        CallbackAck::Other => "Received IDFY data".into_response(),
    })
}

// ── PAN (task vendor) ────────────────────────────────────────────────────

pub async fn pan_submit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PanRequest>,
) -> Result<Response, RpcError> {
    let verification = state.pan.submit(request).await?;
    state.audit.record(AuditEvent::new(
        "/pancard",
        "pan task stored",
        json!({"reference_id": verification.reference_id.clone()}),
    ));
    Ok(Json(verification).into_response())
}

pub async fn pan_number(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, RpcError> {
    let reference_id = ReferenceId::new(required_header(&headers, "Reference-id")?);
    let pan_number = state.pan.retrieve_number(&reference_id)?;
    Ok(Json(json!({"pan_number": pan_number})).into_response())
}

// ── Video KYC ────────────────────────────────────────────────────────────

pub async fn video_generate_link(
    State(state): State<Arc<AppState>>,
    body: Option<Json<Value>>,
) -> Result<Response, RpcError> {
    let Some(Json(request)) = body else {
        return Err(RpcError::bad_request("Request data is missing"));
    };
    let response = state.video.generate_link(&request).await?;
    state.audit.record(AuditEvent::new(
        "/generate/link",
        "video kyc profile created",
        json!({"profile_id": response.get("profile_id")}),
    ));
    Ok(Json(response).into_response())
}

pub async fn video_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, RpcError> {
    let profile_id = required_profile_id(&headers)?;
    let status = state.video.status(&profile_id).await?;
    Ok(Json(status).into_response())
}

pub async fn video_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, RpcError> {
    let profile_id = required_profile_id(&headers)?;
    let document = state.video.document(&profile_id).await?;
    Ok(Json(document).into_response())
}

// ── Bharat vendor family ─────────────────────────────────────────────────

fn relay(response: idgate_flows::ApiResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body)).into_response()
}

pub async fn bharat_send_otp(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Response, RpcError> {
    Ok(relay(state.bharat.send_otp(&body).await?))
}

pub async fn bharat_verify_otp(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Response, RpcError> {
    Ok(relay(state.bharat.verify_otp(&body).await?))
}

pub async fn bharat_verify_pan(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Response, RpcError> {
    Ok(relay(state.bharat.verify_pan(&body).await?))
}

pub async fn bank_account_send_request(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Response, RpcError> {
    Ok(relay(state.bharat.penny_drop_send(&body).await?))
}

pub async fn bank_account_get_status(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Response, RpcError> {
    Ok(relay(state.bharat.penny_drop_status(&body).await?))
}

pub async fn bank_account_verify(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Response, RpcError> {
    Ok(relay(state.bharat.pennyless_verify(&body).await?))
}

// ── Meta ─────────────────────────────────────────────────────────────────

pub async fn service_vendor(State(state): State<Arc<AppState>>) -> Result<Response, RpcError> {
    match &state.service_vendor {
        Some(vendor) => Ok(Json(json!({"service_vendor": vendor})).into_response()),
        None => Err(RpcError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "SERVICE_VENDOR not set",
        )),
    }
}
