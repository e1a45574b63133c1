//! Error-to-response translation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use idgate_flows::FlowError;
use idgate_poller::PollError;
use idgate_store::StoreError;
use idgate_vendor::VendorError;
use serde_json::{json, Value};

/// An HTTP error reply: status plus a JSON body with an `error` key (and,
/// for vendor rejections, the raw vendor response).
#[derive(Debug)]
pub struct RpcError {
    pub status: StatusCode,
    pub body: Value,
}

impl RpcError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({"error": message.into()}),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<FlowError> for RpcError {
    fn from(e: FlowError) -> Self {
        match e {
            FlowError::MissingFields { .. }
            | FlowError::InvalidInput(_)
            | FlowError::Duplicate(_)
            | FlowError::IdentityMismatch { .. } => {
                RpcError::new(StatusCode::BAD_REQUEST, e.to_string())
            }
            FlowError::NotFound(_) => RpcError::new(StatusCode::NOT_FOUND, e.to_string()),
            FlowError::Store(ref s) => match s {
                StoreError::Duplicate(_) => RpcError::new(StatusCode::BAD_REQUEST, e.to_string()),
                StoreError::NotFound(_) => RpcError::new(StatusCode::NOT_FOUND, e.to_string()),
                _ => RpcError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            },
            FlowError::Vendor(VendorError::Submission { message, response }) => RpcError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: json!({"error": message, "Response": response}),
            },
            FlowError::Poll(ref p) => match p {
                PollError::Terminal { status, message } => RpcError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to fetch data - status : {status}-- error: {message}"),
                ),
                _ => RpcError::new(StatusCode::INTERNAL_SERVER_ERROR, p.to_string()),
            },
            other => RpcError::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
