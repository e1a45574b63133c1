//! Axum-based HTTP server: route table, shared state, and the listen loop.

use crate::handlers;
use axum::routing::{get, post};
use axum::Router;
use idgate_flows::{AadhaarFlow, BharatFlows, CallbackService, PanFlow, VideoKycFlow};
use idgate_poller::Delay;
use idgate_utils::AuditSink;
use idgate_vendor::{ProfileApi, TaskApi};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Task-vendor flows erased to trait objects so the state stays a single
/// concrete type regardless of which client backs it.
pub type DynAadhaarFlow = AadhaarFlow<Arc<dyn TaskApi>, Arc<dyn Delay>>;
pub type DynPanFlow = PanFlow<Arc<dyn TaskApi>, Arc<dyn Delay>>;
pub type DynVideoKycFlow = VideoKycFlow<Arc<dyn ProfileApi>>;

/// Everything the handlers need, shared behind one `Arc`.
pub struct AppState {
    pub aadhaar: DynAadhaarFlow,
    pub pan: DynPanFlow,
    pub video: DynVideoKycFlow,
    pub bharat: BharatFlows,
    pub callbacks: CallbackService,
    pub audit: Arc<dyn AuditSink>,
    pub service_vendor: Option<String>,
}

/// Build the full route table over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/aadharcard", post(handlers::aadhaar_submit))
        .route(
            "/callback",
            get(handlers::callback_echo).post(handlers::callback_receive),
        )
        .route("/aadhar_data", post(handlers::aadhaar_data))
        .route("/pancard", post(handlers::pan_submit))
        .route("/get/pan/number", post(handlers::pan_number))
        .route("/generate/link", post(handlers::video_generate_link))
        .route("/video/kyc/status", post(handlers::video_status))
        .route("/video/kyc/document", post(handlers::video_document))
        .route("/aadhaar/send-otp", post(handlers::bharat_send_otp))
        .route("/aadhaar/verify-otp", post(handlers::bharat_verify_otp))
        .route("/pan/verify", post(handlers::bharat_verify_pan))
        .route(
            "/bank-account/send-request",
            post(handlers::bank_account_send_request),
        )
        .route(
            "/bank-account/get-status",
            post(handlers::bank_account_get_status),
        )
        .route("/bank-account/verify", post(handlers::bank_account_verify))
        .route("/get_service_vendor", get(handlers::service_vendor))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until shut down.
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), std::io::Error> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("gateway listening on {addr}");
    axum::serve(listener, app).await
}
