//! Audit-event sink.
//!
//! Every inbound route records an audit event (route, message, context) in
//! addition to its tracing output. The production deployment ships these to
//! an external log table; that sink is an external collaborator, so only the
//! trait lives here. Recording is fire-and-forget: a sink must never fail
//! the request that produced the event.

use idgate_types::time::utc_rfc3339_now;
use serde::Serialize;

/// One audit record: which route, what happened, and arbitrary context.
#[derive(Clone, Debug, Serialize)]
pub struct AuditEvent {
    pub route: String,
    pub message: String,
    pub context: serde_json::Value,
    pub recorded_at: String,
}

impl AuditEvent {
    pub fn new(route: &str, message: &str, context: serde_json::Value) -> Self {
        Self {
            route: route.to_string(),
            message: message.to_string(),
            context,
            recorded_at: utc_rfc3339_now(),
        }
    }
}

/// Fire-and-forget sink for audit events.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Default sink: emits the event as a structured tracing line.
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        tracing::info!(
            route = %event.route,
            context = %event.context,
            "audit: {}",
            event.message
        );
    }
}
