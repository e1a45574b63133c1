//! Shared utilities for the idgate verification gateway.

pub mod audit;
pub mod logging;
pub mod services;

pub use audit::{AuditEvent, AuditSink, TracingAuditSink};
pub use logging::init_tracing;
pub use services::{AgentContact, AgentDirectory, Mailer, ObjectStorage, ServiceError};
