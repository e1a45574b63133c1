//! HTTP surface of the gateway.
//!
//! Thin axum shell over the flows crate: handlers pull headers and JSON
//! bodies apart, call one flow method, and translate the outcome. Route
//! paths and response shapes match what the deployed clients already rely
//! on, quirks included.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{router, serve, AppState};
