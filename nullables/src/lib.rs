//! Nullable collaborators for deterministic testing.
//!
//! Every external dependency of the gateway — the two vendor families, the
//! poll delay, object storage, mail, the agent directory — sits behind a
//! trait. This crate provides the test-friendly implementations:
//! - Scripted vendors replay canned responses in order
//! - The counting delay records sleeps instead of performing them
//! - Recording sinks capture what was stored/sent for assertions
//!
//! Usage: swap real implementations for nullables in tests.

pub mod delay;
pub mod services;
pub mod vendor;

pub use delay::CountingDelay;
pub use services::{NullAgentDirectory, RecordingMailer, RecordingObjectStore};
pub use vendor::{ScriptedBharatApi, ScriptedProfileApi, ScriptedTaskApi};
