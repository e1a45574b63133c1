//! Gateway configuration with TOML file support.

use idgate_types::PollPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::DaemonError;

/// Full configuration for the verification gateway.
///
/// Can be loaded from a TOML file via [`GatewayConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every field has a serde
/// default so a partial file is enough to start a dev instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory vendor-delivered files are written under.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Base URL stored files are served from; stored-file URLs are
    /// `{public_base_url}/{object_name}`.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// URL the task vendor pushes callbacks to (this gateway's own
    /// `/callback` route, as reachable from outside).
    #[serde(default = "default_callback_url")]
    pub callback_url: String,

    /// Name of the currently active vendor, surfaced on
    /// `/get_service_vendor`. Unset means the route answers 500.
    #[serde(default)]
    pub service_vendor: Option<String>,

    /// Hex-encoded 32-byte AES-256-GCM key for field encryption.
    #[serde(default)]
    pub encryption_key: String,

    /// Poll budget for Aadhaar redirect-link tasks.
    #[serde(default = "PollPolicy::aadhaar")]
    pub aadhaar_poll: PollPolicy,

    /// Poll budget for PAN source-verification tasks.
    #[serde(default = "PollPolicy::pan")]
    pub pan_poll: PollPolicy,

    #[serde(default)]
    pub task_vendor: TaskVendorConfig,

    #[serde(default)]
    pub bharat_vendor: BharatVendorConfig,

    #[serde(default)]
    pub agents: AgentServiceConfig,

    #[serde(default)]
    pub mail: MailConfig,
}

/// Task/profile vendor family: credentials plus per-flow endpoints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskVendorConfig {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub api_key: String,

    /// Submission endpoint for Aadhaar fetch tasks.
    #[serde(default)]
    pub aadhaar_submit_url: String,
    /// Submission endpoint for PAN verification tasks.
    #[serde(default)]
    pub pan_submit_url: String,
    /// Shared task status endpoint.
    #[serde(default)]
    pub status_url: String,
    /// Video-KYC profile creation endpoint.
    #[serde(default)]
    pub profile_url: String,
    /// Capture configuration id sent on profile creation.
    #[serde(default)]
    pub profile_config_id: String,

    /// DigiLocker gateway parameters carried on Aadhaar submissions.
    #[serde(default)]
    pub key_id: String,
    #[serde(default)]
    pub ou_id: String,
    #[serde(default)]
    pub secret: String,
}

/// Bharat vendor family: credentials plus one URL per operation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BharatVendorConfig {
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub private_api_key: String,

    #[serde(default)]
    pub otp_send_url: String,
    #[serde(default)]
    pub otp_submit_url: String,
    #[serde(default)]
    pub pan_verify_url: String,
    #[serde(default)]
    pub penny_drop_send_url: String,
    #[serde(default)]
    pub penny_drop_status_url: String,
    #[serde(default)]
    pub pennyless_verify_url: String,
}

/// Agent-directory service endpoints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentServiceConfig {
    /// Agent lookup by open profile id.
    #[serde(default)]
    pub lookup_url: String,
    /// Moves an agent's open session to a replacement profile id.
    #[serde(default)]
    pub relink_url: String,
    /// Agent-code issuance trigger.
    #[serde(default)]
    pub agent_code_url: String,
    /// Distributor review bookkeeping.
    #[serde(default)]
    pub distributor_review_url: String,
}

/// Outbound mail relay.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MailConfig {
    /// HTTP relay endpoint messages are posted to.
    #[serde(default)]
    pub relay_url: String,
    #[serde(default = "default_mail_from")]
    pub from: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./idgate_data")
}

fn default_public_base_url() -> String {
    "http://localhost:8000/files".to_string()
}

fn default_callback_url() -> String {
    "http://localhost:8000/callback".to_string()
}

fn default_mail_from() -> String {
    "noreply@localhost".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GatewayConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, DaemonError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| DaemonError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, DaemonError> {
        toml::from_str(s).map_err(|e| DaemonError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("GatewayConfig is always serializable to TOML")
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            data_dir: default_data_dir(),
            public_base_url: default_public_base_url(),
            callback_url: default_callback_url(),
            service_vendor: None,
            encryption_key: String::new(),
            aadhaar_poll: PollPolicy::aadhaar(),
            pan_poll: PollPolicy::pan(),
            task_vendor: TaskVendorConfig::default(),
            bharat_vendor: BharatVendorConfig::default(),
            agents: AgentServiceConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl Default for TaskVendorConfig {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            api_key: String::new(),
            aadhaar_submit_url: String::new(),
            pan_submit_url: String::new(),
            status_url: String::new(),
            profile_url: String::new(),
            profile_config_id: String::new(),
            key_id: String::new(),
            ou_id: String::new(),
            secret: String::new(),
        }
    }
}

impl Default for BharatVendorConfig {
    fn default() -> Self {
        Self {
            customer_id: String::new(),
            private_api_key: String::new(),
            otp_send_url: String::new(),
            otp_submit_url: String::new(),
            pan_verify_url: String::new(),
            penny_drop_send_url: String::new(),
            penny_drop_status_url: String::new(),
            pennyless_verify_url: String::new(),
        }
    }
}

impl Default for AgentServiceConfig {
    fn default() -> Self {
        Self {
            lookup_url: String::new(),
            relink_url: String::new(),
            agent_code_url: String::new(),
            distributor_review_url: String::new(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            relay_url: String::new(),
            from: default_mail_from(),
        }
    }
}
