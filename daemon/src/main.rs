//! idgate daemon — entry point for running the verification gateway.

mod config;
mod error;
mod services;

pub use error::DaemonError;

use clap::Parser;
use config::GatewayConfig;
use idgate_crypto::FieldCipher;
use idgate_flows::{
    AadhaarFlow, AadhaarTaskConfig, BharatFlows, CallbackService, HttpFetcher, PanFlow,
    RelinkService, VideoKycFlow,
};
use idgate_poller::{CompletionPoller, Delay, TokioDelay};
use idgate_rpc::AppState;
use idgate_store_memory::MemoryStore;
use idgate_utils::TracingAuditSink;
use idgate_vendor::{
    BharatCredentials, BharatEndpoints, HttpBharatClient, HttpProfileClient, HttpTaskClient,
    ProfileApi, TaskApi, TaskCredentials,
};
use services::{FsObjectStore, HttpAgentDirectory, HttpMailer};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "idgate-daemon", about = "idgate identity verification gateway")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "IDGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Address the HTTP server binds to.
    #[arg(long, env = "IDGATE_BIND_ADDR")]
    bind_addr: Option<String>,

    /// Directory vendor-delivered files are written under.
    #[arg(long, env = "IDGATE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Name of the active vendor, surfaced on /get_service_vendor.
    #[arg(long, env = "IDGATE_SERVICE_VENDOR")]
    service_vendor: Option<String>,

    /// Hex-encoded 32-byte AES-256-GCM key for field encryption.
    #[arg(long, env = "IDGATE_ENCRYPTION_KEY")]
    encryption_key: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "IDGATE_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => GatewayConfig::from_toml_file(&path.display().to_string())
            .map_err(|e| anyhow::anyhow!("failed to load config file {}: {e}", path.display()))?,
        None => GatewayConfig::default(),
    };

    if let Some(bind_addr) = cli.bind_addr {
        config.bind_addr = bind_addr;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(service_vendor) = cli.service_vendor {
        config.service_vendor = Some(service_vendor);
    }
    if let Some(encryption_key) = cli.encryption_key {
        config.encryption_key = encryption_key;
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", &config.log_level);
    }
    idgate_utils::init_tracing(config.log_format == "json");
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    let bind_addr = config.bind_addr.clone();
    let state = build_state(config)?;
    idgate_rpc::serve(&bind_addr, state).await?;
    Ok(())
}

/// Wire concrete vendor clients, stores, and edge services into the shared
/// application state.
fn build_state(config: GatewayConfig) -> anyhow::Result<Arc<AppState>> {
    if config.encryption_key.is_empty() {
        anyhow::bail!("encryption_key must be set (64 hex characters)");
    }
    let cipher = Arc::new(FieldCipher::from_hex_key(&config.encryption_key)?);

    let store = Arc::new(MemoryStore::new());
    let client = reqwest::Client::new();
    let delay: Arc<dyn Delay> = Arc::new(TokioDelay);

    let task_credentials = TaskCredentials {
        account_id: config.task_vendor.account_id.clone(),
        api_key: config.task_vendor.api_key.clone(),
    };
    let aadhaar_client: Arc<dyn TaskApi> = Arc::new(HttpTaskClient::new(
        client.clone(),
        task_credentials.clone(),
        config.task_vendor.aadhaar_submit_url.clone(),
        config.task_vendor.status_url.clone(),
    ));
    let pan_client: Arc<dyn TaskApi> = Arc::new(HttpTaskClient::new(
        client.clone(),
        task_credentials.clone(),
        config.task_vendor.pan_submit_url.clone(),
        config.task_vendor.status_url.clone(),
    ));
    let profile_client: Arc<dyn ProfileApi> = Arc::new(HttpProfileClient::new(
        client.clone(),
        task_credentials,
        config.task_vendor.profile_url.clone(),
    ));
    let bharat_client = Arc::new(HttpBharatClient::new(
        client.clone(),
        BharatCredentials {
            customer_id: config.bharat_vendor.customer_id.clone(),
            private_api_key: config.bharat_vendor.private_api_key.clone(),
        },
        BharatEndpoints {
            otp_send_url: config.bharat_vendor.otp_send_url.clone(),
            otp_submit_url: config.bharat_vendor.otp_submit_url.clone(),
            pan_verify_url: config.bharat_vendor.pan_verify_url.clone(),
            penny_drop_send_url: config.bharat_vendor.penny_drop_send_url.clone(),
            penny_drop_status_url: config.bharat_vendor.penny_drop_status_url.clone(),
            pennyless_verify_url: config.bharat_vendor.pennyless_verify_url.clone(),
        },
    ));

    let storage = Arc::new(FsObjectStore::new(
        config.data_dir.clone(),
        config.public_base_url.clone(),
    ));
    let directory = Arc::new(HttpAgentDirectory::new(
        client.clone(),
        config.agents.lookup_url.clone(),
        config.agents.relink_url.clone(),
        config.agents.agent_code_url.clone(),
        config.agents.distributor_review_url.clone(),
    ));
    let mailer = Arc::new(HttpMailer::new(
        client.clone(),
        config.mail.relay_url.clone(),
        config.mail.from.clone(),
    ));

    let aadhaar = AadhaarFlow::new(
        CompletionPoller::new(aadhaar_client, Arc::clone(&delay)),
        store.clone(),
        cipher.clone(),
        AadhaarTaskConfig {
            key_id: config.task_vendor.key_id.clone(),
            ou_id: config.task_vendor.ou_id.clone(),
            secret: config.task_vendor.secret.clone(),
            callback_url: config.callback_url.clone(),
        },
        config.aadhaar_poll,
    );
    let pan = PanFlow::new(
        CompletionPoller::new(pan_client, delay),
        store.clone(),
        cipher.clone(),
        config.pan_poll,
    );
    let video = VideoKycFlow::new(
        Arc::clone(&profile_client),
        store.clone(),
        config.task_vendor.profile_config_id.clone(),
    );
    let bharat = BharatFlows::new(bharat_client, store.clone(), storage.clone(), cipher);

    let relink = RelinkService::new(
        profile_client,
        store.clone(),
        directory.clone(),
        mailer,
        config.task_vendor.profile_config_id.clone(),
    );
    let callbacks = CallbackService::new(
        store.clone(),
        store.clone(),
        store,
        storage,
        Arc::new(HttpFetcher::new(client)),
        directory,
        relink,
    );

    Ok(Arc::new(AppState {
        aadhaar,
        pan,
        video,
        bharat,
        callbacks,
        audit: Arc::new(TracingAuditSink),
        service_vendor: config.service_vendor,
    }))
}
