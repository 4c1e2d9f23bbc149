//! BOXSIGHT — Goodiebox box-score simulation and BI insight service.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! resolves the upstream API credential (fail-fast), and serves the API.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use boxsight::config::AppConfig;
use boxsight::llm::xai::XaiClient;
use boxsight::llm::CompletionBackend;
use boxsight::server;
use boxsight::server::routes::ApiState;

const BANNER: &str = r#"
 ____    ___  __  __ ____   ___   ____  _   _  _____
| __ )  / _ \ \ \/ // ___| |_ _| / ___|| | | ||_   _|
|  _ \ | | | | \  / \___ \  | | | |  _ | |_| |  | |
| |_) || |_| | /  \  ___) | | | | |_| ||  _  |  | |
|____/  \___/ /_/\_\|____/ |___| \____||_| |_|  |_|

  Box Score Simulation & BI Insight Service
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load("config.toml")?;

    init_logging();
    println!("{BANNER}");

    // Fail fast: no credential, no server.
    let api_key = cfg.llm.resolve_api_key()?;
    let client = XaiClient::new(&cfg.llm, api_key)?;
    info!(
        model = client.model_name(),
        api_url = %cfg.llm.api_url,
        timeout_secs = cfg.llm.request_timeout_secs,
        "Completion client ready"
    );

    let state = Arc::new(ApiState {
        llm: Arc::new(client),
    });
    let port = cfg.effective_port();

    server::serve(state, port).await
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("boxsight=info"));

    let json_logging = std::env::var("BOXSIGHT_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
