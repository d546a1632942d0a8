// rca-gateway-rs/src/main.rs
// RCA Gateway - HTTP entry point for the RCA desk
// Port 8080 by default (RCA_GATEWAY_SERVICE_PORT / gateway.port)

use std::sync::Arc;

use rca_gateway::{build_router, handlers, AppState, SERVICE_NAME};
use shared_types_rs::{ConfigError, RcaDeskConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// Loaded configuration, plus the path that was missing when defaults were used.
fn load_config() -> Result<(Arc<RcaDeskConfig>, Option<String>), ConfigError> {
    match RcaDeskConfig::load() {
        Ok(config) => Ok((config, None)),
        Err(ConfigError::FileNotFound(path)) => {
            let mut config = RcaDeskConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok((Arc::new(config), Some(path)))
        }
        Err(e) => Err(e),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    handlers::mark_started();

    // Subscriber goes in first so config-rs warnings are not lost; the level
    // from the config file applies once it is loaded, unless RUST_LOG is set.
    let env_filter = EnvFilter::try_from_default_env().ok();
    let has_env_filter = env_filter.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    config_rs::load_dotenv();
    let (config, missing_file) = load_config()?;

    if !has_env_filter {
        if let Err(e) = filter_handle.reload(EnvFilter::new(&config.system.log_level)) {
            tracing::warn!(error = %e, "failed to apply configured log level");
        }
    }

    if let Some(path) = missing_file {
        tracing::warn!(%path, "configuration file not found, using defaults");
    }

    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    let addr = config_rs::get_bind_address(config_rs::GATEWAY_SERVICE, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(service = SERVICE_NAME, %addr, "RCA gateway starting");
    tracing::info!(
        analysis = %config.analysis.base_url,
        environment = %config.system.environment,
        "analysis backend target"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
