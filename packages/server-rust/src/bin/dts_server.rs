//! DTS server binary: parses configuration, initializes logging and
//! metrics, then serves HTTP until Ctrl-C.

use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use dts_server::auth::Authenticator;
use dts_server::cli::{Args, LogFormat};
use dts_server::network::NetworkModule;
use dts_server::service::Controller;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dts_server=info,tower_http=info"));

    match format {
        LogFormat::Json => Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_current_span(true))
            .init(),
        LogFormat::Pretty => Registry::default()
            .with(filter)
            .with(fmt::layer().pretty())
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_format);

    if let Some(addr) = args.metrics_addr {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("failed to install Prometheus exporter")?;
        info!(%addr, "Prometheus exporter listening");
    }

    let (network_config, service_config) = args.into_configs()?;
    if service_config.llm.api_key.is_none() {
        warn!("OPENAI_API_KEY not set; translation and summarization will fail");
    }
    if service_config.oauth.client_id.is_none() || service_config.oauth.client_secret.is_none() {
        warn!("Google OAuth credentials not set; login endpoints will fail");
    }

    let controller = Arc::new(Controller::from_config(&service_config));
    let auth = Arc::new(Authenticator::from_config(&service_config));

    let mut module = NetworkModule::new(network_config, controller, auth);
    let port = module.start().await?;
    info!(port, version = env!("CARGO_PKG_VERSION"), "dts-server started");

    module
        .serve(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        })
        .await
}
