//! Consinco SQL gateway
//!
//! Main entry point for the HTTP service.

use std::sync::Arc;

use anyhow::Context;
use consinco_api::{router, AppContext};
use consinco_infra::{config, init_tracing};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before logging so RUST_LOG and LOG_FORMAT can live there
    dotenvy::dotenv().ok();
    init_tracing();

    let config = config::load().context("failed to load configuration")?;

    if !config.erp.tls_verify {
        warn!("TLS certificate verification is disabled for ERP calls (CONSINCO_TLS_VERIFY=false)");
    }
    if config.erp.escape_sql {
        info!("SQL text is JSON-escaped before substitution");
    }

    let context = Arc::new(AppContext::new(&config).context("failed to initialize gateways")?);
    let app = router(context);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener =
        TcpListener::bind(&addr).await.with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Consinco gateway listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("Consinco gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
