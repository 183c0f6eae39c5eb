use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use mbg::router::{ApiRoutes, init_router};
use mbg::state::init_app_state;
use mbg_config::AppConfig;
use mbg_observability::{init_metrics, init_tracing};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = AppConfig::load().context("invalid configuration")?;
    // Dropping the guard flushes the file writer, so it lives as long as main.
    let _log_guard = init_tracing(&config.logging)?;

    info!(environment = config.environment.as_str(), "Starting MBG API");
    if config.dev_auth_suppressed {
        warn!("SUPERADMIN_EMAIL/SUPERADMIN_PASSWORD are set but ignored in production");
    }
    if config.dev_auth.is_some() {
        warn!("Development super admin login is enabled; do not use this configuration outside local setups");
    }
    if config.identity_provider.url.is_none() {
        warn!("SUPABASE_URL is not set; login, refresh and logout will fail");
    }

    let metrics = init_metrics(&config.logging)?;
    let addr = config.server.addr();
    let shutdown_grace = config.server.shutdown_grace;

    let mut state = init_app_state(config).await?;
    if let Some(handle) = metrics {
        state = state.with_metrics(handle);
    }
    let app = init_router(state, ApiRoutes::new());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(address = %addr, "Server listening");
    info!("Scalar UI available at http://{}/scalar", addr);

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async {
            let _ = stop_rx.await;
        })
        .await
    });

    tokio::select! {
        result = &mut server => {
            result??;
            return Ok(());
        }
        _ = shutdown_signal() => {
            info!(grace_secs = shutdown_grace.as_secs(), "Shutdown signal received, draining in-flight requests");
        }
    }

    let _ = stop_tx.send(());
    match tokio::time::timeout(shutdown_grace, &mut server).await {
        Ok(result) => {
            result??;
            info!("Server stopped");
        }
        Err(_) => {
            error!("Shutdown grace period elapsed, dropping remaining connections");
            server.abort();
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for Ctrl+C");
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
                error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
