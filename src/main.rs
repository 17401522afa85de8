//! Jenkins Restore Operator
//!
//! Main entry point for the operator. Loads configuration, sets up the
//! Kubernetes client, and runs the Restore controller next to the metrics
//! server until a shutdown signal arrives.

use std::sync::Arc;

use kube::Client;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jenkins_restore_operator::{
    config::OperatorConfig,
    controllers::{self, Context},
    metrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Jenkins Restore Operator");

    let config = OperatorConfig::from_env()?;
    info!(
        backup_volume = %config.restore.backup_volume_path,
        jenkins_home = %config.restore.jenkins_home,
        container = %config.restore.container,
        exec_timeout = ?config.restore.exec_timeout,
        copy_failure_policy = ?config.restore.copy_failure_policy,
        "Loaded configuration"
    );

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes API server");

    let shutdown = CancellationToken::new();
    let context = Arc::new(Context::new(client.clone(), config.restore.clone(), shutdown.clone()));

    let metrics_handle = tokio::spawn(metrics::serve(config.metrics_port));
    info!("Metrics server starting on port {}", config.metrics_port);

    // Cancels in-flight restores on SIGTERM/SIGINT while the controller drains
    let signal_watcher = tokio::spawn(controllers::cancel_on_signal(
        shutdown_signal(),
        shutdown.clone(),
    ));

    let restore_controller = controllers::run_restore_controller(client, context);

    tokio::select! {
        _ = restore_controller => {
            if shutdown.is_cancelled() {
                info!("Restore controller drained");
            } else {
                error!("Restore controller exited unexpectedly");
            }
        }
        _ = metrics_handle => {
            error!("Metrics server exited unexpectedly");
        }
    }

    metrics::mark_unhealthy();
    shutdown.cancel();
    signal_watcher.abort();

    info!("Jenkins Restore Operator stopped");
    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kube=warn,hyper=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received CTRL+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
