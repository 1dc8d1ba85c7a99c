use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use planner_push::{FcmClient, FcmConfig, PushSender};
use planner_worker::config::WorkerConfig;
use planner_worker::{cleanup, dispatcher::Dispatcher};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planner_worker=debug,planner_push=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = WorkerConfig::from_env();
    let fcm_config = FcmConfig::from_env().expect("Invalid push configuration");
    tracing::info!(project_id = %fcm_config.project_id, "Loaded worker configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = planner_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    planner_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database connection pool created");

    // --- Push client ---
    let sender: Arc<dyn PushSender> =
        Arc::new(FcmClient::new(fcm_config).expect("Failed to build push client"));

    // --- Jobs ---
    let cancel = CancellationToken::new();

    let dispatcher = Dispatcher::new(pool.clone(), sender);
    let dispatch_cancel = cancel.clone();
    let dispatch_interval = config.dispatch_interval;
    let dispatch_handle = tokio::spawn(async move {
        dispatcher.run(dispatch_interval, dispatch_cancel).await;
    });

    let cleanup_handle = tokio::spawn(cleanup::run(
        pool.clone(),
        config.cleanup_interval,
        config.retention_days,
        cancel.clone(),
    ));

    tracing::info!("Worker started (dispatcher, cleanup)");

    shutdown_signal().await;

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(10), dispatch_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), cleanup_handle).await;
    pool.close().await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), stopping jobs");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, stopping jobs");
        }
    }
}
