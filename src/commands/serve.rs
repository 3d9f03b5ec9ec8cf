//! Serve command: connects every backing service and runs the HTTP API.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{init_error_diagnostics, AppError, AppResult};
use crate::infra::{Cache, Database};
use crate::jobs::JobQueues;
use crate::services::QueueNotifier;

pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }
    init_error_diagnostics(config.is_production());
    tracing::info!(env = %config.app_env, "Starting storefront");

    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    let cache = Cache::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Redis connection failed: {}", e)))?;
    // Notifications are only enqueued here; `jobs work` delivers them.
    let queues = JobQueues::connect(&config).await?;
    tracing::info!("PostgreSQL, Redis and job queues ready");

    let notifier = Arc::new(QueueNotifier::new(queues.email, queues.sms));
    let app = create_router(
        AppState::from_config(db, cache, notifier, config.clone()),
        &config,
    );

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutdown requested, draining connections");
    })
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))
}
