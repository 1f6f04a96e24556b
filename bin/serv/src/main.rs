use std::net::SocketAddr;

use anyhow::Context;
use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;
use wms_api::{
    ApiConfig, ApiState,
    auth::service::bootstrap_admin,
    jobs::start_background_jobs,
    metrics::{init_metrics, metrics_handler, track_metrics},
    middleware::{apply_security_headers, create_cors_layer, request_id_middleware},
    tracing::init_tracing,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env().context("invalid configuration")?;

    init_tracing(config.env);
    let metrics_handle = init_metrics()?;

    let pool = wms_db::create_pool(&config.database_url, config.db_max_connections).await?;
    wms_db::ensure_db_and_migrate(&config.database_url, &pool).await?;

    if let Some(admin_id) = bootstrap_admin(
        &pool,
        config.admin_email.as_deref(),
        config.admin_password.as_deref(),
        config.bcrypt_cost,
    )
    .await?
    {
        tracing::info!(%admin_id, "Created initial admin account");
    }

    let bind_address = config.bind_address();
    let allowed_origins = config.allowed_origins.clone();
    let environment = config.env;

    let state = ApiState::new(config, pool)?;
    let jobs = start_background_jobs(&state);

    let api = wms_api::router::router().with_state(state);
    let metrics = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    let app = apply_security_headers(api.merge(metrics), environment)
        .layer(middleware::from_fn(track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer(&allowed_origins))
        .layer(middleware::from_fn(request_id_middleware));

    // Start the server
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %bind_address, %environment, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    for job in jobs {
        job.abort();
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
