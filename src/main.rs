use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use media_job_tracker::app_state::AppState;
use media_job_tracker::config::AppConfig;
use media_job_tracker::routes;
use media_job_tracker::services::backend::BackendClient;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing media-job-tracker server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!("jobs_submitted_total", "Jobs accepted by the backend");
    metrics::describe_counter!("job_status_polls_total", "Status queries issued");
    metrics::describe_counter!(
        "job_status_poll_errors_total",
        "Status queries that failed to produce a snapshot"
    );
    metrics::describe_counter!(
        "jobs_finished_total",
        "Jobs that reached a terminal state, by kind and outcome"
    );
    metrics::describe_counter!(
        "side_panel_fetches_total",
        "Side panel requests actually sent to the backend"
    );

    tracing::info!(backend = %config.backend_base_url, "Initializing backend client");
    let backend = BackendClient::new(config.backend_base_url.clone(), config.backend_token.clone());

    let polling = config.polling();
    tracing::info!(
        interval_ms = polling.interval_ms,
        max_transient_failures = ?polling.max_transient_failures,
        "Polling configured"
    );

    // Create shared application state
    let state = AppState::new(backend, &polling);

    let app = routes::api_router(state.clone())
        // Prometheus metrics endpoint (separate state)
        .merge(
            Router::new()
                .route("/metrics", get(routes::ops::prometheus_metrics))
                .with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(64 * 1024));

    tracing::info!("Starting media-job-tracker on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutdown signal received");
        })
        .await
        .expect("Server error");

    state.shutdown();
    tracing::info!("Polling stopped, exiting");
}
