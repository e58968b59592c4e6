//! Air-Quality Analysis API Server
//!
//! Serves the raster time-series aggregation pipeline over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use clap::Parser;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use aq_api::config::ApiConfig;
use aq_api::handlers;
use aq_api::state::AppState;

/// Air-quality analysis API server
#[derive(Parser, Debug)]
#[command(name = "aq-api")]
#[command(about = "Regional air-quality time-series analysis over satellite rasters")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8085", env = "AQ_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Deadline for each remote raster call, in seconds
    #[arg(long, default_value_t = 30, env = "AQ_REQUEST_TIMEOUT_SECS")]
    timeout_secs: u64,

    /// Study region, west edge (degrees longitude)
    #[arg(long, default_value_t = 100.3, env = "AQ_REGION_MIN_LON")]
    min_lon: f64,

    /// Study region, south edge (degrees latitude)
    #[arg(long, default_value_t = 13.5, env = "AQ_REGION_MIN_LAT")]
    min_lat: f64,

    /// Study region, east edge (degrees longitude)
    #[arg(long, default_value_t = 100.9, env = "AQ_REGION_MAX_LON")]
    max_lon: f64,

    /// Study region, north edge (degrees latitude)
    #[arg(long, default_value_t = 14.0, env = "AQ_REGION_MAX_LAT")]
    max_lat: f64,
}

fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime");

    runtime.block_on(async move {
        run_server(args).await;
    });
}

async fn run_server(args: Args) {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    info!("Starting air-quality analysis API");

    let config = match ApiConfig::new(
        args.min_lon,
        args.min_lat,
        args.max_lon,
        args.max_lat,
        args.timeout_secs,
    ) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!(region = %config.region, "Study region configured");

    let state = Arc::new(AppState::new(config));

    // Build router
    let app = Router::new()
        // Layer registry and map overlays
        .route("/layers", get(handlers::layers::list_layers_handler))
        .route(
            "/layers/:layer_id/overlay",
            get(handlers::layers::overlay_handler),
        )
        // Regional time series (JSON or CSV)
        .route(
            "/layers/:layer_id/timeseries",
            get(handlers::timeseries::timeseries_handler),
        )
        // Aggregate statistics over the temporal mean composite
        .route(
            "/layers/:layer_id/statistics",
            get(handlers::statistics::statistics_handler),
        )
        // Multi-layer analysis with independent per-layer outcomes
        .route("/analysis", get(handlers::analysis::analysis_handler))
        // Health
        .route("/health", get(handlers::health::health_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive());

    // Parse listen address
    let addr: SocketAddr = args.listen.parse().expect("Invalid listen address");

    info!("aq-api listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, app).await.expect("Server failed");
}
