use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trellis_server::api;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trellis_server=debug,trellis_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Trellis Server...");

    let max_concurrent_jobs = std::env::var("TRELLIS_MAX_CONCURRENT_JOBS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(4);

    let gateway = trellis_engine::gateway::Gateway::new(
        trellis_engine::simulated::registry(),
        max_concurrent_jobs,
    );

    // Build router with all API endpoints
    let app = api::create_router(gateway);

    // Get bind address
    let addr = std::env::var("TRELLIS_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
