//! Shift Scheduling - Axum Server
//!
//! Run with: cargo run
//! Then open: http://localhost:7860

use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use shift_scheduling::api;
use shift_scheduling::config::SchedulerConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("shift_scheduling=info".parse()?),
        )
        .init();

    #[cfg(feature = "console")]
    shift_scheduling::console::print_banner();

    let config = SchedulerConfig::from_env()?;
    let addr = config.bind_address.clone();
    info!(
        daily_cap = config.daily_cap,
        time_limit_secs = config.time_limit_secs,
        max_exact_solves = config.max_exact_solves,
        "Loaded configuration"
    );

    let state = Arc::new(api::AppState::new(config));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api::router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    println!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
