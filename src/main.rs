use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bloodwork::config::Config;
use bloodwork::handlers::{create_router, AppState};
use bloodwork::services::{PdftoppmRasterizer, ReportPipeline, TesseractOcr};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    init_tracing();

    let config = Arc::new(Config::from_env()?);

    tracing::info!("Starting blood test analysis service");
    tracing::info!("Max file size: {}MB", config.max_file_size_mb);
    tracing::info!(model = %config.model_name, url = %config.ollama_url, "Using generation endpoint");

    if !PdftoppmRasterizer::is_available() || !TesseractOcr::is_available() {
        tracing::warn!("pdftoppm or tesseract missing; scanned reports will fail to extract");
    }

    let pipeline = ReportPipeline::from_config(&config);
    let app = create_router(AppState::new(Arc::clone(&config), pipeline));

    let addr = config.bind_address();
    tracing::info!("Server listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bloodwork=debug,tower_http=debug,axum::rejection=trace".into());

    // LOG_FORMAT is read ahead of Config so that config loading itself is logged
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}
