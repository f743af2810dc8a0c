use axum::{http::StatusCode, response::Json};
use tracing::{info, warn};

use crate::models::{HealthResponse, ServiceStatus};
use crate::services::{PdftoppmRasterizer, TesseractOcr};

/// Checks for the OCR binaries. The checks spawn processes, so they run on
/// the blocking pool.
pub async fn ocr_toolchain_status() -> ServiceStatus {
    let checks = tokio::task::spawn_blocking(|| ServiceStatus {
        rasterizer: PdftoppmRasterizer::is_available(),
        ocr: TesseractOcr::is_available(),
    })
    .await;

    match checks {
        Ok(status) => status,
        Err(e) => {
            warn!(error = %e, "OCR toolchain check did not complete");
            ServiceStatus {
                rasterizer: false,
                ocr: false,
            }
        }
    }
}

/// Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    let services = ocr_toolchain_status().await;

    let status = if services.rasterizer && services.ocr {
        "healthy"
    } else {
        "degraded"
    };

    info!(
        status = status,
        rasterizer_available = services.rasterizer,
        ocr_available = services.ocr,
        "Health check completed"
    );

    Json(HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    })
}

/// Readiness check endpoint
pub async fn ready_handler() -> StatusCode {
    let services = ocr_toolchain_status().await;
    if services.rasterizer && services.ocr {
        StatusCode::OK
    } else {
        info!("Readiness check failed - OCR toolchain unavailable");
        StatusCode::SERVICE_UNAVAILABLE
    }
}
