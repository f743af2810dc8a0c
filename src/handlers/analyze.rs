use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use std::time::Instant;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};
use crate::handlers::AppState;
use crate::middleware::REQUEST_ID_HEADER;
use crate::models::{AnalyzeResponse, UploadedReport};

pub async fn analyze_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> AppResult<Json<AnalyzeResponse>> {
    let start = Instant::now();
    // set by logging_middleware, so handler and access logs share one id
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_string();

    info!(request_id = %request_id, "Starting blood test analysis request");

    let report = match read_report(&mut multipart, state.config.max_file_size_mb).await {
        Ok(report) => {
            info!(
                request_id = %request_id,
                file_name = %report.file_name,
                file_size = report.size(),
                "Report received from multipart form"
            );
            report
        }
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "Rejected upload");
            return Err(e);
        }
    };

    let results = match state.pipeline.run(report).await {
        Ok(results) => results,
        Err(e) => {
            error!(request_id = %request_id, error_code = e.error_code(), error = %e, "Analysis pipeline failed");
            return Err(e);
        }
    };

    info!(
        request_id = %request_id,
        total_time_ms = start.elapsed().as_millis() as u64,
        "Request completed successfully"
    );

    Ok(Json(AnalyzeResponse::success(results)))
}

async fn read_report(multipart: &mut Multipart, limit_mb: usize) -> AppResult<UploadedReport> {
    let mut email = None;
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit_mb))?
    {
        match field.name().unwrap_or("") {
            "email" => {
                let value = field.text().await.map_err(|e| multipart_error(e, limit_mb))?;
                email = Some(value);
            }
            "pdf_file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await.map_err(|e| multipart_error(e, limit_mb))?;
                upload = Some((file_name, data));
            }
            other => {
                tracing::debug!(field = other, "Ignoring unexpected multipart field");
            }
        }
    }

    let email = email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::invalid_input("Missing form field: email"))?;
    let (file_name, data) =
        upload.ok_or_else(|| AppError::invalid_input("Missing form field: pdf_file"))?;

    let limit_bytes = limit_mb * 1024 * 1024;
    if data.len() > limit_bytes {
        return Err(AppError::FileTooLarge {
            size: data.len() / (1024 * 1024),
            limit: limit_mb,
        });
    }

    Ok(UploadedReport::new(file_name, data, email))
}

fn multipart_error(err: MultipartError, limit_mb: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        // the body was cut off at the limit, so the real size is unknown
        AppError::UploadLimitExceeded { limit: limit_mb }
    } else {
        AppError::invalid_input(format!("Failed to read multipart form: {}", err.body_text()))
    }
}
