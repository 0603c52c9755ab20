// ==============================================================================
// handlers.rs - API Request Handlers
// ==============================================================================
// Description: HTTP request handlers for pedigree upload and rendering
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use pedigree_grapher::focus::Notice;
use pedigree_grapher::output::OutputFormat;
use pedigree_grapher::validator::ValidatedUpload;
use pedigree_grapher::{LayoutEngine, PedigreeProcessor, PedigreeRequest, PedigreeResponse};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{models::*, state::AppState};

/// Root endpoint - API information
pub async fn root() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        service: "Pedigree API Gateway",
        version: "1.0.0",
        endpoints: vec![
            "/api/pedigree/health - Health check",
            "/api/pedigree/render - Upload pedigree, get table and image as JSON (POST)",
            "/api/pedigree/download - Upload pedigree, download the image (POST)",
        ],
    })
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = state.engine();
    let layout_engine = tokio::task::spawn_blocking(move || engine.is_available())
        .await
        .unwrap_or(false);

    Json(HealthResponse {
        status: "ok",
        version: "1.0.0",
        layout_engine,
        timestamp: Utc::now(),
    })
}

/// Render endpoint: table, notices and base64 image
pub async fn render(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<RenderResponse>, AppError> {
    let request_id = Uuid::new_v4();
    info!("Received render request {}", request_id);

    let form = read_form(multipart).await?;
    let (upload, response) = run_pipeline(&state, form).await?;

    let image = response.image.as_ref().map(|image| ImagePayload {
        format: image.format,
        mime_type: image.format.mime_type(),
        data_base64: STANDARD.encode(&image.bytes),
    });

    info!(
        "Render {} complete: {} rows, image {}",
        request_id,
        response.rows.len(),
        image.is_some()
    );

    Ok(Json(RenderResponse {
        request_id,
        upload: UploadInfo::from(&upload),
        rows: response.rows,
        focus: response.focus,
        hatch_year: response.hatch_year,
        file_name: response.file_name,
        notices: response.notices,
        image,
    }))
}

/// Download endpoint: raw image bytes as an attachment
pub async fn download(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_form(multipart).await?;
    let (_, response) = run_pipeline(&state, form).await?;

    let Some(image) = response.image else {
        let reason = response
            .notices
            .iter()
            .find(|notice| matches!(notice, Notice::NoImage { .. }))
            .map(|notice| notice.to_string())
            .unwrap_or_else(|| "No image could be generated".to_string());
        return Err(AppError::Unprocessable(reason));
    };

    let disposition = HeaderValue::from_str(&content_disposition(&response.file_name))
        .map_err(|e| AppError::Internal(format!("Invalid download filename: {}", e)))?;

    info!("Serving {} ({} bytes)", response.file_name, image.bytes.len());

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(image.format.mime_type())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        image.bytes,
    )
        .into_response())
}

/// Collect the multipart form fields
async fn read_form(mut multipart: Multipart) -> Result<RenderForm, AppError> {
    let mut form = RenderForm::default();
    let mut has_file = false;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                form.file_name = field.file_name().unwrap_or("pedigree.csv").to_string();
                form.data = field.bytes().await.map_err(multipart_error)?.to_vec();
                has_file = true;
            }
            "individual_id" => form.individual_id = field.text().await.map_err(multipart_error)?,
            "band_id" => form.band_id = field.text().await.map_err(multipart_error)?,
            "hatch_year" => form.hatch_year = field.text().await.map_err(multipart_error)?,
            "format" => {
                let value = field.text().await.map_err(multipart_error)?;
                form.format = value
                    .parse::<OutputFormat>()
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            other => warn!("Ignoring unknown form field: {}", other),
        }
    }

    if !has_file {
        return Err(AppError::BadRequest("Missing 'file' field".to_string()));
    }

    Ok(form)
}

/// Validate the upload, then run the blocking pipeline off the async runtime
async fn run_pipeline(
    state: &AppState,
    form: RenderForm,
) -> Result<(ValidatedUpload, PedigreeResponse), AppError> {
    let max_size = state.validator().max_file_size();
    if form.data.len() > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File too large: {} bytes (max: {} bytes)",
            form.data.len(),
            max_size
        )));
    }

    let upload = state
        .validator()
        .validate_upload(&form.file_name, &form.data)
        .map_err(|e| AppError::BadRequest(format!("Invalid pedigree file: {}", e)))?;

    info!(
        "Pedigree file validated: {} ({} bytes, SHA256: {})",
        upload.safe_name,
        upload.size,
        &upload.hash_sha256[..16]
    );

    let processor = PedigreeProcessor::new(state.engine(), state.attributes().clone(), form.format);
    let request = PedigreeRequest {
        upload: form.data,
        individual_id: form.individual_id,
        band_id: form.band_id,
        hatch_year: form.hatch_year,
    };

    let response = tokio::task::spawn_blocking(move || processor.process(&request))
        .await
        .map_err(|e| AppError::Internal(format!("Pedigree processing task failed: {}", e)))?;

    Ok((upload, response))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(format!("Failed to read multipart field: {}", e.body_text()))
    }
}

/// `attachment; filename="..."` with anything outside printable ASCII replaced
fn content_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    PayloadTooLarge(String),
    Unprocessable(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg)),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorResponse::with_details("Upload too large", msg),
            ),
            AppError::Unprocessable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::with_details("No image generated", msg),
            ),
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("A3_pedigree_2000.png"),
            "attachment; filename=\"A3_pedigree_2000.png\""
        );
        assert_eq!(
            content_disposition("band_B 1\"x_pedigree.svg"),
            "attachment; filename=\"band_B_1_x_pedigree.svg\""
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        let cases = [
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::PayloadTooLarge("x".into()), StatusCode::PAYLOAD_TOO_LARGE),
            (AppError::Unprocessable("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
