// ==============================================================================
// models.rs - API Data Models
// ==============================================================================
// Description: Request/response models for the pedigree API
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use chrono::{DateTime, Utc};
use pedigree_grapher::focus::Notice;
use pedigree_grapher::output::{OutputFormat, TableRow};
use pedigree_grapher::validator::ValidatedUpload;
use serde::Serialize;
use uuid::Uuid;

/// Multipart form contents for a render or download request
#[derive(Debug, Default)]
pub struct RenderForm {
    pub file_name: String,
    pub data: Vec<u8>,
    pub individual_id: String,
    pub band_id: String,
    pub hatch_year: String,
    pub format: OutputFormat,
}

/// Render response: full table, notices and the image (base64)
#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub request_id: Uuid,
    pub upload: UploadInfo,
    pub rows: Vec<TableRow>,
    pub focus: Option<String>,
    pub hatch_year: Option<String>,
    pub file_name: String,
    pub notices: Vec<Notice>,
    pub image: Option<ImagePayload>,
}

/// What the validator learned about the uploaded file
#[derive(Debug, Serialize)]
pub struct UploadInfo {
    pub file_name: String,
    pub size: usize,
    pub sha256: String,
    pub received_at: DateTime<Utc>,
}

impl From<&ValidatedUpload> for UploadInfo {
    fn from(upload: &ValidatedUpload) -> Self {
        Self {
            file_name: upload.safe_name.clone(),
            size: upload.size,
            sha256: upload.hash_sha256.clone(),
            received_at: upload.validated_at,
        }
    }
}

/// Rendered image embedded in JSON
#[derive(Debug, Serialize)]
pub struct ImagePayload {
    pub format: OutputFormat,
    pub mime_type: &'static str,
    pub data_base64: String,
}

/// API information response
#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<&'static str>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub layout_engine: bool,
    pub timestamp: DateTime<Utc>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}
