// ==============================================================================
// validator.rs - Upload Validation
// ==============================================================================
// Description: Validates uploaded pedigree files before they are parsed
// Author: Matt Barham
// Created: 2026-10-15
// Modified: 2026-10-19
// Version: 1.0.0
// Security: Allowlist-only file types, size limits, text-only content
// ==============================================================================

use anyhow::Result;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Default maximum upload size
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024; // 10 MB

/// Extensions accepted for pedigree uploads
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["csv", "txt", "ped"];

#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    pub original_name: String,
    pub safe_name: String,
    pub extension: String,
    pub size: usize,
    pub hash_sha256: String,
    pub validated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
}

impl Default for UploadValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadValidator {
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_UPLOAD_SIZE)
    }

    pub fn with_max_size(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate an uploaded pedigree file held in memory
    pub fn validate_upload(&self, filename: &str, data: &[u8]) -> Result<ValidatedUpload> {
        info!("Validating upload: {} ({} bytes)", filename, data.len());

        // 1. Size check (BEFORE any processing)
        let size = data.len();
        if size > self.max_file_size {
            anyhow::bail!(
                "File too large: {} bytes (max: {} bytes)",
                size,
                self.max_file_size
            );
        }
        debug!("Size check passed: {} bytes", size);

        // 2. Filename sanitization
        let safe_name = self.sanitize_filename(filename)?;
        debug!("Sanitized filename: {}", safe_name);

        // 3. Extension check (allowlist)
        let ext = self.get_extension(&safe_name)?;
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            anyhow::bail!("Invalid file type: .{}", ext);
        }
        debug!("Extension check passed: .{}", ext);

        // 4. Content validation
        self.validate_content(data)?;
        debug!("Content validation passed");

        // 5. Compute SHA-256 hash
        let hash = self.compute_sha256(data);
        debug!("SHA-256: {}", hash);

        Ok(ValidatedUpload {
            original_name: filename.to_string(),
            safe_name,
            extension: ext,
            size,
            hash_sha256: hash,
            validated_at: chrono::Utc::now(),
        })
    }

    fn sanitize_filename(&self, name: &str) -> Result<String> {
        // Remove path separators, null bytes, control characters
        let safe = name
            .replace(['/', '\\', '\0'], "_")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '.' || *c == '-')
            .collect::<String>();

        let truncated: String = safe.chars().take(255).collect();

        if truncated.is_empty() {
            anyhow::bail!("Invalid filename after sanitization");
        }
        if truncated.starts_with('.') {
            anyhow::bail!("Filename cannot start with '.'");
        }

        Ok(truncated)
    }

    fn get_extension(&self, filename: &str) -> Result<String> {
        match filename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Ok(ext.to_lowercase()),
            _ => anyhow::bail!("No file extension found"),
        }
    }

    fn validate_content(&self, data: &[u8]) -> Result<()> {
        if data.iter().all(|b| b.is_ascii_whitespace()) {
            anyhow::bail!("File is empty");
        }
        if data.contains(&0) {
            anyhow::bail!("Binary content is not a pedigree CSV");
        }
        if let Err(e) = std::str::from_utf8(data) {
            anyhow::bail!("File is not valid UTF-8 text (byte {})", e.valid_up_to());
        }
        Ok(())
    }

    fn compute_sha256(&self, data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }
}
