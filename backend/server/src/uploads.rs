//! # Uploads
//!
//! Files posted as the multipart field `file` are written to the uploads directory and served
//! back statically under `/uploads`.
//!
//! ## Naming
//! - `{unix millis}-{random below 1e9}-{sanitized original name}`
//! - The original name loses any path components and anything outside `[A-Za-z0-9._-]`
//! - Whitespace runs become a single `-`
//! - Leading dots are dropped, an empty result becomes `file`
use std::sync::LazyLock;

use axum::extract::Multipart;
use chrono::Utc;
use rand::Rng;
use regex::Regex;
use serde::Serialize;
use tokio::fs;
use tracing::{debug, info};

use crate::{config::Config, error::AppError};

pub const FILE_FIELD: &str = "file";

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid regex"));

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub image_url: String,
    pub filename: String,
    pub path: String,
}

/// Stores the first file found in the `file` field.
pub async fn store_upload(
    config: &Config,
    mut multipart: Multipart,
) -> Result<UploadResponse, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }

        let Some(original_name) = field.file_name().map(str::to_string) else {
            debug!("Field {FILE_FIELD} carries no file, ignoring");
            continue;
        };

        let bytes = field.bytes().await?;
        let filename = unique_filename(&original_name);
        let path = config.uploads_dir.join(&filename);

        fs::create_dir_all(&config.uploads_dir).await?;
        fs::write(&path, &bytes).await?;

        info!("Stored upload {filename} ({} bytes)", bytes.len());

        return Ok(UploadResponse {
            message: "File uploaded successfully!".to_string(),
            image_url: config.upload_url(&filename),
            filename,
            path: path.display().to_string(),
        });
    }

    Err(AppError::MissingFile)
}

pub fn unique_filename(original_name: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);

    format!(
        "{}-{suffix}-{}",
        Utc::now().timestamp_millis(),
        sanitize_filename(original_name)
    )
}

pub fn sanitize_filename(input: &str) -> String {
    let base = input.rsplit(['/', '\\']).next().unwrap_or_default();

    let s = WHITESPACE.replace_all(base.trim(), "-");
    let s = DISALLOWED.replace_all(&s, "");
    let s = s.trim_start_matches('.');

    if s.is_empty() {
        "file".to_string()
    } else {
        s.to_string()
    }
}
