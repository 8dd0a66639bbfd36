// src/handlers/download.rs
use std::sync::Arc;

use log::{error, info};
use warp::http::Response;
use warp::{Rejection, Reply};

use super::error::ApiError;
use super::summarize::{decode_segment, sanitize_entity};
use crate::config::AppConfig;
use crate::services::report;

pub async fn download(entity: String, cfg: Arc<AppConfig>) -> Result<impl Reply, Rejection> {
    let entity = decode_segment(&entity);
    let sanitized = sanitize_entity(&entity).replace(' ', "_");
    info!("Handling download request for '{}'", sanitized);

    let path = match report::latest_report(&cfg.summaries_dir, &sanitized) {
        Some(path) => path,
        None => {
            return Err(warp::reject::custom(ApiError::not_found(
                "Summary not found",
            )))
        }
    };

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        error!("Failed to read report {}: {}", path.display(), e);
        warp::reject::custom(ApiError::storage_error("Failed to read report"))
    })?;

    let response = Response::builder()
        .header("content-type", "text/plain; charset=utf-8")
        .header(
            "content-disposition",
            format!("attachment; filename=\"{}_summary.txt\"", sanitized),
        )
        .body(bytes)
        .map_err(|e| {
            error!("Failed to build download response: {}", e);
            warp::reject::custom(ApiError::storage_error("Failed to build response"))
        })?;

    Ok(response)
}
