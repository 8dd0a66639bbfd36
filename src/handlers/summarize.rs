// src/handlers/summarize.rs
use std::sync::Arc;

use log::{error, info, warn};
use regex::Regex;
use serde::Serialize;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::config::AppConfig;
use crate::models::{DocumentLink, FinancialSeries, NewsItem};
use crate::services::quarterly::QuarterlySeries;
use crate::services::{financials, profile, report, search, store};

#[derive(Serialize)]
struct SummarizeResponse {
    summary: String,
    report_file: String,
    official_news: Vec<NewsItem>,
    official_documents: Vec<DocumentLink>,
    financial_data: FinancialSeries,
}

/// warp hands path segments through still percent-encoded; entity names
/// with spaces arrive as "%20" or "+".
pub(crate) fn decode_segment(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                match hex {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Strips everything except word characters, spaces, and hyphens. The same
/// character policy the report filenames rely on.
pub(crate) fn sanitize_entity(raw: &str) -> String {
    let re = Regex::new(r"[^\w\s-]").unwrap();
    re.replace_all(raw, "").trim().to_string()
}

pub async fn summarize(entity: String, cfg: Arc<AppConfig>) -> Result<Json, Rejection> {
    let entity = decode_segment(&entity);
    info!("Handling summarize request for '{}'", entity);

    if entity.trim().chars().count() < 2 {
        return Err(warp::reject::custom(ApiError::validation_error(
            "Entity name too short",
        )));
    }
    let sanitized = sanitize_entity(&entity);
    if sanitized.is_empty() {
        return Err(warp::reject::custom(ApiError::validation_error(
            "Invalid entity name",
        )));
    }

    let summary = profile::fetch_company_profile(&cfg.gemini_api_key, &sanitized)
        .await
        .map_err(|e| {
            error!("Profile fetch failed for '{}': {}", sanitized, e);
            warp::reject::custom(ApiError::external_error(e.to_string()))
        })?;

    // News and documents are additive; a failed search degrades to an empty
    // list rather than failing the summary.
    let news = match search::fetch_news(&cfg.google_search_api_key, &cfg.google_cse_id, &sanitized)
        .await
    {
        Ok(items) => items,
        Err(e) => {
            warn!("News search failed, continuing without: {}", e);
            Vec::new()
        }
    };
    let documents =
        match search::fetch_documents(&cfg.google_search_api_key, &cfg.google_cse_id, &sanitized)
            .await
        {
            Ok(items) => items,
            Err(e) => {
                warn!("Document search failed, continuing without: {}", e);
                Vec::new()
            }
        };

    let fetched = fetch_financials(&cfg, &sanitized).await;

    let mut series = store::load_series(&cfg.data_cache_dir, &sanitized).unwrap_or_else(|e| {
        warn!("Unreadable series cache for '{}', starting fresh: {}", sanitized, e);
        FinancialSeries::new()
    });
    store::merge_series(&mut series, fetched);
    if let Err(e) = store::save_series(&cfg.data_cache_dir, &sanitized, &series) {
        error!("Failed to save series cache for '{}': {}", sanitized, e);
    }

    let latest = match QuarterlySeries::from_raw(&series) {
        Ok(validated) => validated.latest_reported(),
        Err(e) => {
            warn!("Cached series for '{}' failed validation, omitting figures: {}", sanitized, e);
            None
        }
    };

    let content = report::render_report(&sanitized, &summary, latest, &news);
    let report_file = report::write_report(&cfg.summaries_dir, &sanitized, &content)
        .map_err(|e| {
            error!("Failed to write summary report: {}", e);
            warp::reject::custom(ApiError::storage_error("Failed to generate report"))
        })?;

    Ok(warp::reply::json(&SummarizeResponse {
        summary,
        report_file,
        official_news: news,
        official_documents: documents,
        financial_data: series,
    }))
}

/// Symbol lookup plus quarterly statements. Every failure path collapses to
/// an empty series; financial figures are optional in the summary.
async fn fetch_financials(cfg: &AppConfig, entity: &str) -> FinancialSeries {
    let symbol = match financials::search_symbol(&cfg.alphavantage_api_key, entity).await {
        Ok(Some(symbol)) => symbol,
        Ok(None) => {
            info!("No ticker symbol found for '{}'", entity);
            return FinancialSeries::new();
        }
        Err(e) => {
            error!("Symbol lookup failed for '{}': {}", entity, e);
            return FinancialSeries::new();
        }
    };
    match financials::fetch_quarterly_financials(&cfg.alphavantage_api_key, &symbol).await {
        Ok(series) => series,
        Err(e) => {
            error!("Quarterly financials fetch failed for {}: {}", symbol, e);
            FinancialSeries::new()
        }
    }
}
