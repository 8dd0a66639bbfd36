// src/config.rs
use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

const REQUIRED_ENV_VARS: &[&str] = &[
    "GEMINI_API_KEY",
    "GOOGLE_SEARCH_API_KEY",
    "GOOGLE_CSE_ID",
    "ALPHAVANTAGE_API_KEY",
];

/// Runtime configuration, read once at startup and shared behind an Arc.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub google_search_api_key: String,
    pub google_cse_id: String,
    pub alphavantage_api_key: String,
    pub port: u16,
    pub summaries_dir: PathBuf,
    pub data_cache_dir: PathBuf,
}

impl AppConfig {
    /// Reads configuration from the environment, reporting every missing
    /// required variable in one error.
    pub fn from_env() -> Result<Self> {
        let missing: Vec<&str> = REQUIRED_ENV_VARS
            .iter()
            .copied()
            .filter(|var| env::var(var).map(|v| v.trim().is_empty()).unwrap_or(true))
            .collect();
        if !missing.is_empty() {
            bail!("Missing environment variables: {}", missing.join(", "));
        }

        let port = match env::var("PORT") {
            Ok(value) => value.parse().context("PORT must be a number")?,
            Err(_) => 8000,
        };

        Ok(AppConfig {
            gemini_api_key: env::var("GEMINI_API_KEY")?,
            google_search_api_key: env::var("GOOGLE_SEARCH_API_KEY")?,
            google_cse_id: env::var("GOOGLE_CSE_ID")?,
            alphavantage_api_key: env::var("ALPHAVANTAGE_API_KEY")?,
            port,
            summaries_dir: env::var("SUMMARIES_DIR")
                .unwrap_or_else(|_| "summaries".to_string())
                .into(),
            data_cache_dir: env::var("DATA_CACHE_DIR")
                .unwrap_or_else(|_| "data_cache".to_string())
                .into(),
        })
    }
}
