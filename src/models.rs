// src/models.rs
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;

/// One fiscal quarter's reported figures. Either field may be absent when a
/// source reported only part of the statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyMetric {
    pub revenue: Option<f64>,
    pub profit: Option<f64>,
}

/// Raw quarterly series as fetched and cached: year key ("2024") to quarter
/// label ("Q1".."Q4") to metric. Keys are untrusted until validated.
pub type FinancialSeries = BTreeMap<String, BTreeMap<String, QuarterlyMetric>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLink {
    pub title: String,
    pub link: String,
    /// Four-digit year pulled from the title or link, "Unknown" otherwise.
    pub year: String,
}
