// src/services/financials.rs
use log::{info, warn};
use reqwest::Client;
use serde_json::Value;

use crate::models::{FinancialSeries, QuarterlyMetric};
use crate::services::quarterly::Quarter;
use crate::BoxError;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Ticker fallback for household names, checked before the remote lookup.
const KNOWN_SYMBOLS: &[(&str, &str)] = &[
    ("apple", "AAPL"),
    ("microsoft", "MSFT"),
    ("amazon", "AMZN"),
    ("meta", "META"),
    ("facebook", "META"),
    ("alphabet", "GOOGL"),
    ("google", "GOOGL"),
    ("tesla", "TSLA"),
    ("netflix", "NFLX"),
    ("nvidia", "NVDA"),
];

/// Resolves a company name to a ticker symbol. `Ok(None)` when neither the
/// fallback map nor the search API knows the name.
pub async fn search_symbol(api_key: &str, company_name: &str) -> Result<Option<String>, BoxError> {
    let key = company_name.to_lowercase();
    if let Some((_, symbol)) = KNOWN_SYMBOLS.iter().find(|(name, _)| *name == key) {
        return Ok(Some((*symbol).to_string()));
    }

    info!("Looking up ticker symbol for '{}'", company_name);
    let client = Client::new();
    let body: Value = client
        .get(BASE_URL)
        .query(&[
            ("function", "SYMBOL_SEARCH"),
            ("keywords", company_name),
            ("apikey", api_key),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(first_symbol(&body))
}

fn first_symbol(body: &Value) -> Option<String> {
    body.get("bestMatches")?
        .as_array()?
        .first()?
        .get("1. symbol")?
        .as_str()
        .map(str::to_string)
}

/// Quarterly income-statement figures in the raw cache shape. Rows with a
/// malformed fiscal date are skipped.
pub async fn fetch_quarterly_financials(
    api_key: &str,
    symbol: &str,
) -> Result<FinancialSeries, BoxError> {
    info!("Fetching quarterly income statements for {}", symbol);

    let client = Client::new();
    let body: Value = client
        .get(BASE_URL)
        .query(&[
            ("function", "INCOME_STATEMENT"),
            ("symbol", symbol),
            ("apikey", api_key),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(parse_quarterly_reports(&body))
}

fn parse_quarterly_reports(body: &Value) -> FinancialSeries {
    let mut series = FinancialSeries::new();
    let reports = match body.get("quarterlyReports").and_then(Value::as_array) {
        Some(reports) => reports,
        None => return series,
    };

    for report in reports {
        let date = report
            .get("fiscalDateEnding")
            .and_then(Value::as_str)
            .unwrap_or("");
        let (year, quarter) = match parse_fiscal_date(date) {
            Some(parsed) => parsed,
            None => {
                warn!("Skipping report with bad fiscalDateEnding {:?}", date);
                continue;
            }
        };
        series.entry(year).or_default().insert(
            quarter.to_string(),
            QuarterlyMetric {
                revenue: parse_figure(report, "totalRevenue"),
                profit: parse_figure(report, "netIncome"),
            },
        );
    }
    series
}

/// "YYYY-MM-DD" to (year key, quarter). A year outside the four-digit
/// domain is malformed, same as an unparseable one.
fn parse_fiscal_date(date: &str) -> Option<(String, Quarter)> {
    let mut parts = date.split('-');
    let year: i32 = parts.next()?.parse().ok()?;
    if !(1000..=9999).contains(&year) {
        return None;
    }
    let month: u32 = parts.next()?.parse().ok()?;
    Some((year.to_string(), Quarter::from_month(month)?))
}

/// A reported figure, or None when the field is absent, unparseable, or the
/// provider's literal "None" placeholder.
fn parse_figure(report: &Value, field: &str) -> Option<f64> {
    match report.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_symbols_cover_the_fallback_names() {
        assert!(KNOWN_SYMBOLS.iter().any(|&(name, sym)| name == "apple" && sym == "AAPL"));
        assert!(KNOWN_SYMBOLS.iter().any(|&(name, sym)| name == "facebook" && sym == "META"));
    }

    #[test]
    fn first_symbol_reads_the_best_match() {
        let body = json!({
            "bestMatches": [
                { "1. symbol": "IBM", "2. name": "International Business Machines" },
                { "1. symbol": "IBMJ" }
            ]
        });
        assert_eq!(first_symbol(&body), Some("IBM".to_string()));
        assert_eq!(first_symbol(&json!({ "bestMatches": [] })), None);
        assert_eq!(first_symbol(&json!({})), None);
    }

    #[test]
    fn parse_fiscal_date_maps_month_to_quarter() {
        let (year, quarter) = parse_fiscal_date("2024-05-31").unwrap();
        assert_eq!(year, "2024");
        assert_eq!(quarter, Quarter::Q2);
        assert_eq!(parse_fiscal_date("2023-12-31").unwrap().1, Quarter::Q4);
        assert_eq!(parse_fiscal_date("garbage"), None);
        assert_eq!(parse_fiscal_date("2024"), None);
        assert_eq!(parse_fiscal_date("2024-13-01"), None);
    }

    #[test]
    fn parse_fiscal_date_requires_a_four_digit_year() {
        assert_eq!(parse_fiscal_date("300000000-05-31"), None);
        assert_eq!(parse_fiscal_date("999-12-31"), None);
    }

    #[test]
    fn parse_figure_keeps_missing_values_absent() {
        let report = json!({
            "totalRevenue": "119575000000",
            "netIncome": "None",
            "ebit": 42.5
        });
        assert_eq!(parse_figure(&report, "totalRevenue"), Some(119_575_000_000.0));
        assert_eq!(parse_figure(&report, "netIncome"), None);
        assert_eq!(parse_figure(&report, "ebit"), Some(42.5));
        assert_eq!(parse_figure(&report, "grossProfit"), None);
    }

    #[test]
    fn parse_quarterly_reports_builds_the_series_shape() {
        let body = json!({
            "quarterlyReports": [
                {
                    "fiscalDateEnding": "2024-09-30",
                    "totalRevenue": "100",
                    "netIncome": "10"
                },
                {
                    "fiscalDateEnding": "2024-06-30",
                    "totalRevenue": "90",
                    "netIncome": "None"
                },
                {
                    "fiscalDateEnding": "not-a-date",
                    "totalRevenue": "1",
                    "netIncome": "1"
                }
            ]
        });
        let series = parse_quarterly_reports(&body);
        assert_eq!(series.len(), 1);
        let year = &series["2024"];
        assert_eq!(year["Q3"].revenue, Some(100.0));
        assert_eq!(year["Q2"].profit, None);
        assert!(!year.contains_key("Q1"));
    }

    #[test]
    fn parse_quarterly_reports_without_reports_is_empty() {
        assert!(parse_quarterly_reports(&json!({})).is_empty());
    }
}
