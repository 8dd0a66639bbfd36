// src/handlers/dashboard.rs
use std::sync::Arc;

use log::{error, info};
use serde::{Deserialize, Serialize};
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use super::summarize::{decode_segment, sanitize_entity};
use crate::config::AppConfig;
use crate::models::QuarterlyMetric;
use crate::services::quarterly::{
    self, ChronoPoint, Forecast, Quarter, QuarterlySeries, ReportDate, Selection,
};
use crate::services::store;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub year: Option<i32>,
    pub quarter: Option<String>,
}

#[derive(Serialize)]
struct ComparisonPayload {
    label: String,
    previous: QuarterlyMetric,
    revenue_change_pct: Option<f64>,
    profit_change_pct: Option<f64>,
}

#[derive(Serialize)]
struct TrendPoint {
    label: String,
    revenue: f64,
    profit: f64,
    projected: bool,
}

#[derive(Serialize)]
struct DashboardResponse {
    entity: String,
    years: Vec<i32>,
    selection: Selection,
    selectable_quarters: Vec<Quarter>,
    metrics: QuarterlyMetric,
    comparison: Option<ComparisonPayload>,
    trend: Vec<TrendPoint>,
    forecast: Option<Forecast>,
}

/// Applies the year/quarter query parameters on top of the default
/// selection rules. A quarter without a year is ignored.
fn resolve_selection(
    series: &QuarterlySeries,
    query: &DashboardQuery,
    today: ReportDate,
) -> Result<Selection, ApiError> {
    let year = match query.year {
        Some(year) => year,
        None => {
            return series
                .default_selection(today)
                .ok_or_else(|| ApiError::not_found("No financial data available"));
        }
    };

    let selectable = series.selectable_quarters(year, today);
    let latest = match selectable.last() {
        Some(&quarter) => quarter,
        None => {
            return Err(ApiError::validation_error(format!(
                "No selectable quarters for {}",
                year
            )))
        }
    };

    match &query.quarter {
        None => Ok(Selection { year, quarter: latest }),
        Some(label) => {
            let quarter = Quarter::from_label(label)
                .map_err(|e| ApiError::validation_error(e.to_string()))?;
            if !selectable.contains(&quarter) {
                return Err(ApiError::validation_error(format!(
                    "{} {} is not available",
                    quarter, year
                )));
            }
            Ok(Selection { year, quarter })
        }
    }
}

fn change_pct(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    match (current, previous) {
        (Some(current), Some(previous)) => Some(quarterly::percent_change(current, previous)),
        _ => None,
    }
}

/// The last four reported quarters plus the projected one, oldest first.
fn build_trend(points: &[ChronoPoint], projection: Option<Forecast>) -> Vec<TrendPoint> {
    let tail = &points[points.len().saturating_sub(4)..];
    let mut trend: Vec<TrendPoint> = tail
        .iter()
        .map(|p| TrendPoint {
            label: format!("{} {}", p.quarter, p.year),
            revenue: p.revenue,
            profit: p.profit,
            projected: false,
        })
        .collect();
    if let Some(f) = projection {
        trend.push(TrendPoint {
            label: format!("{} {}", f.quarter, f.year),
            revenue: f.revenue,
            profit: f.profit,
            projected: true,
        });
    }
    trend
}

pub async fn dashboard(
    entity: String,
    query: DashboardQuery,
    cfg: Arc<AppConfig>,
) -> Result<Json, Rejection> {
    let entity = decode_segment(&entity);
    let sanitized = sanitize_entity(&entity);
    info!(
        "Handling dashboard request for '{}' (year={:?}, quarter={:?})",
        sanitized, query.year, query.quarter
    );

    let raw = store::load_series(&cfg.data_cache_dir, &sanitized).map_err(|e| {
        error!("Failed to read series cache for '{}': {}", sanitized, e);
        warp::reject::custom(ApiError::storage_error(
            "Failed to read cached financial data",
        ))
    })?;

    let series = QuarterlySeries::from_raw(&raw).map_err(|e| {
        error!("Cached series for '{}' failed validation: {}", sanitized, e);
        warp::reject::custom(ApiError::storage_error(e.to_string()))
    })?;
    if series.is_empty() {
        return Err(warp::reject::custom(ApiError::not_found(
            "No financial data available",
        )));
    }

    let today = ReportDate::today();
    let selection =
        resolve_selection(&series, &query, today).map_err(warp::reject::custom)?;

    let metrics = series
        .metric(selection.year, selection.quarter)
        .unwrap_or_default();

    let comparison = series
        .previous_quarter(selection.year, selection.quarter)
        .map(|prev| ComparisonPayload {
            revenue_change_pct: change_pct(metrics.revenue, prev.metric.revenue),
            profit_change_pct: change_pct(metrics.profit, prev.metric.profit),
            label: prev.label,
            previous: prev.metric,
        });

    let points = series.normalize();
    let projection = quarterly::forecast(&points);
    let trend = build_trend(&points, projection);

    Ok(warp::reply::json(&DashboardResponse {
        entity: sanitized,
        years: series.years_desc(),
        selectable_quarters: series.selectable_quarters(selection.year, today),
        selection,
        metrics,
        comparison,
        trend,
        forecast: projection,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FinancialSeries;

    fn series(entries: &[(&str, &str, f64, f64)]) -> QuarterlySeries {
        let mut raw = FinancialSeries::new();
        for &(year, quarter, revenue, profit) in entries {
            raw.entry(year.to_string()).or_default().insert(
                quarter.to_string(),
                QuarterlyMetric { revenue: Some(revenue), profit: Some(profit) },
            );
        }
        QuarterlySeries::from_raw(&raw).unwrap()
    }

    const MAY_2025: ReportDate = ReportDate { year: 2025, month: 5 };

    fn query(year: Option<i32>, quarter: Option<&str>) -> DashboardQuery {
        DashboardQuery { year, quarter: quarter.map(str::to_string) }
    }

    #[test]
    fn resolve_selection_defaults_to_latest_completed() {
        let series = series(&[
            ("2024", "Q4", 100.0, 10.0),
            ("2025", "Q1", 110.0, 11.0),
            ("2025", "Q2", 120.0, 12.0),
        ]);
        let selection = resolve_selection(&series, &query(None, None), MAY_2025).unwrap();
        assert_eq!(selection, Selection { year: 2025, quarter: Quarter::Q2 });
    }

    #[test]
    fn resolve_selection_honors_explicit_parameters() {
        let series = series(&[
            ("2024", "Q3", 90.0, 9.0),
            ("2024", "Q4", 100.0, 10.0),
        ]);
        let selection =
            resolve_selection(&series, &query(Some(2024), Some("Q3")), MAY_2025).unwrap();
        assert_eq!(selection.quarter, Quarter::Q3);

        // Year alone picks that year's latest quarter.
        let selection = resolve_selection(&series, &query(Some(2024), None), MAY_2025).unwrap();
        assert_eq!(selection.quarter, Quarter::Q4);
    }

    #[test]
    fn resolve_selection_rejects_unknown_years_and_quarters() {
        let series = series(&[("2024", "Q4", 100.0, 10.0)]);

        let err = resolve_selection(&series, &query(Some(2019), None), MAY_2025).unwrap_err();
        assert_eq!(err.kind, crate::handlers::error::ErrorKind::Validation);

        let err =
            resolve_selection(&series, &query(Some(2024), Some("Q2")), MAY_2025).unwrap_err();
        assert_eq!(err.kind, crate::handlers::error::ErrorKind::Validation);

        let err =
            resolve_selection(&series, &query(Some(2024), Some("Q9")), MAY_2025).unwrap_err();
        assert_eq!(err.kind, crate::handlers::error::ErrorKind::Validation);
    }

    #[test]
    fn resolve_selection_filters_incomplete_current_year_quarters() {
        let series = series(&[
            ("2025", "Q1", 110.0, 11.0),
            ("2025", "Q3", 130.0, 13.0),
        ]);
        let err =
            resolve_selection(&series, &query(Some(2025), Some("Q3")), MAY_2025).unwrap_err();
        assert_eq!(err.kind, crate::handlers::error::ErrorKind::Validation);
    }

    #[test]
    fn change_pct_is_null_when_either_side_is_absent() {
        assert_eq!(change_pct(Some(110.0), Some(100.0)), Some(10.0));
        assert_eq!(change_pct(None, Some(100.0)), None);
        assert_eq!(change_pct(Some(110.0), None), None);
        assert_eq!(change_pct(Some(110.0), Some(0.0)), Some(0.0));
    }

    #[test]
    fn build_trend_keeps_last_four_and_flags_the_projection() {
        let series = series(&[
            ("2024", "Q1", 10.0, 1.0),
            ("2024", "Q2", 20.0, 2.0),
            ("2024", "Q3", 30.0, 3.0),
            ("2024", "Q4", 40.0, 4.0),
            ("2025", "Q1", 50.0, 5.0),
        ]);
        let points = series.normalize();
        let trend = build_trend(&points, quarterly::forecast(&points));

        assert_eq!(trend.len(), 5);
        assert_eq!(trend[0].label, "Q2 2024");
        assert!(!trend[0].projected);
        assert_eq!(trend[4].label, "Q2 2025");
        assert!(trend[4].projected);
        assert_eq!(trend[4].revenue, 60.0);
    }

    #[test]
    fn build_trend_without_projection_has_no_flagged_point() {
        let series = series(&[("2024", "Q1", 10.0, 1.0)]);
        let points = series.normalize();
        let trend = build_trend(&points, quarterly::forecast(&points));
        assert_eq!(trend.len(), 1);
        assert!(trend.iter().all(|p| !p.projected));
    }
}
