// src/services/quarterly.rs
//
// Quarterly series math for the financial dashboard: validation of the raw
// year/quarter mapping, completeness of the current year's quarters,
// chronological flattening, previous-quarter comparison across year
// boundaries, and a one-quarter-ahead projection.
use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Utc};
use log::warn;
use serde::Serialize;
use thiserror::Error;

use crate::models::{FinancialSeries, QuarterlyMetric};

/// Divisor floor for percent change against near-zero baselines.
const PCT_DIVISOR_FLOOR: f64 = 0.01;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("invalid quarter label: {0:?}")]
    InvalidQuarter(String),

    #[error("invalid year key: {0:?}")]
    InvalidYear(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: &'static [Quarter] =
        &[Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    pub fn ordinal(self) -> i32 {
        match self {
            Quarter::Q1 => 1,
            Quarter::Q2 => 2,
            Quarter::Q3 => 3,
            Quarter::Q4 => 4,
        }
    }

    /// Parses a canonical "Q1".."Q4" label. Anything else is malformed data,
    /// not a variant to coerce.
    pub fn from_label(label: &str) -> Result<Self, SeriesError> {
        match label {
            "Q1" => Ok(Quarter::Q1),
            "Q2" => Ok(Quarter::Q2),
            "Q3" => Ok(Quarter::Q3),
            "Q4" => Ok(Quarter::Q4),
            other => Err(SeriesError::InvalidQuarter(other.to_string())),
        }
    }

    /// Quarter containing the given calendar month (1-12).
    pub fn from_month(month: u32) -> Option<Self> {
        match month {
            1..=3 => Some(Quarter::Q1),
            4..=6 => Some(Quarter::Q2),
            7..=9 => Some(Quarter::Q3),
            10..=12 => Some(Quarter::Q4),
            _ => None,
        }
    }

    /// The following quarter, with a year carry when wrapping Q4 -> Q1.
    pub fn next(self) -> (Self, bool) {
        match self {
            Quarter::Q1 => (Quarter::Q2, false),
            Quarter::Q2 => (Quarter::Q3, false),
            Quarter::Q3 => (Quarter::Q4, false),
            Quarter::Q4 => (Quarter::Q1, true),
        }
    }

    /// The preceding quarter within the same year; Q1 has none.
    pub fn prev(self) -> Option<Self> {
        match self {
            Quarter::Q1 => None,
            Quarter::Q2 => Some(Quarter::Q1),
            Quarter::Q3 => Some(Quarter::Q2),
            Quarter::Q4 => Some(Quarter::Q3),
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.ordinal())
    }
}

/// The "now" against which completeness is judged. Built from the wall
/// clock only at the request edge so the functions below stay deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportDate {
    pub year: i32,
    pub month: u32,
}

impl ReportDate {
    pub fn today() -> Self {
        let now = Utc::now();
        ReportDate {
            year: now.year(),
            month: now.month(),
        }
    }
}

/// Quarters whose reporting period has fully elapsed as of `today`. Callers
/// apply this only to the year equal to `today.year`; every other year is
/// unrestricted.
pub fn completed_quarters(today: ReportDate) -> &'static [Quarter] {
    if today.month <= 3 {
        &Quarter::ALL[..1]
    } else if today.month <= 6 {
        &Quarter::ALL[..2]
    } else if today.month <= 9 {
        &Quarter::ALL[..3]
    } else {
        Quarter::ALL
    }
}

/// One fully reported quarter, keyed for chronological ordering.
/// `time_key = year * 10 + ordinal` is year-major, quarter-minor, so two
/// keys compare exactly as their periods do in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChronoPoint {
    pub time_key: i32,
    pub year: i32,
    pub quarter: Quarter,
    pub revenue: f64,
    pub profit: f64,
}

/// The data point a selected quarter is compared against, with its display
/// label ("Q4 2023").
#[derive(Debug, Clone, PartialEq)]
pub struct PreviousQuarter {
    pub metric: QuarterlyMetric,
    pub label: String,
}

/// One-quarter-ahead projection from the final two reported quarters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Forecast {
    pub year: i32,
    pub quarter: Quarter,
    pub revenue: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub year: i32,
    pub quarter: Quarter,
}

/// Validated view of a raw series: four-digit years, canonical quarters.
/// Construction is the one place malformed keys are rejected; everything
/// downstream operates on trusted data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuarterlySeries {
    years: BTreeMap<i32, BTreeMap<Quarter, QuarterlyMetric>>,
}

impl QuarterlySeries {
    pub fn from_raw(raw: &FinancialSeries) -> Result<Self, SeriesError> {
        let mut years: BTreeMap<i32, BTreeMap<Quarter, QuarterlyMetric>> = BTreeMap::new();
        for (year_key, quarters) in raw {
            let year: i32 = year_key
                .parse()
                .map_err(|_| SeriesError::InvalidYear(year_key.clone()))?;
            // Fiscal years are four digits; time_key arithmetic relies on it.
            if !(1000..=9999).contains(&year) {
                return Err(SeriesError::InvalidYear(year_key.clone()));
            }
            let entry = years.entry(year).or_default();
            for (label, metric) in quarters {
                entry.insert(Quarter::from_label(label)?, *metric);
            }
        }
        Ok(QuarterlySeries { years })
    }

    pub fn is_empty(&self) -> bool {
        self.years.values().all(|quarters| quarters.is_empty())
    }

    /// Years carrying any data, most recent first.
    pub fn years_desc(&self) -> Vec<i32> {
        self.years
            .iter()
            .filter(|(_, quarters)| !quarters.is_empty())
            .map(|(&year, _)| year)
            .rev()
            .collect()
    }

    pub fn metric(&self, year: i32, quarter: Quarter) -> Option<QuarterlyMetric> {
        self.years.get(&year).and_then(|q| q.get(&quarter)).copied()
    }

    /// Quarters of `year` offered for selection: those present in the data,
    /// restricted to already-completed quarters when `year` is the current
    /// calendar year.
    pub fn selectable_quarters(&self, year: i32, today: ReportDate) -> Vec<Quarter> {
        let quarters = match self.years.get(&year) {
            Some(q) => q,
            None => return Vec::new(),
        };
        let completed = completed_quarters(today);
        quarters
            .keys()
            .copied()
            .filter(|q| year != today.year || completed.contains(q))
            .collect()
    }

    /// Most recent year and its latest selectable quarter. Walks back a year
    /// at a time while the newest year has nothing selectable yet (e.g. a
    /// lone Q4 row cached in February).
    pub fn default_selection(&self, today: ReportDate) -> Option<Selection> {
        for year in self.years_desc() {
            if let Some(&quarter) = self.selectable_quarters(year, today).last() {
                return Some(Selection { year, quarter });
            }
        }
        None
    }

    /// Latest reported quarter overall (max year, max ordinal), regardless
    /// of completeness. Feeds the report header figures.
    pub fn latest_reported(&self) -> Option<(Selection, QuarterlyMetric)> {
        self.years.iter().rev().find_map(|(&year, quarters)| {
            quarters
                .iter()
                .next_back()
                .map(|(&quarter, &metric)| (Selection { year, quarter }, metric))
        })
    }

    /// Flattens every fully reported quarter across all years into one
    /// sequence, strictly ascending by `time_key`. Quarters missing either
    /// figure contribute nothing.
    pub fn normalize(&self) -> Vec<ChronoPoint> {
        let mut points: Vec<ChronoPoint> = Vec::new();
        for (&year, quarters) in &self.years {
            for (&quarter, metric) in quarters {
                let (revenue, profit) = match (metric.revenue, metric.profit) {
                    (Some(revenue), Some(profit)) => (revenue, profit),
                    _ => continue,
                };
                points.push(ChronoPoint {
                    time_key: year * 10 + quarter.ordinal(),
                    year,
                    quarter,
                    revenue,
                    profit,
                });
            }
        }
        points.sort_by_key(|p| p.time_key);
        points
    }

    /// The quarter immediately before (year, quarter): Q2..Q4 look within
    /// the same year, Q1 crosses to the prior year's Q4. None when that
    /// data point does not exist; callers render without a comparison.
    pub fn previous_quarter(&self, year: i32, quarter: Quarter) -> Option<PreviousQuarter> {
        let (prev_year, prev_quarter) = match quarter.prev() {
            Some(q) => (year, q),
            None => (year - 1, Quarter::Q4),
        };
        self.metric(prev_year, prev_quarter)
            .map(|metric| PreviousQuarter {
                metric,
                label: format!("{} {}", prev_quarter, prev_year),
            })
    }
}

/// Projects one quarter past the end of the chronological sequence using
/// the delta between its final two points, wrapping Q4 into Q1 of the next
/// year. None with fewer than two points, which the caller shows as a
/// disabled projection.
pub fn forecast(points: &[ChronoPoint]) -> Option<Forecast> {
    if points.len() < 2 {
        warn!(
            "Insufficient chronological points ({}) for a projection",
            points.len()
        );
        return None;
    }
    let last = points[points.len() - 1];
    let prev = points[points.len() - 2];
    let (quarter, carry) = last.quarter.next();
    let year = if carry { last.year + 1 } else { last.year };
    Some(Forecast {
        year,
        quarter,
        revenue: last.revenue + (last.revenue - prev.revenue),
        profit: last.profit + (last.profit - prev.profit),
    })
}

/// Percent change of `current` against `previous`. An exactly-zero baseline
/// is defined as 0.0; otherwise the divisor is floored at 0.01.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous.max(PCT_DIVISOR_FLOOR) * 100.0
    }
}
