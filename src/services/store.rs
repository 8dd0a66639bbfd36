// src/services/store.rs
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::models::FinancialSeries;

fn series_path(dir: &Path, entity: &str) -> PathBuf {
    let name = format!("{}_financials.json", entity.replace(' ', "_").to_lowercase());
    dir.join(name)
}

/// Loads the cached series for an entity, or an empty one when no cache
/// exists yet.
pub fn load_series(dir: &Path, entity: &str) -> Result<FinancialSeries> {
    let path = series_path(dir, entity);
    if !path.exists() {
        return Ok(FinancialSeries::new());
    }
    let raw = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let series =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(series)
}

/// Writes the series cache, creating the directory on first use. The file
/// is replaced by renaming a finished temporary so a concurrent reader
/// never sees a half-written cache.
pub fn save_series(dir: &Path, entity: &str, series: &FinancialSeries) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = series_path(dir, entity);
    let tmp = path.with_extension("json.tmp");
    let body = serde_json::to_string_pretty(series)?;
    fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, &path).with_context(|| format!("replacing {}", path.display()))?;
    info!("Saved financial series cache {}", path.display());
    Ok(())
}

/// Overlays `update` onto `existing` year by year. Updated quarters replace
/// same-labeled ones; years the update no longer mentions are kept.
pub fn merge_series(existing: &mut FinancialSeries, update: FinancialSeries) {
    for (year, quarters) in update {
        existing.entry(year).or_default().extend(quarters);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuarterlyMetric;

    fn one_quarter(year: &str, quarter: &str, revenue: f64) -> FinancialSeries {
        let mut series = FinancialSeries::new();
        series.entry(year.to_string()).or_default().insert(
            quarter.to_string(),
            QuarterlyMetric { revenue: Some(revenue), profit: Some(1.0) },
        );
        series
    }

    #[test]
    fn merge_keeps_years_absent_from_the_update() {
        let mut existing = one_quarter("2022", "Q4", 50.0);
        merge_series(&mut existing, one_quarter("2024", "Q1", 80.0));
        assert!(existing.contains_key("2022"));
        assert!(existing.contains_key("2024"));
    }

    #[test]
    fn merge_replaces_same_labeled_quarters() {
        let mut existing = one_quarter("2024", "Q1", 80.0);
        merge_series(&mut existing, one_quarter("2024", "Q1", 85.0));
        assert_eq!(existing["2024"]["Q1"].revenue, Some(85.0));

        merge_series(&mut existing, one_quarter("2024", "Q2", 90.0));
        assert_eq!(existing["2024"].len(), 2);
    }

    #[test]
    fn load_missing_cache_is_empty() {
        let dir = std::env::temp_dir().join(format!("store_test_none_{}", std::process::id()));
        assert!(load_series(&dir, "Nobody").unwrap().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = std::env::temp_dir().join(format!("store_test_{}", std::process::id()));
        let series = one_quarter("2024", "Q1", 80.0);
        save_series(&dir, "Acme Corp", &series).unwrap();
        let loaded = load_series(&dir, "Acme Corp").unwrap();
        assert_eq!(loaded["2024"]["Q1"].revenue, Some(80.0));
        assert!(dir.join("acme_corp_financials.json").exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn save_replaces_the_cache_without_leftover_temp_files() {
        let dir = std::env::temp_dir().join(format!("store_test_replace_{}", std::process::id()));
        save_series(&dir, "Acme Corp", &one_quarter("2024", "Q1", 80.0)).unwrap();
        save_series(&dir, "Acme Corp", &one_quarter("2024", "Q2", 90.0)).unwrap();

        let loaded = load_series(&dir, "Acme Corp").unwrap();
        assert_eq!(loaded["2024"]["Q2"].revenue, Some(90.0));

        let names: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        assert_eq!(names, vec!["acme_corp_financials.json"]);
        fs::remove_dir_all(&dir).ok();
    }
}
