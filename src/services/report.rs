// src/services/report.rs
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::info;

use crate::models::{NewsItem, QuarterlyMetric};
use crate::services::quarterly::Selection;
use crate::BoxError;

const WRAP_COLUMNS: usize = 100;

/// Greedy word wrap counting characters, not bytes. Lines stay under
/// `width` unless a single word is longer than that.
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut wrapped = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for word in line.split_whitespace() {
        let joined_len: usize = current.iter().map(|w| w.chars().count()).sum::<usize>()
            + current.len()
            + word.chars().count();
        if joined_len < width {
            current.push(word);
        } else {
            wrapped.push(current.join(" "));
            current = vec![word];
        }
    }
    if !current.is_empty() {
        wrapped.push(current.join(" "));
    }
    wrapped
}

fn format_figure(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    }
}

/// Renders the plain-text summary document: title, wrapped profile body,
/// latest quarterly figures when available, then the news links.
pub fn render_report(
    entity: &str,
    profile: &str,
    latest: Option<(Selection, QuarterlyMetric)>,
    news: &[NewsItem],
) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("Summary of {}", entity));
    lines.push(String::new());

    for line in profile.lines() {
        if line.trim().is_empty() {
            continue;
        }
        lines.extend(wrap_line(line, WRAP_COLUMNS));
    }

    if let Some((selection, metric)) = latest {
        lines.push(String::new());
        lines.push(format!(
            "Latest Quarterly Figures ({} {}):",
            selection.quarter, selection.year
        ));
        lines.push(format!("  Revenue: {}", format_figure(metric.revenue)));
        lines.push(format!("  Profit:  {}", format_figure(metric.profit)));
    }

    if !news.is_empty() {
        lines.push(String::new());
        lines.push("Official News:".to_string());
        for item in news {
            lines.extend(wrap_line(&format!("- {}", item.title), WRAP_COLUMNS));
            lines.extend(wrap_line(&format!("  {}", item.link), WRAP_COLUMNS));
        }
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Persists the rendered document under the summaries directory as
/// `{Entity}_summary_{YYYYMMDD}.txt` and returns the filename.
pub fn write_report(dir: &Path, entity: &str, content: &str) -> Result<String, BoxError> {
    fs::create_dir_all(dir)?;
    let stamp = Utc::now().format("%Y%m%d");
    let filename = format!("{}_summary_{}.txt", entity.replace(' ', "_"), stamp);
    let path = dir.join(&filename);
    fs::write(&path, content)?;
    info!("Wrote summary report {}", path.display());
    Ok(filename)
}

/// Most recent report file for the entity. Date stamps in the filename sort
/// lexicographically, so the greatest name is the newest.
pub fn latest_report(dir: &Path, entity: &str) -> Option<PathBuf> {
    let prefix = format!("{}_summary_", entity.replace(' ', "_"));
    let latest = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(&prefix) && name.ends_with(".txt"))
        .max()?;
    Some(dir.join(latest))
}
