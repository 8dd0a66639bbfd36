// src/bin/show_dashboard.rs
use std::path::PathBuf;

use entity_summarizer::services::quarterly::{self, QuarterlySeries, ReportDate};
use entity_summarizer::services::store;

fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let entity = match std::env::args().nth(1) {
        Some(entity) => entity,
        None => {
            eprintln!("usage: show_dashboard <entity>");
            std::process::exit(2);
        }
    };
    let dir: PathBuf = std::env::var("DATA_CACHE_DIR")
        .unwrap_or_else(|_| "data_cache".to_string())
        .into();

    let raw = store::load_series(&dir, &entity)?;
    let series = QuarterlySeries::from_raw(&raw)?;
    if series.is_empty() {
        println!("No cached financial data for '{}'", entity);
        return Ok(());
    }

    let today = ReportDate::today();
    println!("Years: {:?}", series.years_desc());

    if let Some(selection) = series.default_selection(today) {
        println!("Default selection: {} {}", selection.quarter, selection.year);
        if let Some(metric) = series.metric(selection.year, selection.quarter) {
            println!("  revenue: {:?}  profit: {:?}", metric.revenue, metric.profit);
        }
        match series.previous_quarter(selection.year, selection.quarter) {
            Some(prev) => println!(
                "Compared against {}: revenue {:?}, profit {:?}",
                prev.label, prev.metric.revenue, prev.metric.profit
            ),
            None => println!("No previous quarter to compare against"),
        }
    }

    let points = series.normalize();
    println!("\nChronological points:");
    for p in &points {
        println!(
            "  {} {}  revenue {:>16.2}  profit {:>16.2}",
            p.quarter, p.year, p.revenue, p.profit
        );
    }

    match quarterly::forecast(&points) {
        Some(f) => println!(
            "\nProjected {} {}: revenue {:.2}, profit {:.2}",
            f.quarter, f.year, f.revenue, f.profit
        ),
        None => println!("\nNot enough data for a projection"),
    }
    Ok(())
}
