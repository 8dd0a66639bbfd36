// src/bin/test_financials.rs
use entity_summarizer::config::AppConfig;
use entity_summarizer::services::financials::{fetch_quarterly_financials, search_symbol};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let entity = std::env::args().nth(1).unwrap_or_else(|| "Apple".to_string());
    let cfg = AppConfig::from_env()?;

    let symbol = match search_symbol(&cfg.alphavantage_api_key, &entity).await? {
        Some(symbol) => symbol,
        None => {
            println!("No ticker symbol found for '{}'", entity);
            return Ok(());
        }
    };
    println!("Symbol: {}", symbol);

    let series = fetch_quarterly_financials(&cfg.alphavantage_api_key, &symbol).await?;
    println!("{}", serde_json::to_string_pretty(&series)?);
    Ok(())
}
