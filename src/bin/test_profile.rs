// src/bin/test_profile.rs
use entity_summarizer::config::AppConfig;
use entity_summarizer::services::profile::fetch_company_profile;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let entity = std::env::args().nth(1).unwrap_or_else(|| "Apple".to_string());
    let cfg = AppConfig::from_env()?;

    let profile = fetch_company_profile(&cfg.gemini_api_key, &entity).await?;
    println!("{}", profile);
    Ok(())
}
