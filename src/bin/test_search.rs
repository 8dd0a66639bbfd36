// src/bin/test_search.rs
use entity_summarizer::config::AppConfig;
use entity_summarizer::services::search::{fetch_documents, fetch_news};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let entity = std::env::args().nth(1).unwrap_or_else(|| "Apple".to_string());
    let cfg = AppConfig::from_env()?;

    let news = fetch_news(&cfg.google_search_api_key, &cfg.google_cse_id, &entity).await?;
    println!("News ({}):", news.len());
    for item in &news {
        println!("- {}", item.title);
        println!("  {}", item.link);
    }

    let documents =
        fetch_documents(&cfg.google_search_api_key, &cfg.google_cse_id, &entity).await?;
    println!("\nDocuments ({}):", documents.len());
    for doc in &documents {
        println!("- [{}] {}", doc.year, doc.title);
        println!("  {}", doc.link);
    }
    Ok(())
}
