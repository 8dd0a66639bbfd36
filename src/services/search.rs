// src/services/search.rs
use std::time::Duration;

use log::info;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;

use crate::models::{DocumentLink, NewsItem};
use crate::BoxError;

const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
const DOCUMENT_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_DOCUMENTS: usize = 5;

fn parse_news(body: &Value) -> Vec<NewsItem> {
    let items = match body.get("items").and_then(Value::as_array) {
        Some(items) => items,
        None => return Vec::new(),
    };
    items
        .iter()
        .filter_map(|item| {
            Some(NewsItem {
                title: item.get("title")?.as_str()?.to_string(),
                link: item.get("link")?.as_str()?.to_string(),
            })
        })
        .collect()
}

/// Maps search results to document links with a best-effort year, newest
/// years first (unknown years sort last), capped at `MAX_DOCUMENTS`.
fn parse_documents(body: &Value) -> Result<Vec<DocumentLink>, BoxError> {
    let year_re = Regex::new(r"(20\d{2})")?;
    let items = match body.get("items").and_then(Value::as_array) {
        Some(items) => items,
        None => return Ok(Vec::new()),
    };

    let mut docs: Vec<DocumentLink> = items
        .iter()
        .map(|item| {
            let title = item
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or("Untitled Document")
                .to_string();
            let link = item
                .get("link")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            let year = year_re
                .find(&title)
                .or_else(|| year_re.find(&link))
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            DocumentLink { title, link, year }
        })
        .collect();

    docs.sort_by_key(|doc| std::cmp::Reverse(doc.year.parse::<i32>().unwrap_or(0)));
    docs.truncate(MAX_DOCUMENTS);
    Ok(docs)
}

/// Recent news coverage for the entity, at most ten items.
pub async fn fetch_news(
    api_key: &str,
    cse_id: &str,
    entity: &str,
) -> Result<Vec<NewsItem>, BoxError> {
    let query = format!("{entity} latest legal news and issues");
    info!("Searching news: {}", query);

    let client = Client::new();
    let body: Value = client
        .get(SEARCH_ENDPOINT)
        .query(&[
            ("q", query.as_str()),
            ("key", api_key),
            ("cx", cse_id),
            ("num", "10"),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(parse_news(&body))
}

/// Official annual/financial report documents published as PDF.
pub async fn fetch_documents(
    api_key: &str,
    cse_id: &str,
    entity: &str,
) -> Result<Vec<DocumentLink>, BoxError> {
    let query = format!("{entity} (\"annual report\" OR \"financial report\") filetype:pdf");
    info!("Searching documents: {}", query);

    let client = Client::builder().timeout(DOCUMENT_TIMEOUT).build()?;
    let body: Value = client
        .get(SEARCH_ENDPOINT)
        .query(&[
            ("q", query.as_str()),
            ("key", api_key),
            ("cx", cse_id),
            ("num", "10"),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    parse_documents(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_news_skips_items_missing_fields() {
        let body = json!({
            "items": [
                { "title": "Acme wins case", "link": "https://example.com/a" },
                { "title": "No link here" },
                { "link": "https://example.com/b" }
            ]
        });
        let news = parse_news(&body);
        assert_eq!(news.len(), 1);
        assert_eq!(news[0].title, "Acme wins case");
    }

    #[test]
    fn parse_news_without_items_is_empty() {
        assert!(parse_news(&json!({})).is_empty());
    }

    #[test]
    fn parse_documents_extracts_year_from_title_then_link() {
        let body = json!({
            "items": [
                { "title": "Annual Report 2023", "link": "https://example.com/r.pdf" },
                { "title": "Annual Report", "link": "https://example.com/2021/r.pdf" },
                { "title": "Financial Report", "link": "https://example.com/r.pdf" }
            ]
        });
        let docs = parse_documents(&body).unwrap();
        assert_eq!(docs[0].year, "2023");
        assert_eq!(docs[1].year, "2021");
        assert_eq!(docs[2].year, "Unknown");
    }

    #[test]
    fn parse_documents_sorts_newest_first_and_caps_at_five() {
        let items: Vec<Value> = (2019..=2025)
            .map(|year| {
                json!({
                    "title": format!("Report {year}"),
                    "link": "https://example.com/r.pdf"
                })
            })
            .collect();
        let docs = parse_documents(&json!({ "items": items })).unwrap();
        assert_eq!(docs.len(), 5);
        assert_eq!(docs[0].year, "2025");
        assert_eq!(docs[4].year, "2021");
    }
}
