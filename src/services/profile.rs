// src/services/profile.rs
use log::{error, info};
use reqwest::Client;
use serde_json::{json, Value};

use crate::BoxError;

const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

fn build_prompt(entity: &str) -> String {
    format!(
        "Act as a professional analyst and provide a detailed company profile for **{entity}**.\n\
         Include:\n\
         1. Industry Sector\n\
         2. Products or Services\n\
         3. Recent Activities and Developments\n\
         4. Official Website (if available)\n\
         5. Key Financial Information\n\
         6. Leadership Team\n\
         7. Major Clients and Partnerships\n\n\
         Respond in clear markdown format with appropriate sections.\n\
         Don't give extra response at the start like okay here is the summary, etc."
    )
}

/// Concatenated text parts of the first candidate, None when the response
/// carries no usable text.
fn parse_profile(body: &Value) -> Option<String> {
    let parts = body
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Asks the generative-text API for an analyst-style company profile in
/// markdown.
pub async fn fetch_company_profile(api_key: &str, entity: &str) -> Result<String, BoxError> {
    info!("Requesting company profile for '{}'", entity);

    let client = Client::new();
    let body = json!({
        "contents": [{ "parts": [{ "text": build_prompt(entity) }] }]
    });

    let payload: Value = client
        .post(GEMINI_ENDPOINT)
        .query(&[("key", api_key)])
        .json(&body)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    match parse_profile(&payload) {
        Some(text) => Ok(text),
        None => {
            error!("Profile response carried no candidate text for '{}'", entity);
            Err("No profile text returned".into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_profile_concatenates_candidate_parts() {
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "## Acme Corp\n" },
                        { "text": "Industry: widgets." }
                    ]
                }
            }]
        });
        assert_eq!(
            parse_profile(&body).unwrap(),
            "## Acme Corp\nIndustry: widgets."
        );
    }

    #[test]
    fn parse_profile_requires_candidate_text() {
        assert_eq!(parse_profile(&json!({})), None);
        assert_eq!(parse_profile(&json!({ "candidates": [] })), None);
        let blank = json!({
            "candidates": [{ "content": { "parts": [{ "text": "   " }] } }]
        });
        assert_eq!(parse_profile(&blank), None);
    }

    #[test]
    fn prompt_names_the_entity() {
        let prompt = build_prompt("Acme Corp");
        assert!(prompt.contains("**Acme Corp**"));
        assert!(prompt.contains("Leadership Team"));
    }
}
