//! Gemini review summarization client
//!
//! Builds a one-sentence summary of a module's reviews. Review texts are
//! joined with a separator character inside the prompt, and the prompt
//! itself covers the no-reviews case so the model answers with a waiting
//! message instead of inventing opinions.

use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const REVIEW_SEPARATOR: char = '@';
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Summarizer client errors
#[derive(Debug, Error)]
pub enum SummarizerError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Model returned no usable text")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: String,
}

/// Gemini generateContent client
pub struct SummarizerClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl SummarizerClient {
    pub fn new(api_key: String, model: String) -> Result<Self, SummarizerError> {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), api_key, model)
    }

    pub fn with_base_url(
        base_url: String,
        api_key: String,
        model: String,
    ) -> Result<Self, SummarizerError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SummarizerError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        })
    }

    /// Summarize review texts into a single sentence
    pub async fn summarize_reviews(&self, review_texts: &[String]) -> Result<String, SummarizerError> {
        let prompt = build_prompt(review_texts);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        tracing::debug!(model = %self.model, reviews = review_texts.len(), "Requesting review summary");

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await
            .map_err(|e| SummarizerError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SummarizerError::InvalidApiKey);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizerError::Api(status.as_u16(), body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| SummarizerError::Parse(e.to_string()))?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(SummarizerError::Empty);
        }

        tracing::info!(chars = text.len(), "Review summary generated");
        Ok(text)
    }
}

fn build_prompt(review_texts: &[String]) -> String {
    let joined = review_texts.join(&REVIEW_SEPARATOR.to_string());
    format!(
        "Based on the following table-top rpg module reviews, \
         where each review is separated by a '{REVIEW_SEPARATOR}' character, \
         create a one-sentence summary of what people think of the modules. \n\n\
         Here are the reviews: {joined}. \n\n\
         If there are no reviews are available to summarize then just say \"waiting for a review...\""
    )
}
