//! Google Gemini backed pagination oracle.
//!
//! Requires `GEMINI_API_KEY` (see [`OracleConfig::from_env`]).

use crate::config::OracleConfig;
use crate::error::{Error, Result};
use crate::oracle::PaginationOracle;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Asks a Gemini model to list the pagination links of a page
pub struct GeminiOracle {
    config: OracleConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "topK")]
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

impl GeminiOracle {
    pub fn new(config: OracleConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    /// Create an oracle configured from the process environment
    pub fn from_env() -> Result<Self> {
        Self::new(OracleConfig::from_env())
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

/// Instructions sent along with the page content
pub fn build_prompt(content: &str, base_url: &str) -> String {
    format!(
        "Extract all pagination URLs from this markdown content.
Base URL: {base_url}

Rules:
1. Look for these pagination patterns:
   - Links containing page numbers (page=N, page-N, /page/N)
   - Navigation elements with text: Next, Previous, Load More, Show More
   - Numeric page indicators (1, 2, 3...)
   - Infinite scroll markers or load more buttons
   - Arrow symbols (», ›, ⟩) indicating next page
2. Return only the pagination-related URLs
3. Format: one URL per line
4. Include the full URL path
5. Exclude the current page URL
6. Look for both visible text and href attributes
7. Check for data-* attributes that might indicate pagination

Content to analyze:
{content}
"
    )
}

/// Splits a model answer into one candidate per non-empty line
pub fn parse_response_lines(text: &str) -> Vec<String> {
    text.trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl PaginationOracle for GeminiOracle {
    async fn suggest_pagination_urls(&self, content: &str, base_url: &str) -> Result<Vec<String>> {
        let api_key = self.config.require_api_key()?;

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: build_prompt(content, base_url),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 0.1,
                top_p: 0.8,
                top_k: 40,
            },
        };

        ::log::debug!("Requesting pagination links for {} from {}", base_url, self.config.model);

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::OracleUnavailable(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Oracle(format!("Gemini API error ({status}): {body}")));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| Error::Oracle(format!("Failed to parse response: {e}")))?;

        if let Some(error) = gemini_response.error {
            return Err(Error::Oracle(format!("Gemini API error: {}", error.message)));
        }

        let text = gemini_response
            .candidates
            .and_then(|c| c.into_iter().next())
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        Ok(parse_response_lines(&text))
    }
}
