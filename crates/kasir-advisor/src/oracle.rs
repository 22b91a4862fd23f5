//! # Oracle
//!
//! The single seam between the store and the generative-AI service: a
//! prompt (plus optional image) goes in, text comes out.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  recommend / analyst / ocr                                              │
//! │          │  OracleRequest { prompt, image?, expect_json }               │
//! │          ▼                                                              │
//! │  ┌────────────────┐     POST {endpoint}/models/{model}:generateContent  │
//! │  │   HttpOracle   │ ──────────────────────────────────────────────────► │
//! │  │  (reqwest)     │ ◄────────────── candidates[0].content.parts[].text  │
//! │  └────────────────┘                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::OracleSettings;
use crate::error::{AdvisorError, AdvisorResult};

// =============================================================================
// Request Types
// =============================================================================

/// Image bytes sent along with a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        InlineImage {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Guesses the MIME type from a file name, defaulting to JPEG.
    pub fn mime_type_for(file_name: &str) -> &'static str {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".png") {
            "image/png"
        } else if lower.ends_with(".webp") {
            "image/webp"
        } else if lower.ends_with(".pdf") {
            "application/pdf"
        } else {
            "image/jpeg"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRequest {
    pub prompt: String,
    pub image: Option<InlineImage>,
    /// Ask the service to answer with JSON only.
    pub expect_json: bool,
}

impl OracleRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        OracleRequest {
            prompt: prompt.into(),
            image: None,
            expect_json: false,
        }
    }

    pub fn json(prompt: impl Into<String>) -> Self {
        OracleRequest {
            expect_json: true,
            ..OracleRequest::text(prompt)
        }
    }

    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.image = Some(image);
        self
    }
}

/// A text-generation backend.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn generate(&self, request: OracleRequest) -> AdvisorResult<String>;

    fn name(&self) -> &str;
}

// =============================================================================
// HTTP Oracle
// =============================================================================

/// `generateContent` REST client.
#[derive(Debug, Clone)]
pub struct HttpOracle {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
    api_key: Option<String>,
}

impl HttpOracle {
    pub fn new(settings: &OracleSettings) -> AdvisorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;

        Ok(HttpOracle {
            client,
            endpoint: Url::parse(&settings.endpoint)?,
            model: settings.model.clone(),
            api_key: settings
                .api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
        })
    }

    /// Full URL of the generate call for the configured model.
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.as_str().trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl Oracle for HttpOracle {
    async fn generate(&self, request: OracleRequest) -> AdvisorResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AdvisorError::MissingCredential)?;

        let url = self.generate_url();
        debug!(
            model = %self.model,
            has_image = request.image.is_some(),
            prompt_len = request.prompt.len(),
            "Sending oracle request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&GenerateRequest::from(&request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let body: GenerateResponse = response.json().await?;
        body.into_text()
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// =============================================================================
// Wire Format
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl From<&OracleRequest> for GenerateRequest {
    fn from(request: &OracleRequest) -> Self {
        let mut parts = vec![Part {
            text: Some(request.prompt.clone()),
            inline_data: None,
        }];
        if let Some(image) = &request.image {
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: image.mime_type.clone(),
                    data: general_purpose::STANDARD.encode(&image.data),
                }),
            });
        }

        GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: request.expect_json.then(|| GenerationConfig {
                response_mime_type: "application/json".to_string(),
            }),
        }
    }
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> AdvisorResult<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AdvisorError::EmptyResponse);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request = OracleRequest::json("read this receipt")
            .with_image(InlineImage::new("image/png", vec![0x89, 0x50, 0x4e, 0x47]));
        let body = serde_json::to_value(GenerateRequest::from(&request)).unwrap();

        assert_eq!(body["contents"][0]["parts"][0]["text"], "read this receipt");
        assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["data"], "iVBORw==");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");

        let plain = serde_json::to_value(GenerateRequest::from(&OracleRequest::text("hi"))).unwrap();
        assert!(plain.get("generationConfig").is_none());
        assert!(plain["contents"][0]["parts"][0].get("inlineData").is_none());
    }

    #[test]
    fn test_response_text_extraction() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Sales are "},{"text":"up."}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "Sales are up.");

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(empty.into_text(), Err(AdvisorError::EmptyResponse)));

        let blocked: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(matches!(blocked.into_text(), Err(AdvisorError::EmptyResponse)));
    }

    #[test]
    fn test_generate_url() {
        let settings = OracleSettings {
            endpoint: "https://example.test/v1beta/".into(),
            model: "gemini-2.5-flash".into(),
            ..OracleSettings::default()
        };
        let oracle = HttpOracle::new(&settings).unwrap();
        assert_eq!(
            oracle.generate_url(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let oracle = HttpOracle::new(&OracleSettings::default()).unwrap();
        let err = oracle.generate(OracleRequest::text("hello")).await.unwrap_err();
        assert!(matches!(err, AdvisorError::MissingCredential));
    }

    #[test]
    fn test_mime_type_guess() {
        assert_eq!(InlineImage::mime_type_for("receipt.PNG"), "image/png");
        assert_eq!(InlineImage::mime_type_for("nota.jpg"), "image/jpeg");
        assert_eq!(InlineImage::mime_type_for("scan.webp"), "image/webp");
    }
}
