//! DeepL-based translation of subtitle lines.

use crate::error::{PolysubError, Result};
use crate::translate::Translator;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_API_URL: &str = "https://api-free.deepl.com";

/// Translator using the DeepL REST API.
pub struct DeepLTranslator {
    client: Client,
    api_key: String,
    base_url: String,
    formality: Formality,
}

/// DeepL formality setting. More formal output tends to stay closer to the
/// literal phrasing, which suits line-by-line study of a dub script.
#[derive(Debug, Clone, Copy, Default)]
pub enum Formality {
    #[default]
    PreferMore,
    PreferLess,
    Standard,
}

impl Formality {
    fn as_str(&self) -> &'static str {
        match self {
            Formality::PreferMore => "prefer_more",
            Formality::PreferLess => "prefer_less",
            Formality::Standard => "default",
        }
    }
}

impl DeepLTranslator {
    /// Create a new DeepL translator with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_API_URL.to_string(),
            formality: Formality::default(),
        }
    }

    /// Point the client at a different endpoint (paid-tier host, or tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the formality setting.
    pub fn with_formality(mut self, formality: Formality) -> Self {
        self.formality = formality;
        self
    }
}

#[async_trait]
impl Translator for DeepLTranslator {
    async fn translate_batch(&self, texts: &[&str], target_lang: &str) -> Result<Vec<String>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!("Translating {} line(s) to {}", texts.len(), target_lang);

        let request = TranslateRequest {
            text: texts.iter().map(|t| t.to_string()).collect(),
            target_lang: target_lang.to_string(),
            formality: self.formality.as_str().to_string(),
        };

        let url = format!("{}/v2/translate", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| PolysubError::Translation(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PolysubError::Translation(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(PolysubError::Translation(format!(
                "DeepL API error ({}): {}",
                status, body
            )));
        }

        let parsed: TranslateResponse = serde_json::from_str(&body)
            .map_err(|e| PolysubError::Translation(format!("Failed to parse response: {}", e)))?;

        Ok(parsed.translations.into_iter().map(|t| t.text).collect())
    }

    fn name(&self) -> &'static str {
        "deepl"
    }
}

#[derive(Serialize)]
struct TranslateRequest {
    text: Vec<String>,
    target_lang: String,
    formality: String,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
struct Translation {
    text: String,
}
