use crate::error::{PolysubError, Result};
use crate::subtitle::{SubtitleEvent, SubtitleTrack};
use crate::transcribe::Transcriber;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, warn};

/// OpenAI API base; the transcription endpoint lives under /v1.
const DEFAULT_API_URL: &str = "https://api.openai.com";

/// Maximum file size for the Whisper API (25 MB).
const MAX_FILE_SIZE: u64 = 25 * 1024 * 1024;

/// Maximum retries for API calls.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const BASE_DELAY_MS: u64 = 1000;

/// OpenAI Whisper API client, used as the dub-track fallback when no usable
/// dub subtitle exists online.
pub struct WhisperClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    language: Option<String>,
}

impl WhisperClient {
    /// Create a new Whisper client with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_API_URL.to_string(),
            model: "whisper-1".to_string(),
            language: None,
        }
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the source language (ISO 639-1 code).
    pub fn with_language(mut self, language: String) -> Self {
        self.language = Some(language);
        self
    }

    /// Build the multipart form for the API request.
    async fn build_form(&self, audio_path: &Path) -> Result<Form> {
        let file_bytes = fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let file_part = Part::bytes(file_bytes)
            .file_name(file_name)
            .mime_str("audio/wav")?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment");

        if let Some(ref lang) = self.language {
            form = form.text("language", lang.clone());
        }

        Ok(form)
    }

    /// Make the API request (form is consumed, so no retries at this level).
    async fn call_api(&self, form: Form) -> Result<WhisperResponse> {
        let url = format!("{}/v1/audio/transcriptions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        debug!("Whisper API response status: {}", status);

        if status.is_success() {
            let body = response.text().await?;
            let parsed: WhisperResponse = serde_json::from_str(&body)?;
            return Ok(parsed);
        }

        let error_body = response.text().await.unwrap_or_default();

        // The status stays in the message so the retry loop can tell client
        // errors from transient ones
        if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
            return Err(PolysubError::Transcription(format!(
                "Whisper API error ({}): {} ({})",
                status, api_error.error.message, api_error.error.r#type
            )));
        }

        Err(PolysubError::Transcription(format!(
            "Whisper API error ({}): {}",
            status, error_body
        )))
    }

    /// Transcribe with retry logic - rebuilds the form on each attempt.
    async fn transcribe_with_retry(&self, audio: &Path) -> Result<WhisperResponse> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = BASE_DELAY_MS * 2u64.pow(attempt - 1);
                debug!("Retry attempt {} after {}ms delay", attempt, delay);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            let form = self.build_form(audio).await?;

            match self.call_api(form).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    // Don't retry on client errors
                    let error_str = e.to_string();
                    if error_str.contains("API error (4") {
                        return Err(e);
                    }
                    warn!("Attempt {} failed: {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| PolysubError::Transcription("Unknown error".to_string())))
    }

    /// Convert a Whisper response into a subtitle track.
    fn parse_response(&self, response: WhisperResponse) -> SubtitleTrack {
        let mut track = SubtitleTrack::new();

        if let Some(segments) = response.segments {
            for seg in segments {
                let text = seg.text.trim();
                if text.is_empty() {
                    continue;
                }
                track.push(SubtitleEvent::new(
                    Duration::from_secs_f64(seg.start),
                    Duration::from_secs_f64(seg.end),
                    text,
                ));
            }
        } else if !response.text.trim().is_empty() {
            // Fallback: one event spanning the whole audio
            track.push(SubtitleEvent::new(
                Duration::ZERO,
                Duration::from_secs_f64(response.duration),
                response.text.trim(),
            ));
        }

        track
    }
}

#[async_trait]
impl Transcriber for WhisperClient {
    async fn transcribe(&self, audio: &Path) -> Result<SubtitleTrack> {
        debug!("Transcribing {:?} with Whisper", audio);

        let metadata = fs::metadata(audio).await?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(PolysubError::Transcription(format!(
                "File too large for Whisper API: {} bytes (max {} bytes)",
                metadata.len(),
                MAX_FILE_SIZE
            )));
        }

        let response = self.transcribe_with_retry(audio).await?;
        let track = self.parse_response(response);

        debug!("Whisper returned {} segment(s)", track.len());
        Ok(track)
    }

    fn name(&self) -> &'static str {
        "OpenAI Whisper"
    }
}

// API response types

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
    #[serde(default)]
    segments: Option<Vec<WhisperSegment>>,
    #[serde(default)]
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    r#type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = WhisperClient::new("test-key".to_string());
        assert_eq!(client.name(), "OpenAI Whisper");
        assert_eq!(client.model, "whisper-1");
    }

    #[test]
    fn test_with_language() {
        let client = WhisperClient::new("test-key".to_string()).with_language("hu".to_string());
        assert_eq!(client.language.as_deref(), Some("hu"));
    }

    #[test]
    fn test_parse_response_with_segments() {
        let client = WhisperClient::new("test-key".to_string());

        let response = WhisperResponse {
            text: "Hello world. How are you?".to_string(),
            segments: Some(vec![
                WhisperSegment {
                    start: 0.0,
                    end: 2.0,
                    text: " Hello world. ".to_string(),
                },
                WhisperSegment {
                    start: 2.5,
                    end: 4.0,
                    text: "How are you?".to_string(),
                },
            ]),
            duration: 4.0,
        };

        let track = client.parse_response(response);
        assert_eq!(track.len(), 2);
        assert_eq!(track.events()[0].text, "Hello world.");
        assert_eq!(track.events()[1].start, Duration::from_millis(2500));
        assert_eq!(track.events()[1].end, Duration::from_secs(4));
    }

    #[test]
    fn test_parse_response_without_segments() {
        let client = WhisperClient::new("test-key".to_string());

        let response = WhisperResponse {
            text: "Hello world".to_string(),
            segments: None,
            duration: 2.0,
        };

        let track = client.parse_response(response);
        assert_eq!(track.len(), 1);
        assert_eq!(track.events()[0].text, "Hello world");
        assert_eq!(track.events()[0].end, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_transcribe_missing_file_fails() {
        let client = WhisperClient::new("test-key".to_string());
        let result = client.transcribe(Path::new("/tmp/nonexistent_test.wav")).await;

        assert!(result.is_err());
    }
}
