//! OpenSubtitles REST API client: candidate search and file retrieval.

use crate::error::{PolysubError, Result};
use crate::select::CandidateDescriptor;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

const DEFAULT_API_URL: &str = "https://api.opensubtitles.com/api/v1";

/// One search result: a downloadable candidate tagged with its language.
#[derive(Debug, Clone)]
pub struct SubtitleHit {
    pub language: String,
    pub candidate: CandidateDescriptor,
}

/// Client for the OpenSubtitles v1 API.
pub struct OpenSubtitlesClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenSubtitlesClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Search for subtitles matching a movie hash in the given languages.
    ///
    /// Entries the API returns without a file id or language are skipped;
    /// they cannot be downloaded later anyway.
    pub async fn search(&self, movie_hash: &str, languages: &[&str]) -> Result<Vec<SubtitleHit>> {
        let url = format!("{}/subtitles", self.base_url);
        debug!("Searching subtitles for hash {}", movie_hash);

        let languages = languages.join(",");
        let response = self
            .client
            .get(&url)
            .header("Api-Key", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("moviehash", movie_hash), ("languages", &languages)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(PolysubError::Search(format!(
                "OpenSubtitles API error ({}): {}",
                status, body
            )));
        }

        let parsed: SearchResponse = serde_json::from_str(&body)?;

        let mut hits = Vec::new();
        for entry in parsed.data {
            let attrs = entry.attributes;
            let Some(language) = attrs.language else {
                continue;
            };
            let Some(file) = attrs.files.into_iter().next() else {
                warn!("Skipping search result without files: {:?}", attrs.release);
                continue;
            };

            hits.push(SubtitleHit {
                language,
                candidate: CandidateDescriptor {
                    release_name: attrs.release.unwrap_or_default(),
                    comment_text: attrs.comments.unwrap_or_default(),
                    download_count: attrs.download_count.unwrap_or(0),
                    file_id: file.file_id,
                },
            });
        }

        debug!("Search returned {} usable candidate(s)", hits.len());
        Ok(hits)
    }

    /// Resolve the short-lived download URL for a chosen candidate.
    pub async fn download_link(&self, file_id: u64) -> Result<String> {
        let url = format!("{}/download", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("Accept", "application/json")
            .json(&DownloadRequest { file_id })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(PolysubError::Download(format!(
                "Could not get download link ({}): {}",
                status, body
            )));
        }

        let parsed: DownloadResponse = serde_json::from_str(&body)?;
        Ok(parsed.link)
    }

    /// Download a subtitle file to a temporary .srt path.
    ///
    /// The returned guard deletes the file when dropped, so the caller keeps
    /// it alive for as long as the content is needed.
    pub async fn download_to_temp(&self, url: &str) -> Result<NamedTempFile> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PolysubError::Download(format!(
                "Subtitle download failed ({})",
                status
            )));
        }

        let bytes = response.bytes().await?;
        let mut file = tempfile::Builder::new().suffix(".srt").tempfile()?;
        file.write_all(&bytes)?;
        file.flush()?;

        debug!("Downloaded {} bytes to {:?}", bytes.len(), file.path());
        Ok(file)
    }
}

// API request/response types

#[derive(Serialize)]
struct DownloadRequest {
    file_id: u64,
}

#[derive(Deserialize)]
struct DownloadResponse {
    link: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchEntry>,
}

#[derive(Deserialize)]
struct SearchEntry {
    attributes: SearchAttributes,
}

#[derive(Debug, Deserialize)]
struct SearchAttributes {
    language: Option<String>,
    release: Option<String>,
    comments: Option<String>,
    download_count: Option<u64>,
    #[serde(default)]
    files: Vec<SearchFile>,
}

#[derive(Debug, Deserialize)]
struct SearchFile {
    file_id: u64,
}
