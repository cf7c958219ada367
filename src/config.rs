use crate::compose::StyleSet;
use crate::error::{PolysubError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Keywords that mark a candidate subtitle as belonging to a dubbed audio
/// track. "szinkron" is the Hungarian term, the dub scene this tool grew up
/// around; override the list for other locales.
fn default_dub_keywords() -> Vec<String> {
    vec![
        "dub".to_string(),
        "dubbed".to_string(),
        "szinkron".to_string(),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub opensubtitles_api_key: Option<String>,
    pub deepl_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub dub_keywords: Vec<String>,
    pub styles: StyleSet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            opensubtitles_api_key: None,
            deepl_api_key: None,
            openai_api_key: None,
            dub_keywords: default_dub_keywords(),
            styles: StyleSet::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                config = toml::from_str(&contents)
                    .map_err(|e| PolysubError::Config(format!("{}: {}", config_path.display(), e)))?;
            }
        }

        // Override with environment variables
        if let Ok(key) = std::env::var("OPENSUBTITLES_API_KEY") {
            config.opensubtitles_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("DEEPL_API_KEY") {
            config.deepl_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.openai_api_key = Some(key);
        }
        if let Ok(keywords) = std::env::var("POLYSUB_DUB_KEYWORDS") {
            let parsed: Vec<String> = keywords
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
            if !parsed.is_empty() {
                config.dub_keywords = parsed;
            }
        }

        Ok(config)
    }

    /// Keys the main workflow cannot run without.
    pub fn validate(&self) -> Result<()> {
        if self.opensubtitles_api_key.is_none() {
            return Err(PolysubError::Config(
                "OPENSUBTITLES_API_KEY not set. Get one at https://www.opensubtitles.com/consumers"
                    .to_string(),
            ));
        }

        if self.deepl_api_key.is_none() {
            return Err(PolysubError::Config(
                "DEEPL_API_KEY not set. Get one at https://www.deepl.com/pro-api".to_string(),
            ));
        }

        if self.dub_keywords.is_empty() {
            return Err(PolysubError::Config(
                "dub_keywords must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("polysub").join("config.toml"))
    }
}
