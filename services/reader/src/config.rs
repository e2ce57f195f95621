//! services/reader/src/config.rs
//!
//! Defines the reader's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

use crate::adapters::quran_api::ContentSettings;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub edition_base_url: String,
    pub translation_id: u32,
    pub transliteration_id: u32,
    pub language: String,
    pub section_page_size: u32,
    pub http_timeout: Option<Duration>,
    pub storage_dir: PathBuf,
    pub log_level: Level,
}

pub const DEFAULT_API_BASE_URL: &str = "https://api.quran.com/api/v4";
pub const DEFAULT_EDITION_BASE_URL: &str = "http://api.alquran.cloud/v1";

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// A `.env` file in the current directory is honoured outside of tests.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Remote Content API ---
        let api_base_url = std::env::var("QURAN_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let edition_base_url = std::env::var("EDITION_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_EDITION_BASE_URL.to_string());
        for (var, url) in [
            ("QURAN_API_BASE_URL", &api_base_url),
            ("EDITION_API_BASE_URL", &edition_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue(
                    var.to_string(),
                    format!("'{}' is not an http(s) URL", url),
                ));
            }
        }

        let translation_id = parse_var("TRANSLATION_ID", 33)?;
        let transliteration_id = parse_var("TRANSLITERATION_ID", 40)?;
        let language = std::env::var("CONTENT_LANGUAGE").unwrap_or_else(|_| "id".to_string());

        let section_page_size: u32 = parse_var("SECTION_PAGE_SIZE", 50)?;
        if section_page_size == 0 {
            return Err(ConfigError::InvalidValue(
                "SECTION_PAGE_SIZE".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let http_timeout = match std::env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => Some(Duration::from_secs(raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?)),
            Err(_) => None,
        };

        // --- Local Storage and Logging ---
        let storage_dir = std::env::var("STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./reader-data"));

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            api_base_url,
            edition_base_url,
            translation_id,
            transliteration_id,
            language,
            section_page_size,
            http_timeout,
            storage_dir,
            log_level,
        })
    }

    /// The subset of settings the content adapter needs.
    pub fn content_settings(&self) -> ContentSettings {
        ContentSettings {
            base_url: self.api_base_url.clone(),
            edition_base_url: self.edition_base_url.clone(),
            translation_id: self.translation_id,
            transliteration_id: self.transliteration_id,
            language: self.language.clone(),
            section_page_size: self.section_page_size,
        }
    }
}

fn parse_var<T>(var: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(var.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
