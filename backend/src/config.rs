//! Configuration management for the Smart Irrigation server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with IRRIGATION__ prefix

use std::path::PathBuf;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Historical weather dataset
    pub weather: WeatherConfig,

    /// Persisted irrigation model
    pub model: ModelConfig,

    /// Text-generation service used for explanations and the site assistant
    pub explainer: ExplainerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Path to the Open-Meteo CSV export
    pub csv_path: PathBuf,

    /// Metadata lines preceding the column header
    pub header_rows: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Path to the JSON model document
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExplainerConfig {
    /// API key; empty disables the remote call
    pub api_key: String,

    /// Base URL of the generative language API
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ExplainerConfig {
    pub fn is_enabled(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("IRRIGATION_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("weather.csv_path", "open-meteo-2025.csv")?
            .set_default("weather.header_rows", 2)?
            .set_default("model.path", "irrigation_model.json")?
            .set_default("explainer.api_key", "")?
            .set_default(
                "explainer.endpoint",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("explainer.model", "gemini-2.5-flash-lite")?
            .set_default("explainer.timeout_secs", 20)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (IRRIGATION_ prefix)
            .add_source(
                Environment::with_prefix("IRRIGATION")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for ExplainerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash-lite".to_string(),
            timeout_secs: 20,
        }
    }
}
