use async_openai::error::OpenAIError;
// Import necessary libraries and modules for API interaction, file I/O, and serialization.
use async_openai::{Client, config::OpenAIConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};

use crate::ai::DEFAULT_MODEL;

// Application configuration: transport and auth details for the model call,
// kept out of the generation core.
#[derive(Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub openai_api_key: Option<String>, // Optional API key for OpenAI services.
    pub model: String,                  // Chat-completion model identifier.
    pub offline: bool,                  // Forces deck-only generation.
    pub debug_mode: bool,               // Flag to enable or disable debug mode.
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            openai_api_key: None, // No API key by default.
            model: DEFAULT_MODEL.to_string(),
            offline: false,
            debug_mode: false, // Debug mode disabled by default.
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // Load configuration from the default file path.
    pub fn load() -> io::Result<Self> {
        Self::load_from_file("./data/config.json")
    }

    // Save current configuration to the default file path.
    pub fn save(&self) -> io::Result<()> {
        self.save_to_file("./data/config.json")
    }

    pub fn load_from_file(path: &str) -> io::Result<Self> {
        let data = fs::read_to_string(path)?;
        let config = serde_json::from_str(&data)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> io::Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        if let Some(parent) = std::path::Path::new(path).parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(path)?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    // Asynchronously validate an API key with OpenAI's services.
    pub async fn validate_api_key(api_key: &str) -> bool {
        let client = Client::with_config(OpenAIConfig::new().with_api_key(api_key));
        match client.models().list().await {
            Ok(_) => true,
            Err(OpenAIError::Reqwest(e)) => {
                log::warn!("API key validation failed, verify your internet connection: {e}");
                false
            }
            _ => false,
        }
    }
}
