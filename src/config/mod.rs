use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cli::Cli;

/// Service configuration, layered as file < environment < CLI flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// OpenAI Whisper API settings
    pub openai: OpenAiConfig,

    /// Scratch storage for downloaded audio
    pub scratch: ScratchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API credential. May be empty at load time; transcription requests
    /// are rejected until it is set.
    #[serde(skip_serializing)]
    pub api_key: String,

    /// API base URL (overridable for self-hosted Whisper gateways)
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Fixed target language for transcription (not auto-detected)
    pub language: String,

    /// Language reported when the service omits one
    pub fallback_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScratchConfig {
    /// Directory for temporary audio files
    pub dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3333 }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "whisper-1".to_string(),
            language: "pt".to_string(),
            fallback_language: "pt".to_string(),
        }
    }
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("temp"),
        }
    }
}

impl Config {
    /// Load configuration: YAML file if present, then environment
    /// variables, then CLI flags on top.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match Self::config_path(cli) {
            Some(path) => {
                let content = fs_err::read_to_string(&path)
                    .context("Failed to read config file")?;
                serde_yaml::from_str(&content).context("Failed to parse config file")?
            }
            None => Self::default(),
        };

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.openai.api_key = key;
        }
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            config.openai.base_url = base_url;
        }

        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(dir) = &cli.scratch_dir {
            config.scratch.dir = dir.clone();
        }

        Ok(config)
    }

    /// Resolve the config file to use, if any: an explicit `--config` path,
    /// `config.yaml` in the working directory, or the platform config dir.
    fn config_path(cli: &Cli) -> Option<PathBuf> {
        if let Some(path) = &cli.config {
            return Some(path.clone());
        }

        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        let candidate = dirs::config_dir()?
            .join("transcribe-server")
            .join("config.yaml");
        candidate.exists().then_some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_contract() {
        let config = Config::default();
        assert_eq!(config.server.port, 3333);
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.openai.model, "whisper-1");
        assert_eq!(config.openai.language, "pt");
        assert_eq!(config.openai.fallback_language, "pt");
        assert_eq!(config.scratch.dir, PathBuf::from("temp"));
        assert!(config.openai.api_key.is_empty());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults_elsewhere() {
        let config: Config = serde_yaml::from_str("server:\n  port: 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.openai.model, "whisper-1");
        assert_eq!(config.scratch.dir, PathBuf::from("temp"));
    }
}
