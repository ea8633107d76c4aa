//! Configuration management for Chatty
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//!
//! The configuration never carries the API key. Credentials are supplied at
//! runtime, see [`crate::credential`].

use crate::error::{ChattyError, Result};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for Chatty
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Generative-language provider settings
    #[serde(default)]
    pub provider: GeminiConfig,
    /// Conversation view settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// Where to look for the API key when none is given explicitly
    #[serde(default)]
    pub credential: CredentialConfig,
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL of the API (useful for tests and local mocks)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model used for `generateContent`
    #[serde(default = "default_model")]
    pub model: String,

    /// Upper bound on a single request (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl GeminiConfig {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Conversation view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// `chrono` format string for the time label on each message
    #[serde(default = "default_time_format")]
    pub time_format: String,

    /// Show the welcome banner when an interactive session starts
    #[serde(default = "default_show_welcome")]
    pub show_welcome: bool,
}

fn default_time_format() -> String {
    "%H:%M".to_string()
}

fn default_show_welcome() -> bool {
    true
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            time_format: default_time_format(),
            show_welcome: default_show_welcome(),
        }
    }
}

/// Credential lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Read the API key from the OS keyring when none is given explicitly
    #[serde(default)]
    pub use_keyring: bool,

    /// Keyring service name
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Keyring user/account name
    #[serde(default = "default_keyring_user")]
    pub keyring_user: String,
}

fn default_keyring_service() -> String {
    "chatty".to_string()
}

fn default_keyring_user() -> String {
    "gemini_api_key".to_string()
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            use_keyring: false,
            keyring_service: default_keyring_service(),
            keyring_user: default_keyring_user(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(ChattyError::Io)?;
        let config = serde_yaml::from_str(&contents).map_err(ChattyError::Yaml)?;
        tracing::debug!("Loaded config from {}", path);
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(model) = std::env::var("CHATTY_MODEL") {
            tracing::debug!(model = %model, "Env override: CHATTY_MODEL");
            self.provider.model = model;
        }

        if let Ok(api_base) = std::env::var("CHATTY_API_BASE") {
            tracing::debug!(api_base = %api_base, "Env override: CHATTY_API_BASE");
            self.provider.api_base = api_base;
        }

        if let Ok(timeout) = std::env::var("CHATTY_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(v) => {
                    self.provider.timeout_seconds = v;
                    tracing::debug!(timeout_seconds = v, "Env override: CHATTY_TIMEOUT_SECONDS");
                }
                Err(_) => {
                    tracing::warn!("Invalid value for CHATTY_TIMEOUT_SECONDS: {}", timeout);
                }
            }
        }

        if let Ok(format) = std::env::var("CHATTY_TIME_FORMAT") {
            self.chat.time_format = format;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(model) = cli.model_override() {
            tracing::debug!(model = %model, "CLI override: --model");
            self.provider.model = model.to_string();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `ChattyError::Config` describing the first invalid field
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.provider.api_base).map_err(|e| {
            ChattyError::Config(format!(
                "provider.api_base is not a valid URL ({}): {}",
                self.provider.api_base, e
            ))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ChattyError::Config(format!(
                "provider.api_base must use http or https, got {}",
                base.scheme()
            ))
            .into());
        }

        if self.provider.model.trim().is_empty() {
            return Err(ChattyError::Config("provider.model cannot be empty".to_string()).into());
        }

        if self.provider.timeout_seconds == 0 {
            return Err(ChattyError::Config(
                "provider.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.time_format.trim().is_empty() {
            return Err(ChattyError::Config("chat.time_format cannot be empty".to_string()).into());
        }
        if StrftimeItems::new(&self.chat.time_format).any(|item| matches!(item, Item::Error)) {
            return Err(ChattyError::Config(format!(
                "chat.time_format is not a valid strftime format: {}",
                self.chat.time_format
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use serial_test::serial;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.provider.model, "gemini-2.0-flash");
        assert_eq!(config.provider.timeout_seconds, 60);
        assert!(!config.credential.use_keyring);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml_fills_defaults() {
        let yaml = r#"
provider:
  model: gemini-1.5-pro
chat:
  time_format: "%H:%M:%S"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.provider.model, "gemini-1.5-pro");
        assert_eq!(config.provider.api_base, default_api_base());
        assert_eq!(config.chat.time_format, "%H:%M:%S");
        assert!(config.chat.show_welcome);
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.provider.api_base = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_http_scheme() {
        let mut config = Config::default();
        config.provider.api_base = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.provider.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let mut config = Config::default();
        config.provider.model = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_time_format() {
        let mut config = Config::default();
        config.chat.time_format = "%Q".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serialized_config_has_no_credential_field() {
        let value = serde_yaml::to_value(Config::default()).unwrap();
        let keys = |v: &serde_yaml::Value| -> Vec<String> {
            v.as_mapping()
                .unwrap()
                .keys()
                .filter_map(|k| k.as_str().map(str::to_string))
                .collect()
        };

        assert_eq!(keys(&value), vec!["provider", "chat", "credential"]);
        for section in ["provider", "chat", "credential"] {
            for key in keys(&value[section]) {
                assert!(
                    !matches!(key.as_str(), "api_key" | "key" | "secret" | "token" | "password"),
                    "{}.{} looks like a stored credential",
                    section,
                    key
                );
            }
        }
        assert_eq!(
            keys(&value["credential"]),
            vec!["use_keyring", "keyring_service", "keyring_user"]
        );
    }

    #[test]
    fn test_from_file_reads_yaml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "provider:\n  model: gemini-file\n").unwrap();

        let config = Config::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.provider.model, "gemini-file");
    }

    #[test]
    fn test_from_file_invalid_yaml_is_yaml_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "provider: [unclosed").unwrap();

        let err = Config::from_file(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChattyError>(),
            Some(ChattyError::Yaml(_))
        ));
    }

    #[test]
    fn test_from_file_unreadable_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();

        let err = Config::from_file(dir.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChattyError>(),
            Some(ChattyError::Io(_))
        ));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("CHATTY_MODEL", "gemini-env");
        std::env::set_var("CHATTY_TIMEOUT_SECONDS", "15");
        let mut config = Config::default();
        config.apply_env_vars();
        std::env::remove_var("CHATTY_MODEL");
        std::env::remove_var("CHATTY_TIMEOUT_SECONDS");

        assert_eq!(config.provider.model, "gemini-env");
        assert_eq!(config.provider.timeout_seconds, 15);
    }

    #[test]
    #[serial]
    fn test_invalid_env_timeout_is_ignored() {
        std::env::set_var("CHATTY_TIMEOUT_SECONDS", "soon");
        let mut config = Config::default();
        config.apply_env_vars();
        std::env::remove_var("CHATTY_TIMEOUT_SECONDS");

        assert_eq!(config.provider.timeout_seconds, 60);
    }

    #[test]
    #[serial]
    fn test_cli_model_override_wins() {
        std::env::set_var("CHATTY_MODEL", "gemini-env");
        let cli = Cli::try_parse_from(["chatty", "chat", "--model", "gemini-cli"]).unwrap();
        let config = Config::load("does/not/exist.yaml", &cli).unwrap();
        std::env::remove_var("CHATTY_MODEL");

        assert_eq!(config.provider.model, "gemini-cli");
    }
}
