//! Configuration loaded from `config.toml`

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::draw::DEFAULT_MAX_ATTEMPTS;

/// Environment variable holding the mail relay API key
pub const MAIL_API_KEY_ENV: &str = "SANTA_MAIL_API_KEY";

/// santa configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub draw: DrawConfig,
    pub output: OutputConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    pub max_attempts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub relay_url: Option<String>,
    pub from_address: Option<String>,
    pub subject: String,
    pub timeout_secs: u64,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("out"),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            relay_url: None,
            from_address: None,
            subject: "Secret Santa for ^".to_string(),
            timeout_secs: 30,
        }
    }
}

impl MailConfig {
    pub fn resolved_api_key(&self) -> anyhow::Result<Option<String>> {
        self.enforce_env_only()?;
        Ok(env::var(MAIL_API_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }

    pub fn enforce_env_only(&self) -> anyhow::Result<()> {
        if self.api_key.is_some() {
            return Err(anyhow!(
                "Mail API keys must be provided via the {} environment variable, not stored in configuration",
                MAIL_API_KEY_ENV
            ));
        }
        Ok(())
    }

    /// Check that live delivery has everything it needs
    pub fn require_delivery_settings(&self) -> anyhow::Result<(&str, &str)> {
        let relay_url = self
            .relay_url
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("mail.relay_url must be set to send email"))?;
        let from = self
            .from_address
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("mail.from_address must be set to send email"))?;
        Ok((relay_url, from))
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("SANTA_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("santa")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location, or defaults if absent
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from an explicit file, which must exist
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.draw.max_attempts == 0 {
            return Err(anyhow!("draw.max_attempts must be at least 1"));
        }
        if self.mail.timeout_secs == 0 {
            return Err(anyhow!("mail.timeout_secs must be at least 1"));
        }
        self.mail.enforce_env_only()
    }
}
