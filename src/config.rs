// File: ./src/config.rs
// Handles configuration loading, saving, defaults and validation.
use crate::context::AppContext;
use crate::model::{Classifier, Sequencing, Suffixes};
use anyhow::{Error, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;

pub const DEFAULT_API_URL: &str = "https://todoist.com/API/v7";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_label() -> String {
    "next_action".to_string()
}
fn default_skip_label() -> String {
    "Someday".to_string()
}
fn default_delay() -> u64 {
    5
}
fn default_parallel_suffix() -> String {
    ".".to_string()
}
fn default_serial_suffix() -> String {
    "_".to_string()
}
fn default_hide_future() -> u32 {
    7
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_label")]
    pub label: String,
    #[serde(default = "default_skip_label")]
    pub skip_label: String,

    /// Seconds to sleep between sync cycles.
    #[serde(default = "default_delay")]
    pub delay: u64,
    #[serde(default)]
    pub inbox: Sequencing,
    #[serde(default = "default_parallel_suffix")]
    pub parallel_suffix: String,
    #[serde(default = "default_serial_suffix")]
    pub serial_suffix: String,
    /// Days ahead beyond which due items lose the label. 0 disables.
    #[serde(default = "default_hide_future")]
    pub hide_future: u32,

    #[serde(default)]
    pub onetime: bool,
    #[serde(default)]
    pub nocache: bool,
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_token: None,
            api_url: default_api_url(),
            label: default_label(),
            skip_label: default_skip_label(),
            delay: 5,
            inbox: Sequencing::Untyped,
            parallel_suffix: ".".to_string(),
            serial_suffix: "_".to_string(),
            hide_future: 7,
            onetime: false,
            nocache: false,
            debug: false,
        }
    }
}

fn single_char(value: &str, what: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => bail!("{} must be exactly one character, got '{}'", what, value),
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(config) => Ok(config),
            Err(e) if Self::is_missing_config_error(&e) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Detects whether an error means the config file was missing, either via our
    /// explicit message or an IO NotFound anywhere in the chain.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }

        false
    }

    /// The API token, or a configuration error when none is set.
    pub fn token(&self) -> Result<&str> {
        match self.api_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => bail!("No API token set (use --api-key, TODOIST_API_KEY or api_token in config.toml)"),
        }
    }

    pub fn classifier(&self) -> Result<Classifier> {
        let suffixes = Suffixes {
            parallel: single_char(&self.parallel_suffix, "parallel_suffix")?,
            serial: single_char(&self.serial_suffix, "serial_suffix")?,
        };
        Ok(Classifier::new(suffixes, self.inbox))
    }

    /// Checks everything that can be checked before talking to the server.
    pub fn validate(&self) -> Result<()> {
        self.token()?;
        self.classifier()?;
        if self.label.trim().is_empty() {
            bail!("The next action label name cannot be empty");
        }
        Ok(())
    }
}
