//! TOML Configuration File Support
//!
//! Loads calculator settings from `~/.config/calc/calculator.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (applied by the caller through [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! The configuration file follows the XDG Base Directory specification:
//! `$XDG_CONFIG_HOME/calc/calculator.toml`.
//!
//! # Example Configuration
//!
//! ```toml
//! [display]
//! max_digits = 12
//!
//! [chat]
//! history_limit = 20
//! extractor = "tool-call"
//!
//! [llm]
//! model = "claude-3-haiku-20240307"
//! max_tokens = 1024
//! ```
//!
//! # Environment Variables
//!
//! | Variable              | Setting               |
//! |-----------------------|-----------------------|
//! | `CALC_MAX_DIGITS`     | `display.max_digits`  |
//! | `CALC_HISTORY_LIMIT`  | `chat.history_limit`  |
//! | `CALC_EXTRACTOR`      | `chat.extractor`      |
//! | `CALC_LLM_MODEL`      | `llm.model`           |
//! | `CALC_LLM_MAX_TOKENS` | `llm.max_tokens`      |

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chat::DEFAULT_HISTORY_LIMIT;
use crate::number::{DEFAULT_MAX_DIGITS, MAX_DIGITS_LIMIT};

/// Model requested when none is configured
pub const DEFAULT_LLM_MODEL: &str = "claude-3-haiku-20240307";

/// Output token limit requested when none is configured
pub const DEFAULT_LLM_MAX_TOKENS: u32 = 1024;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// Extractor Selection
// =============================================================================

/// Which intent extractor the chat bridge uses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractorKind {
    /// Local phrase matching
    #[default]
    Pattern,
    /// LLM tool-call responses
    ToolCall,
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern => write!(f, "pattern"),
            Self::ToolCall => write!(f, "tool-call"),
        }
    }
}

impl FromStr for ExtractorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pattern" => Ok(Self::Pattern),
            "tool-call" | "tool_call" | "llm" => Ok(Self::ToolCall),
            other => Err(ConfigError::ValidationError(format!(
                "unknown extractor {other:?} (expected \"pattern\" or \"tool-call\")"
            ))),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Display section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayToml {
    /// Maximum typed significant digits
    pub max_digits: Option<usize>,
}

/// Chat section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatToml {
    /// Messages kept in the rolling history
    pub history_limit: Option<usize>,

    /// Extractor name
    pub extractor: Option<ExtractorKind>,
}

/// LLM section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmToml {
    /// Model identifier
    pub model: Option<String>,

    /// Output token limit
    pub max_tokens: Option<u32>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorToml {
    /// Display configuration section
    pub display: DisplayToml,

    /// Chat configuration section
    pub chat: ChatToml,

    /// LLM configuration section
    pub llm: LlmToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Settings for building LLM requests
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LlmConfig {
    /// Model identifier
    pub model: String,

    /// Output token limit
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_LLM_MODEL.to_string(),
            max_tokens: DEFAULT_LLM_MAX_TOKENS,
        }
    }
}

/// Resolved calculator configuration
#[derive(Clone, Debug)]
pub struct CalculatorConfig {
    /// Maximum typed significant digits
    pub max_digits: usize,

    /// Messages kept in the chat history
    pub history_limit: usize,

    /// Which extractor the chat bridge uses
    pub extractor: ExtractorKind,

    /// LLM request settings
    pub llm: LlmConfig,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            max_digits: DEFAULT_MAX_DIGITS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            extractor: ExtractorKind::default(),
            llm: LlmConfig::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl CalculatorConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_DIGITS_LIMIT).contains(&self.max_digits) {
            return Err(ConfigError::ValidationError(format!(
                "max_digits must be between 1 and {MAX_DIGITS_LIMIT}, got {}",
                self.max_digits
            )));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::ValidationError(
                "history_limit must be at least 1".to_string(),
            ));
        }
        if self.llm.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "llm.max_tokens must be at least 1".to_string(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.model must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/calc/calculator.toml` or
/// `~/.config/calc/calculator.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("calc").join("calculator.toml"))
}

/// Load configuration from the default path, then the environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if the
/// resulting values are out of range. A missing config file is not an error.
pub fn load_config() -> Result<CalculatorConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path, then the environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed, or
/// if the resulting values are out of range.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<CalculatorConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with a custom environment lookup
///
/// # Errors
///
/// Same as [`load_config_from_path`].
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<CalculatorConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = CalculatorConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: CalculatorToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env)?;
    config.validate()?;

    Ok(config)
}

fn apply_toml_config(config: &mut CalculatorConfig, toml: &CalculatorToml) {
    if let Some(digits) = toml.display.max_digits {
        config.max_digits = digits;
    }

    if let Some(limit) = toml.chat.history_limit {
        config.history_limit = limit;
    }
    if let Some(extractor) = toml.chat.extractor {
        config.extractor = extractor;
    }

    if let Some(ref model) = toml.llm.model {
        config.llm.model.clone_from(model);
    }
    if let Some(tokens) = toml.llm.max_tokens {
        config.llm.max_tokens = tokens;
    }
}

fn apply_env_config<F>(config: &mut CalculatorConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(digits) = env("CALC_MAX_DIGITS") {
        config.max_digits = parse_env("CALC_MAX_DIGITS", &digits)?;
        config.source = ConfigSource::Env;
    }
    if let Some(limit) = env("CALC_HISTORY_LIMIT") {
        config.history_limit = parse_env("CALC_HISTORY_LIMIT", &limit)?;
        config.source = ConfigSource::Env;
    }
    if let Some(extractor) = env("CALC_EXTRACTOR") {
        config.extractor = extractor.parse()?;
        config.source = ConfigSource::Env;
    }
    if let Some(model) = env("CALC_LLM_MODEL") {
        config.llm.model = model;
        config.source = ConfigSource::Env;
    }
    if let Some(tokens) = env("CALC_LLM_MAX_TOKENS") {
        config.llm.max_tokens = parse_env("CALC_LLM_MAX_TOKENS", &tokens)?;
        config.source = ConfigSource::Env;
    }
    Ok(())
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| {
        ConfigError::ValidationError(format!("{key} has invalid value {value:?}"))
    })
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Max digits override
    pub max_digits: Option<usize>,

    /// History limit override
    pub history_limit: Option<usize>,

    /// Extractor override
    pub extractor: Option<ExtractorKind>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max digits override
    #[must_use]
    pub fn with_max_digits(mut self, digits: usize) -> Self {
        self.max_digits = Some(digits);
        self
    }

    /// Set history limit override
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// Set extractor override
    #[must_use]
    pub fn with_extractor(mut self, extractor: ExtractorKind) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Apply overrides to a configuration and re-check it
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if an override is out of range.
    pub fn apply(&self, config: &mut CalculatorConfig) -> Result<(), ConfigError> {
        if self.max_digits.is_some() || self.history_limit.is_some() || self.extractor.is_some() {
            config.source = ConfigSource::Cli;
        }

        if let Some(digits) = self.max_digits {
            config.max_digits = digits;
        }
        if let Some(limit) = self.history_limit {
            config.history_limit = limit;
        }
        if let Some(extractor) = self.extractor {
            config.extractor = extractor;
        }

        config.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
