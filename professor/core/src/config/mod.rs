//! TOML Configuration File Support
//!
//! Centralized configuration loading for the professor engine and CLI,
//! supporting a TOML configuration file at
//! `~/.config/ai-professor/professor.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables (`PROFESSOR_*`, `OPENAI_API_KEY`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [llm]
//! provider = "openai"
//! model = "gpt-4o-mini"
//! request_timeout_secs = 60
//!
//! [storage]
//! data_dir = "/home/me/.local/share/ai-professor"
//! supabase_url = "https://project.supabase.co"
//! supabase_anon_key = "..."
//!
//! [animation]
//! reference_frame_secs = 0.016
//! seed = 42
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::REFERENCE_FRAME_SECS;
use crate::backend::{DEFAULT_OLLAMA_MODEL, DEFAULT_OPENAI_MODEL};
use crate::storage::default_data_dir;

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
// TOML Configuration Structures
// =============================================================================

/// Which LLM provider to talk to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI or any server speaking its chat completions API
    #[default]
    OpenAi,
    /// Local Ollama server
    Ollama,
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::ValidationError(format!("unknown LLM provider: {other}"))),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
        })
    }
}

/// LLM section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmToml {
    /// Provider name
    pub provider: Option<LlmProvider>,

    /// Model identifier
    pub model: Option<String>,

    /// API key for hosted providers
    pub api_key: Option<String>,

    /// Override the provider's base URL
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    pub request_timeout_secs: Option<u64>,

    /// Force one sampling temperature for every request
    pub temperature: Option<f32>,
}

/// Storage section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageToml {
    /// Directory for local JSON files
    pub data_dir: Option<PathBuf>,

    /// Hosted store project URL
    pub supabase_url: Option<String>,

    /// Hosted store public key
    pub supabase_anon_key: Option<String>,
}

/// Animation section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationToml {
    /// Frame length per-frame constants are calibrated against
    pub reference_frame_secs: Option<f32>,

    /// Seed for gesture rolls and scene layouts
    pub seed: Option<u64>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfessorToml {
    /// LLM configuration section
    pub llm: LlmToml,

    /// Storage configuration section
    pub storage: StorageToml,

    /// Animation configuration section
    pub animation: AnimationToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved LLM settings
#[derive(Clone, Debug, PartialEq)]
pub struct LlmSettings {
    /// Provider
    pub provider: LlmProvider,
    /// Model; `None` means the provider's default
    pub model: Option<String>,
    /// API key
    pub api_key: Option<String>,
    /// Base URL override
    pub base_url: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Temperature forced onto every request
    pub temperature: Option<f32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAi,
            model: None,
            api_key: None,
            base_url: None,
            request_timeout_secs: 60,
            temperature: None,
        }
    }
}

impl LlmSettings {
    /// Model to request
    #[must_use]
    pub fn model(&self) -> &str {
        match (&self.model, self.provider) {
            (Some(model), _) => model,
            (None, LlmProvider::OpenAi) => DEFAULT_OPENAI_MODEL,
            (None, LlmProvider::Ollama) => DEFAULT_OLLAMA_MODEL,
        }
    }

    /// Per-request timeout
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Resolved storage settings
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StorageSettings {
    /// Local data directory override
    pub data_dir: Option<PathBuf>,
    /// Hosted store project URL
    pub supabase_url: Option<String>,
    /// Hosted store public key
    pub supabase_anon_key: Option<String>,
}

impl StorageSettings {
    /// Local data directory
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// URL and key of the hosted store, when both are configured
    #[must_use]
    pub fn hosted(&self) -> Option<(&str, &str)> {
        match (&self.supabase_url, &self.supabase_anon_key) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => Some((url.as_str(), key.as_str())),
            _ => None,
        }
    }
}

/// Resolved animation settings
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationSettings {
    /// Frame length per-frame constants are calibrated against
    pub reference_frame_secs: f32,
    /// Fixed seed; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            reference_frame_secs: REFERENCE_FRAME_SECS,
            seed: None,
        }
    }
}

/// Centralized configuration
///
/// Consolidates configuration from every source and tracks where the
/// highest-priority value came from. Use [`load_config`] to load with
/// proper priority handling.
#[derive(Clone, Debug, Default)]
pub struct ProfessorConfig {
    /// LLM settings
    pub llm: LlmSettings,
    /// Storage settings
    pub storage: StorageSettings,
    /// Animation settings
    pub animation: AnimationSettings,
    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,
    source: Option<ConfigSource>,
}

impl ProfessorConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source.unwrap_or(ConfigSource::Default)
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = Some(source);
    }

    /// Reject values that cannot work
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "llm.request_timeout_secs must be greater than zero".into(),
            ));
        }
        if let Some(t) = self.llm.temperature {
            if !(0.0..=1.0).contains(&t) {
                return Err(ConfigError::ValidationError(format!(
                    "llm.temperature must be within 0.0..=1.0, got {t}"
                )));
            }
        }
        let frame = self.animation.reference_frame_secs;
        if !(frame.is_finite() && frame > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "animation.reference_frame_secs must be positive, got {frame}"
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/ai-professor/professor.toml` or
/// `~/.config/ai-professor/professor.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ai-professor").join("professor.toml"))
}

/// Load configuration from the default path and the process environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read, parsed or
/// validated. A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<ProfessorConfig, ConfigError> {
    load_config_from_path(default_config_path().as_deref())
}

/// Load configuration from a specific path and the process environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read, parsed or
/// validated.
pub fn load_config_from_path(path: Option<&Path>) -> Result<ProfessorConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with an explicit environment lookup
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read, parsed or
/// validated, or an environment variable holds an unusable value.
pub fn load_config_with_env<F>(path: Option<&Path>, env: F) -> Result<ProfessorConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ProfessorConfig::default();

    if let Some(config_path) = path {
        if config_path.exists() {
            let toml_content = std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                path: config_path.to_path_buf(),
                source: e,
            })?;

            let toml_config: ProfessorToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, toml_config);
            config.config_file_path = Some(config_path.to_path_buf());
            config.set_source(ConfigSource::File);

            tracing::info!(path = %config_path.display(), "Loaded configuration from file");
        } else {
            tracing::debug!(path = %config_path.display(), "Config file not found, using defaults");
        }
    }

    apply_env_config(&mut config, env)?;
    config.validate()?;
    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ProfessorConfig, toml: ProfessorToml) {
    let ProfessorToml { llm, storage, animation } = toml;

    if let Some(provider) = llm.provider {
        config.llm.provider = provider;
    }
    if llm.model.is_some() {
        config.llm.model = llm.model;
    }
    if llm.api_key.is_some() {
        config.llm.api_key = llm.api_key;
    }
    if llm.base_url.is_some() {
        config.llm.base_url = llm.base_url;
    }
    if let Some(secs) = llm.request_timeout_secs {
        config.llm.request_timeout_secs = secs;
    }
    if llm.temperature.is_some() {
        config.llm.temperature = llm.temperature;
    }

    if storage.data_dir.is_some() {
        config.storage.data_dir = storage.data_dir;
    }
    if storage.supabase_url.is_some() {
        config.storage.supabase_url = storage.supabase_url;
    }
    if storage.supabase_anon_key.is_some() {
        config.storage.supabase_anon_key = storage.supabase_anon_key;
    }

    if let Some(secs) = animation.reference_frame_secs {
        config.animation.reference_frame_secs = secs;
    }
    if animation.seed.is_some() {
        config.animation.seed = animation.seed;
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::ValidationError(format!("{key} has an invalid value: {value}")))
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut ProfessorConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut touched = false;

    if let Some(provider) = env("PROFESSOR_PROVIDER") {
        config.llm.provider = provider.parse()?;
        touched = true;
    }
    if let Some(model) = env("PROFESSOR_MODEL") {
        config.llm.model = Some(model);
        touched = true;
    }
    if let Some(key) = env("PROFESSOR_API_KEY").or_else(|| env("OPENAI_API_KEY")) {
        config.llm.api_key = Some(key);
        touched = true;
    }
    if let Some(url) = env("PROFESSOR_BASE_URL") {
        config.llm.base_url = Some(url);
        touched = true;
    }
    if let Some(secs) = env("PROFESSOR_TIMEOUT_SECS") {
        config.llm.request_timeout_secs = parse_env("PROFESSOR_TIMEOUT_SECS", &secs)?;
        touched = true;
    }
    if let Some(dir) = env("PROFESSOR_DATA_DIR") {
        config.storage.data_dir = Some(PathBuf::from(dir));
        touched = true;
    }
    if let Some(url) = env("PROFESSOR_SUPABASE_URL") {
        config.storage.supabase_url = Some(url);
        touched = true;
    }
    if let Some(key) = env("PROFESSOR_SUPABASE_ANON_KEY") {
        config.storage.supabase_anon_key = Some(key);
        touched = true;
    }
    if let Some(seed) = env("PROFESSOR_SEED") {
        config.animation.seed = Some(parse_env("PROFESSOR_SEED", &seed)?);
        touched = true;
    }

    if touched {
        config.set_source(ConfigSource::Env);
    }
    Ok(())
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Provider override
    pub provider: Option<LlmProvider>,

    /// Model override
    pub model: Option<String>,

    /// Base URL override
    pub base_url: Option<String>,

    /// Request timeout override (seconds)
    pub request_timeout_secs: Option<u64>,

    /// Data directory override
    pub data_dir: Option<PathBuf>,

    /// Seed override
    pub seed: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set provider override
    #[must_use]
    pub fn with_provider(mut self, provider: LlmProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set model override
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }

    /// Set base URL override
    #[must_use]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set request timeout override
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Set data directory override
    #[must_use]
    pub fn with_data_dir(mut self, dir: PathBuf) -> Self {
        self.data_dir = Some(dir);
        self
    }

    /// Set seed override
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn is_empty(&self) -> bool {
        self.provider.is_none()
            && self.model.is_none()
            && self.base_url.is_none()
            && self.request_timeout_secs.is_none()
            && self.data_dir.is_none()
            && self.seed.is_none()
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut ProfessorConfig) {
        if self.is_empty() {
            return;
        }
        config.set_source(ConfigSource::Cli);

        if let Some(provider) = self.provider {
            config.llm.provider = provider;
        }
        if let Some(ref model) = self.model {
            config.llm.model = Some(model.clone());
        }
        if let Some(ref url) = self.base_url {
            config.llm.base_url = Some(url.clone());
        }
        if let Some(secs) = self.request_timeout_secs {
            config.llm.request_timeout_secs = secs;
        }
        if let Some(ref dir) = self.data_dir {
            config.storage.data_dir = Some(dir.clone());
        }
        if let Some(seed) = self.seed {
            config.animation.seed = Some(seed);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
