//! # Advisor Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     KASIR_API_KEY=...                                                  │
//! │     KASIR_ORACLE_MODEL=gemini-2.5-flash                                │
//! │     KASIR_ORACLE_ENDPOINT=https://...                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/kasir-pos/advisor.toml (Linux)                           │
//! │     ~/Library/Application Support/id.kasir.pos/advisor.toml (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # advisor.toml
//! [oracle]
//! endpoint = "https://generativelanguage.googleapis.com/v1beta"
//! model = "gemini-2.5-flash"
//! timeout_secs = 30
//!
//! [recommendations]
//! debounce_ms = 1500
//! max_suggestions = 3
//!
//! [analyst]
//! recent_transactions = 10
//! ```
//!
//! The API key is normally left out of the file and supplied through
//! `KASIR_API_KEY`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{AdvisorError, AdvisorResult};

// =============================================================================
// Oracle Settings
// =============================================================================

/// Where and how to reach the generative-AI service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSettings {
    /// Base URL of the REST API (without the `/models/...` suffix).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for OracleSettings {
    fn default() -> Self {
        OracleSettings {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl OracleSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// True when a non-blank API key is configured.
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

// =============================================================================
// Recommendation & Analyst Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationSettings {
    /// Quiet period after the last cart edit before the oracle is asked.
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,

    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

fn default_debounce() -> u64 {
    1500
}

fn default_max_suggestions() -> usize {
    3
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        RecommendationSettings {
            debounce_ms: default_debounce(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

impl RecommendationSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalystSettings {
    /// How many recent sales the analyst sees.
    #[serde(default = "default_recent_transactions")]
    pub recent_transactions: usize,
}

fn default_recent_transactions() -> usize {
    10
}

impl Default for AnalystSettings {
    fn default() -> Self {
        AnalystSettings {
            recent_transactions: default_recent_transactions(),
        }
    }
}

// =============================================================================
// Main Advisor Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default)]
    pub oracle: OracleSettings,

    #[serde(default)]
    pub recommendations: RecommendationSettings,

    #[serde(default)]
    pub analyst: AnalystSettings,
}

impl AdvisorConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (advisor.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> AdvisorResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!(?path, "Advisor config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load advisor config: {}. Using defaults.", e);
            let mut config = Self::default();
            config.apply_env_overrides();
            if config.validate().is_err() {
                return Self::default();
            }
            config
        })
    }

    fn from_file(path: &Path) -> AdvisorResult<Self> {
        info!(?path, "Loading advisor config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AdvisorResult<()> {
        let endpoint = Url::parse(&self.oracle.endpoint)?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(AdvisorError::InvalidUrl(format!(
                "endpoint must start with http:// or https://, got: {}",
                self.oracle.endpoint
            )));
        }

        if self.oracle.model.trim().is_empty() {
            return Err(AdvisorError::InvalidConfig("model must not be empty".into()));
        }

        if self.oracle.timeout_secs == 0 {
            return Err(AdvisorError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.recommendations.debounce_ms == 0 {
            return Err(AdvisorError::InvalidConfig(
                "debounce_ms must be greater than 0".into(),
            ));
        }

        if self.recommendations.max_suggestions == 0 {
            return Err(AdvisorError::InvalidConfig(
                "max_suggestions must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `KASIR_*` overrides from `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("KASIR_API_KEY") {
            debug!("Using oracle API key from environment");
            self.oracle.api_key = Some(key);
        }

        if let Some(model) = lookup("KASIR_ORACLE_MODEL") {
            debug!(model = %model, "Overriding oracle model from environment");
            self.oracle.model = model;
        }

        if let Some(endpoint) = lookup("KASIR_ORACLE_ENDPOINT") {
            debug!(endpoint = %endpoint, "Overriding oracle endpoint from environment");
            self.oracle.endpoint = endpoint;
        }

        if let Some(timeout) = lookup("KASIR_ORACLE_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.oracle.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring invalid KASIR_ORACLE_TIMEOUT_SECS"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("id", "kasir", "pos")
            .map(|dirs| dirs.config_dir().join("advisor.toml"))
    }
}
