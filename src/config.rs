//! Engine configuration.
//!
//! Values are resolved once at startup and passed into the engine. Request handling
//! never reads the process environment.

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Triage Engine";
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Attribution recorded on every rationale.
pub const RULESET_LABEL: &str = "rule-based triage synthesis (keyword ruleset v1)";

/// Environment variable names read by [`TriageConfig::from_env`].
pub const ENV_REGISTERED_CONFIDENCE: &str = "TRIAGE_REGISTERED_CONFIDENCE";
pub const ENV_UNREGISTERED_CONFIDENCE: &str = "TRIAGE_UNREGISTERED_CONFIDENCE";
pub const ENV_MAX_INPUT_LENGTH: &str = "TRIAGE_MAX_INPUT_LENGTH";

pub const DEFAULT_REGISTERED_CONFIDENCE: f32 = 0.92;
pub const DEFAULT_UNREGISTERED_CONFIDENCE: f32 = 0.45;
/// Maximum symptom text length in bytes after sanitization.
pub const DEFAULT_MAX_INPUT_LENGTH: usize = 2_000;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "triage_engine=debug,warn"
    } else {
        "triage_engine=info,warn"
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be within [0, 1], got {value}")]
    ConfidenceOutOfRange { name: &'static str, value: f32 },

    #[error("{name} is not a valid number: {value:?}")]
    NotANumber { name: &'static str, value: String },

    #[error("max input length must be greater than zero")]
    ZeroInputLength,
}

/// Tunables for a [`crate::triage::TriageEngine`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriageConfig {
    registered_confidence: f32,
    unregistered_confidence: f32,
    max_input_length: usize,
}

impl TriageConfig {
    pub fn new(
        registered_confidence: f32,
        unregistered_confidence: f32,
        max_input_length: usize,
    ) -> Result<Self, ConfigError> {
        check_unit_interval(ENV_REGISTERED_CONFIDENCE, registered_confidence)?;
        check_unit_interval(ENV_UNREGISTERED_CONFIDENCE, unregistered_confidence)?;
        if max_input_length == 0 {
            return Err(ConfigError::ZeroInputLength);
        }

        Ok(Self {
            registered_confidence,
            unregistered_confidence,
            max_input_length,
        })
    }

    /// Build from raw environment values. `None`, empty, or whitespace-only values
    /// fall back to the defaults.
    pub fn from_env_values(
        registered_confidence: Option<String>,
        unregistered_confidence: Option<String>,
        max_input_length: Option<String>,
    ) -> Result<Self, ConfigError> {
        let registered = parse_value(ENV_REGISTERED_CONFIDENCE, registered_confidence)?
            .unwrap_or(DEFAULT_REGISTERED_CONFIDENCE);
        let unregistered = parse_value(ENV_UNREGISTERED_CONFIDENCE, unregistered_confidence)?
            .unwrap_or(DEFAULT_UNREGISTERED_CONFIDENCE);
        let max_len = parse_value(ENV_MAX_INPUT_LENGTH, max_input_length)?
            .unwrap_or(DEFAULT_MAX_INPUT_LENGTH);

        Self::new(registered, unregistered, max_len)
    }

    /// Read the process environment. Call once at startup.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_values(
            std::env::var(ENV_REGISTERED_CONFIDENCE).ok(),
            std::env::var(ENV_UNREGISTERED_CONFIDENCE).ok(),
            std::env::var(ENV_MAX_INPUT_LENGTH).ok(),
        )
    }

    pub fn registered_confidence(&self) -> f32 {
        self.registered_confidence
    }

    pub fn unregistered_confidence(&self) -> f32 {
        self.unregistered_confidence
    }

    pub fn max_input_length(&self) -> usize {
        self.max_input_length
    }
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            registered_confidence: DEFAULT_REGISTERED_CONFIDENCE,
            unregistered_confidence: DEFAULT_UNREGISTERED_CONFIDENCE,
            max_input_length: DEFAULT_MAX_INPUT_LENGTH,
        }
    }
}

fn check_unit_interval(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ConfidenceOutOfRange { name, value })
    }
}

fn parse_value<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    let Some(raw) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::NotANumber { name, value: raw })
}
