//! Runtime configuration
//!
//! Read once at startup from environment variables. Missing keys disable the
//! matching collaborator; malformed values are a startup error.

use std::time::Duration;

use thiserror::Error;

use crate::estimation::PortionStrategy;
use crate::nutrition::DEFAULT_LOOKUP_TIMEOUT;
use crate::vision::DEFAULT_VISION_MODEL;

pub const USDA_API_KEY: &str = "USDA_API_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const VISION_MODEL_VAR: &str = "CALCAM_VISION_MODEL";
pub const LOOKUP_TIMEOUT_VAR: &str = "CALCAM_LOOKUP_TIMEOUT_MS";
pub const VISION_TIMEOUT_VAR: &str = "CALCAM_VISION_TIMEOUT_MS";
pub const PORTION_STRATEGY_VAR: &str = "CALCAM_PORTION_STRATEGY";

pub const DEFAULT_VISION_TIMEOUT: Duration = Duration::from_millis(30_000);

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} must be a positive number of milliseconds, got '{value}'")]
    Timeout { var: &'static str, value: String },

    #[error("{var} must be 'reference_object' or 'portion_factor', got '{value}'")]
    Strategy { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub usda_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub vision_model: String,
    pub lookup_timeout: Duration,
    pub vision_timeout: Duration,
    pub portion_strategy: PortionStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            usda_api_key: None,
            openai_api_key: None,
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            vision_timeout: DEFAULT_VISION_TIMEOUT,
            portion_strategy: PortionStrategy::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let portion_strategy = match get(PORTION_STRATEGY_VAR) {
            Some(value) => PortionStrategy::parse(&value).ok_or(ConfigError::Strategy {
                var: PORTION_STRATEGY_VAR,
                value,
            })?,
            None => defaults.portion_strategy,
        };

        Ok(Self {
            usda_api_key: get(USDA_API_KEY),
            openai_api_key: get(OPENAI_API_KEY),
            vision_model: get(VISION_MODEL_VAR).unwrap_or(defaults.vision_model),
            lookup_timeout: parse_timeout(LOOKUP_TIMEOUT_VAR, get(LOOKUP_TIMEOUT_VAR))?
                .unwrap_or(defaults.lookup_timeout),
            vision_timeout: parse_timeout(VISION_TIMEOUT_VAR, get(VISION_TIMEOUT_VAR))?
                .unwrap_or(defaults.vision_timeout),
            portion_strategy,
        })
    }
}

fn parse_timeout(var: &'static str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Some(Duration::from_millis(ms))),
        _ => Err(ConfigError::Timeout { var, value }),
    }
}
