//! Verification configuration.
//!
//! A [`VerificationConfig`] comes from one of three places:
//! - a mode preset (`disabled`, `minimal`, `strict`) selected by environment,
//! - the documented default plus scalar environment overrides,
//! - an explicit YAML/JSON document loaded with [`VerificationConfig::from_file`].
//!
//! Sets are stored as `BTreeSet` so rendered prompts and serialized configs
//! have a stable order.

mod resolver;

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ChallengeCategory, FallbackBehavior, InspectionPattern, Level, TriggerMode};

pub use resolver::{
    reset_verification_config, resolve_verification_config, ConfigProvider, ConfigResolver,
    VerificationMode, ENV_MAX_DEPTH, ENV_MIN_CONFIDENCE, ENV_MODE,
};

/// Upper bound for `max_verification_depth` overrides.
pub const MAX_DEPTH_CEILING: u32 = 5;

/// Errors that can occur when loading an explicit config document.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Challenger settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengerConfig {
    /// Reports below this confidence are not worth challenging; they are
    /// already distrusted and only go to the Inspector
    pub min_confidence_to_challenge: f64,

    /// Minimum number of flaws the Challenger must raise
    pub required_flaws: u32,

    pub enabled_categories: BTreeSet<ChallengeCategory>,
}

impl Default for ChallengerConfig {
    fn default() -> Self {
        Self {
            min_confidence_to_challenge: 0.5,
            required_flaws: 1,
            enabled_categories: ChallengeCategory::ALL.into_iter().collect(),
        }
    }
}

/// Inspector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    pub suspicion_threshold: Level,

    /// Patterns the Inspector must check; also selects which local detectors run
    pub required_patterns: BTreeSet<InspectionPattern>,

    /// Let local pattern detections fire verification on their own
    pub auto_trigger_on_collapse_signals: bool,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            suspicion_threshold: Level::Medium,
            required_patterns: InspectionPattern::ALL.into_iter().collect(),
            auto_trigger_on_collapse_signals: true,
        }
    }
}

/// Complete verification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    pub enabled: bool,

    pub trigger_modes: BTreeSet<TriggerMode>,

    pub challenger_config: ChallengerConfig,

    pub inspector_config: InspectorConfig,

    pub fallback_behavior: FallbackBehavior,

    /// Re-verification rounds allowed before forcing human review (>= 1)
    pub max_verification_depth: u32,

    /// Confidence at or above which low-risk outputs skip verification, in [0, 1]
    pub min_confidence_to_skip_verification: f64,
}

impl Default for VerificationConfig {
    /// The documented default ("auto" mode).
    fn default() -> Self {
        Self {
            enabled: true,
            trigger_modes: [
                TriggerMode::PostSubagent,
                TriggerMode::LowConfidence,
                TriggerMode::HighStakes,
            ]
            .into_iter()
            .collect(),
            challenger_config: ChallengerConfig::default(),
            inspector_config: InspectorConfig::default(),
            fallback_behavior: FallbackBehavior::Warn,
            max_verification_depth: 2,
            min_confidence_to_skip_verification: 0.9,
        }
    }
}

impl VerificationConfig {
    /// Preset with verification switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Preset that only verifies high-stakes tasks.
    pub fn minimal() -> Self {
        Self {
            trigger_modes: [TriggerMode::HighStakes].into_iter().collect(),
            min_confidence_to_skip_verification: 0.7,
            fallback_behavior: FallbackBehavior::Warn,
            ..Self::default()
        }
    }

    /// Preset with every trigger enabled and blocking on critical flaws.
    pub fn strict() -> Self {
        Self {
            trigger_modes: TriggerMode::ALL.into_iter().collect(),
            min_confidence_to_skip_verification: 0.95,
            fallback_behavior: FallbackBehavior::Block,
            challenger_config: ChallengerConfig {
                required_flaws: 2,
                ..ChallengerConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn is_mode_enabled(&self, mode: TriggerMode) -> bool {
        self.trigger_modes.contains(&mode)
    }

    /// Parse a config document from YAML. Missing fields take default values.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config document from JSON. Missing fields take default values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config document, choosing the parser by file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Check the invariants every config must hold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_confidence_to_skip_verification) {
            return Err(ConfigError::ValidationError(format!(
                "min_confidence_to_skip_verification must be within [0, 1], got {}",
                self.min_confidence_to_skip_verification
            )));
        }

        if self.max_verification_depth < 1 {
            return Err(ConfigError::ValidationError(
                "max_verification_depth must be at least 1".to_string(),
            ));
        }

        if self.challenger_config.required_flaws < 1 {
            return Err(ConfigError::ValidationError(
                "challenger_config.required_flaws must be at least 1".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.challenger_config.min_confidence_to_challenge) {
            return Err(ConfigError::ValidationError(format!(
                "challenger_config.min_confidence_to_challenge must be within [0, 1], got {}",
                self.challenger_config.min_confidence_to_challenge
            )));
        }

        Ok(())
    }
}
