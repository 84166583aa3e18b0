//! Configuration loading and typed config structures for the freeze tag
//! environment.
//!
//! The canonical configuration lives in `freezetag-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads and validates the file.
//! Every section is optional; anything omitted takes the tuned default.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use freezetag_agents::{MovementConfig, RewardConfig, RulesConfig};
use freezetag_types::Behavior;
use freezetag_world::{Arena, WorldError};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The values parsed but cannot be used.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

impl From<WorldError> for ConfigError {
    fn from(err: WorldError) -> Self {
        Self::Invalid {
            reason: err.to_string(),
        }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `freezetag-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Seed, timing, and arena.
    #[serde(default)]
    pub world: WorldConfig,

    /// Manually configured episode parameters.
    #[serde(default)]
    pub manual: ManualConfig,

    /// Reward magnitudes.
    #[serde(default)]
    pub rewards: RewardConfig,

    /// Interaction distances and durations.
    #[serde(default)]
    pub rules: RulesConfig,

    /// Action-to-motion tuning.
    #[serde(default)]
    pub movement: MovementConfig,

    /// Body and item templates.
    #[serde(default)]
    pub templates: TemplatesConfig,

    /// Training loop settings.
    #[serde(default)]
    pub training: TrainingConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `FREEZETAG_SEED` overrides `world.seed` when set to an integer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values fail validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values fail validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.world.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.tick_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "world.tick_ms must be at least 1".to_owned(),
            });
        }
        self.world.arena.validate()?;
        let rules = &self.rules;
        for (name, value) in [
            ("rules.rescue_radius", rules.rescue_radius),
            ("rules.contact_radius", rules.contact_radius),
            ("rules.pickup_radius", rules.pickup_radius),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    reason: format!("{name} must be a non-negative number"),
                });
            }
        }
        Ok(())
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Random seed for spawn placement and the initial unfreeze.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Simulated milliseconds per tick.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Real-time milliseconds to sleep between ticks; zero runs flat out.
    #[serde(default)]
    pub tick_interval_ms: u64,

    /// Simulated milliseconds between termination and the next reset.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Play area bounds and spawn placement.
    #[serde(default)]
    pub arena: Arena,
}

impl WorldConfig {
    /// Override the seed from `FREEZETAG_SEED` when it holds an integer.
    pub fn apply_env_overrides(&mut self) {
        if let Some(seed) = std::env::var("FREEZETAG_SEED")
            .ok()
            .and_then(|val| val.trim().parse().ok())
        {
            self.seed = seed;
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            tick_ms: default_tick_ms(),
            tick_interval_ms: 0,
            settle_delay_ms: default_settle_delay_ms(),
            arena: Arena::default(),
        }
    }
}

/// Episode parameters used when no curriculum applies.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManualConfig {
    /// Use these values even when a curriculum source is attached.
    #[serde(default)]
    pub override_level: bool,

    /// Level index (1 = pursuit, anything else = forage).
    #[serde(default)]
    pub level_index: i64,

    /// Runners to spawn.
    #[serde(default = "default_num_runners")]
    pub num_runners: u32,

    /// Taggers to spawn at the pursuit level.
    #[serde(default = "default_num_taggers")]
    pub num_taggers: u32,

    /// Food pool capacity.
    #[serde(default = "default_num_foodballs")]
    pub num_foodballs: u32,

    /// Freeze charge pool capacity.
    #[serde(default = "default_num_freezeballs")]
    pub num_freezeballs: u32,

    /// Episode time limit in seconds.
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: f64,
}

impl Default for ManualConfig {
    fn default() -> Self {
        Self {
            override_level: false,
            level_index: 0,
            num_runners: default_num_runners(),
            num_taggers: default_num_taggers(),
            num_foodballs: default_num_foodballs(),
            num_freezeballs: default_num_freezeballs(),
            time_limit_secs: default_time_limit_secs(),
        }
    }
}

/// A body template: what the physics subsystem instantiates for an agent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BodyTemplate {
    /// Template name passed to the physics backend.
    pub name: String,

    /// Where agents built from this template get their actions.
    #[serde(default)]
    pub behavior: Behavior,
}

impl BodyTemplate {
    /// A learned-policy template with the given name.
    pub fn learned(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            behavior: Behavior::Learned,
        }
    }
}

/// Templates for everything the controller spawns. An unset template
/// aborts the matching spawns with a warning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplatesConfig {
    /// Runner body.
    #[serde(default = "default_runner_template")]
    pub runner: Option<BodyTemplate>,

    /// Tagger body.
    #[serde(default = "default_tagger_template")]
    pub tagger: Option<BodyTemplate>,

    /// Food item.
    #[serde(default = "default_food_template")]
    pub food: Option<String>,

    /// Freeze charge item.
    #[serde(default = "default_charge_template")]
    pub freeze_charge: Option<String>,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            runner: default_runner_template(),
            tagger: default_tagger_template(),
            food: default_food_template(),
            freeze_charge: default_charge_template(),
        }
    }
}

/// Training loop settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TrainingConfig {
    /// Episodes to play before stopping; zero means unlimited.
    #[serde(default)]
    pub max_episodes: u64,

    /// Optional lesson schedule file.
    #[serde(default)]
    pub curriculum: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_tick_ms() -> u64 {
    20
}

const fn default_settle_delay_ms() -> u64 {
    500
}

const fn default_num_runners() -> u32 {
    5
}

const fn default_num_taggers() -> u32 {
    1
}

const fn default_num_foodballs() -> u32 {
    10
}

const fn default_num_freezeballs() -> u32 {
    5
}

const fn default_time_limit_secs() -> f64 {
    60.0
}

fn default_runner_template() -> Option<BodyTemplate> {
    Some(BodyTemplate::learned("runner"))
}

fn default_tagger_template() -> Option<BodyTemplate> {
    Some(BodyTemplate::learned("tagger"))
}

fn default_food_template() -> Option<String> {
    Some("food".to_owned())
}

fn default_charge_template() -> Option<String> {
    Some("freeze_charge".to_owned())
}

fn default_log_level() -> String {
    "info".to_owned()
}
