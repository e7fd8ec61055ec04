//! Progression configuration types.
//!
//! Integrators configure the engine at startup by providing:
//! - `EngineConfig`: Click economics and per-request limits
//! - `EnergyConfig`: Capacity and regeneration rate for new states
//! - `RateLimitConfig`: Fixed-window request limits per client
//! - `GameConfig`: Combines all configuration
//!
//! All types deserialize from TOML with every field optional:
//!
//! ```
//! use card_progression::core::GameConfig;
//!
//! let config = GameConfig::from_toml_str(r#"
//!     [engine]
//!     progress_per_click = 5
//!
//!     [energy]
//!     max_energy = 200
//! "#).unwrap();
//!
//! assert_eq!(config.engine.progress_per_click, 5);
//! assert_eq!(config.engine.energy_per_click, 1); // default
//! assert_eq!(config.energy.max_energy, 200);
//! ```

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Click economics and request limits for the progression engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Energy debited per click (default: 1).
    pub energy_per_click: u32,

    /// Progress granted per click (default: 2).
    pub progress_per_click: u32,

    /// Maximum clicks accepted by a single upgrade request (default: 50).
    pub max_clicks: u32,

    /// Maximum clicks accepted by a batch upgrade request (default: 100).
    pub max_batch_clicks: u32,

    /// Maximum energy a direct spend request may consume (default: 100).
    pub max_energy_spend: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            energy_per_click: 1,
            progress_per_click: 2,
            max_clicks: 50,
            max_batch_clicks: 100,
            max_energy_spend: 100,
        }
    }
}

impl EngineConfig {
    /// Set energy cost per click.
    #[must_use]
    pub fn with_energy_per_click(mut self, energy: u32) -> Self {
        self.energy_per_click = energy;
        self
    }

    /// Set progress gained per click.
    #[must_use]
    pub fn with_progress_per_click(mut self, progress: u32) -> Self {
        self.progress_per_click = progress;
        self
    }

    /// Set the single-request click limit.
    #[must_use]
    pub fn with_max_clicks(mut self, clicks: u32) -> Self {
        self.max_clicks = clicks;
        self
    }

    /// Set the batch-request click limit.
    #[must_use]
    pub fn with_max_batch_clicks(mut self, clicks: u32) -> Self {
        self.max_batch_clicks = clicks;
        self
    }

    /// Check that every limit and rate is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("engine.energy_per_click", self.energy_per_click),
            ("engine.progress_per_click", self.progress_per_click),
            ("engine.max_clicks", self.max_clicks),
            ("engine.max_batch_clicks", self.max_batch_clicks),
            ("engine.max_energy_spend", self.max_energy_spend),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be positive".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Energy parameters for freshly created states.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Energy capacity (default: 100).
    pub max_energy: u32,

    /// Starting energy (default: full).
    pub initial_energy: Option<u32>,

    /// Energy regenerated per second (default: 1.0).
    pub regen_rate: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            max_energy: 100,
            initial_energy: None,
            regen_rate: 1.0,
        }
    }
}

impl EnergyConfig {
    /// Set energy capacity.
    #[must_use]
    pub fn with_max_energy(mut self, max: u32) -> Self {
        self.max_energy = max;
        self
    }

    /// Set starting energy.
    #[must_use]
    pub fn with_initial_energy(mut self, energy: u32) -> Self {
        self.initial_energy = Some(energy);
        self
    }

    /// Set regeneration rate.
    #[must_use]
    pub fn with_regen_rate(mut self, rate: f64) -> Self {
        self.regen_rate = rate;
        self
    }

    /// Starting energy, clamped to capacity.
    #[must_use]
    pub fn starting_energy(&self) -> u32 {
        self.initial_energy.unwrap_or(self.max_energy).min(self.max_energy)
    }

    /// Check capacity and rate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_energy == 0 {
            return Err(ConfigError::Invalid {
                field: "energy.max_energy",
                reason: "must be positive".to_string(),
            });
        }
        if !self.regen_rate.is_finite() || self.regen_rate < 0.0 {
            return Err(ConfigError::Invalid {
                field: "energy.regen_rate",
                reason: format!("must be a finite non-negative number, got {}", self.regen_rate),
            });
        }
        Ok(())
    }
}

/// Fixed-window rate limit parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Window length in milliseconds (default: 60 000).
    pub window_millis: u64,

    /// Requests allowed per client per window (default: 30).
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_millis: 60_000,
            max_requests: 30,
        }
    }
}

impl RateLimitConfig {
    /// Check window and quota.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_millis == 0 {
            return Err(ConfigError::Invalid {
                field: "rate_limit.window_millis",
                reason: "must be positive".to_string(),
            });
        }
        if self.max_requests == 0 {
            return Err(ConfigError::Invalid {
                field: "rate_limit.max_requests",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Complete configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub engine: EngineConfig,
    pub energy: EnergyConfig,
    pub rate_limit: RateLimitConfig,
}

impl GameConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the engine configuration.
    #[must_use]
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Set the energy configuration.
    #[must_use]
    pub fn with_energy(mut self, energy: EnergyConfig) -> Self {
        self.energy = energy;
        self
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.energy.validate()?;
        self.rate_limit.validate()
    }
}
