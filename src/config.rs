//! Tunable battle rules.
//!
//! Everything here has a sensible default; a RON file can override any
//! subset of fields:
//!
//! ```ron
//! (
//!     costs: (attack: 3.0),
//!     evasion_chance: 0.4,
//! )
//! ```

use crate::errors::ConfigError;
use schema::ActionTag;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Energy cost of each action kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionCosts {
    pub attack: f64,
    pub evasion: f64,
    pub shield: f64,
    pub consume: f64,
    pub reload: f64,
    pub swap: f64,
}

impl Default for ActionCosts {
    fn default() -> Self {
        Self {
            attack: 5.0,
            evasion: 3.0,
            shield: 2.0,
            consume: 1.0,
            reload: 2.0,
            swap: 2.0,
        }
    }
}

impl ActionCosts {
    pub fn for_tag(&self, tag: ActionTag) -> f64 {
        match tag {
            ActionTag::Attack => self.attack,
            ActionTag::Evasion => self.evasion,
            ActionTag::Shield => self.shield,
            ActionTag::Consume => self.consume,
            ActionTag::Reload => self.reload,
            ActionTag::Swap => self.swap,
        }
    }
}

/// Loot draw count is `floor(uniform(level * min_factor, level * max_factor)) + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootRules {
    pub min_factor: f64,
    pub max_factor: f64,
}

impl Default for LootRules {
    fn default() -> Self {
        Self {
            min_factor: 1.0,
            max_factor: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub costs: ActionCosts,
    /// Chance that an attack against an evading target misses.
    pub evasion_chance: f64,
    pub loot: LootRules,
    /// Experience is `level * (1 + ratio) * exp_factor`.
    pub exp_factor: f64,
    /// Keep only the newest entries in the battle log. `None` keeps all.
    pub log_capacity: Option<usize>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            costs: ActionCosts::default(),
            evasion_chance: 0.5,
            loot: LootRules::default(),
            exp_factor: 10.0,
            log_capacity: None,
        }
    }
}

impl BattleConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: BattleConfig =
            ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_ron_str(&source)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.evasion_chance) {
            return Err(ConfigError::Invalid(format!(
                "evasion_chance must be within 0..=1, got {}",
                self.evasion_chance
            )));
        }
        if self.loot.min_factor < 0.0 || self.loot.max_factor < self.loot.min_factor {
            return Err(ConfigError::Invalid(format!(
                "loot factors must satisfy 0 <= min <= max, got {}..{}",
                self.loot.min_factor, self.loot.max_factor
            )));
        }
        let costs = &self.costs;
        let all_costs = [
            costs.attack,
            costs.evasion,
            costs.shield,
            costs.consume,
            costs.reload,
            costs.swap,
        ];
        if all_costs.iter().any(|cost| *cost < 0.0) {
            return Err(ConfigError::Invalid("action costs cannot be negative".to_string()));
        }
        Ok(())
    }
}
