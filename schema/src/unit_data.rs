use crate::{ItemId, StatusId, UnitId};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub health: f64,
    pub health_max: f64,
    pub energy: f64,
    pub energy_max: f64,
    #[serde(default)]
    pub strength: f64,
    #[serde(default)]
    pub defense: f64,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HP {:.2}/{:.2}, EN {:.2}/{:.2}",
            self.health, self.health_max, self.energy, self.energy_max
        )
    }
}

/// Template an NPC combatant is spawned from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitData {
    pub id: UnitId,
    pub level: u32,
    /// Rarity ratio; also scales the experience reward.
    pub ratio: f64,
    pub stats: Stats,
    #[serde(default)]
    pub weapon: Option<ItemId>,
    #[serde(default)]
    pub shield: Option<ItemId>,
    #[serde(default)]
    pub items: Vec<(ItemId, u32)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum StatusKind {
    /// Restores `magnitude` health per tick.
    Regeneration,
    /// Deals `magnitude` damage per tick.
    Poison,
    /// Restores `magnitude` energy per tick.
    Energize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffectData {
    pub id: StatusId,
    pub kind: StatusKind,
}
