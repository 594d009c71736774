//! Render-ready snapshots of a battle. Building one never mutates the session.

use crate::battle::state::{BattlePhase, LogEntry};
use crate::combatant::Combatant;
use schema::{ActionTag, ItemId, Side, StatusId, TurnState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantSummary {
    pub name: String,
    pub level: u32,
    pub health: f64,
    pub health_max: f64,
    pub energy: f64,
    pub energy_max: f64,
    pub weapon: ItemId,
    pub cooldown: u32,
    pub durability: Option<u32>,
    pub ammo: usize,
    pub shield: Option<ItemId>,
    pub turn_state: TurnState,
    pub statuses: Vec<(StatusId, u32)>,
}

impl From<&Combatant> for CombatantSummary {
    fn from(combatant: &Combatant) -> Self {
        Self {
            name: combatant.name.clone(),
            level: combatant.level,
            health: combatant.stats.health,
            health_max: combatant.stats.health_max,
            energy: combatant.stats.energy,
            energy_max: combatant.stats.energy_max,
            weapon: combatant.weapon.item.clone(),
            cooldown: combatant.weapon.cooldown,
            durability: combatant.weapon.durability,
            ammo: combatant.weapon.ammo.len(),
            shield: combatant.shield.as_ref().map(|shield| shield.item.clone()),
            turn_state: combatant.turn_state,
            statuses: combatant
                .statuses
                .iter()
                .map(|status| (status.effect.clone(), status.remaining))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TerminalOutcome {
    Victory {
        /// Enemy health ended below zero.
        overkill: bool,
        enemy_health: f64,
        exp_before: f64,
        exp_after: f64,
        loot: Vec<(ItemId, u32)>,
    },
    Defeat {
        user_health: f64,
    },
}

impl TerminalOutcome {
    pub fn is_victory(&self) -> bool {
        matches!(self, TerminalOutcome::Victory { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub turn: u32,
    pub owner: Side,
    pub phase: BattlePhase,
    pub user: CombatantSummary,
    pub enemy: CombatantSummary,
    pub log: Vec<LogEntry>,
    pub staged: Vec<ActionTag>,
    pub available: Vec<ActionTag>,
    pub terminal: Option<TerminalOutcome>,
}

impl ViewModel {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Result of a turn-end request.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Continue(ViewModel),
    Terminal(TerminalOutcome),
}
