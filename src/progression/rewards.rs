use crate::battle::state::BattleRng;
use crate::combatant::Combatant;
use crate::config::BattleConfig;
use crate::content::Catalog;
use crate::errors::ContentResult;
use schema::{ItemId, UnitData};
use serde::{Deserialize, Serialize};

/// What a won battle paid out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub exp_gained: f64,
    /// Aggregated draws in first-draw order.
    pub loot: Vec<(ItemId, u32)>,
}

/// Computes experience and loot for defeating a unit.
pub struct RewardCalculator<'a> {
    catalog: &'a Catalog,
    config: &'a BattleConfig,
}

impl<'a> RewardCalculator<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a BattleConfig) -> Self {
        Self { catalog, config }
    }

    /// Formula: level × (1 + ratio) × exp_factor
    pub fn experience(&self, unit: &UnitData) -> f64 {
        f64::from(unit.level) * (1.0 + unit.ratio) * self.config.exp_factor
    }

    /// Number of loot draws: floor(uniform(level × min, level × max)) + 1
    pub fn loot_draws(&self, level: u32, rng: &mut BattleRng) -> u32 {
        let low = f64::from(level) * self.config.loot.min_factor;
        let high = f64::from(level) * self.config.loot.max_factor;
        let roll = rng.next_roll("loot count");
        (low + roll * (high - low)).floor() as u32 + 1
    }

    /// Draws with replacement from the battle-droppable items.
    pub fn roll_loot(&self, level: u32, rng: &mut BattleRng) -> Vec<(ItemId, u32)> {
        let pool = self.catalog.battle_drops();
        if pool.is_empty() {
            return Vec::new();
        }

        let draws = self.loot_draws(level, rng);
        let mut loot: Vec<(ItemId, u32)> = Vec::new();
        for _ in 0..draws {
            let index = ((rng.next_roll("loot item") * pool.len() as f64) as usize).min(pool.len() - 1);
            let item = &pool[index].id;
            match loot.iter_mut().find(|(id, _)| id == item) {
                Some((_, amount)) => *amount += 1,
                None => loot.push((item.clone(), 1)),
            }
        }
        loot
    }

    /// Grants experience once and adds the rolled loot to the user's inventory.
    pub fn apply_victory(
        &self,
        user: &mut Combatant,
        unit: &UnitData,
        rng: &mut BattleRng,
    ) -> ContentResult<Reward> {
        let exp_gained = self.experience(unit);
        user.exp += exp_gained;

        let loot = self.roll_loot(unit.level, rng);
        for (item, amount) in &loot {
            user.give_item(self.catalog, item, *amount)?;
        }
        tracing::info!(exp = exp_gained, drops = loot.len(), "rewards granted");
        Ok(Reward { exp_gained, loot })
    }
}
