// In: src/combatant.rs

//! One side of a battle: identity, resources, equipment and status ledger.
//!
//! The user's `Combatant` doubles as the persistent user record. A battle
//! borrows it mutably, so whatever happens in the fight stays on the record.

use crate::content::Catalog;
use crate::errors::{ActionError, ContentResult};
use schema::{ItemId, StatusGrant, StatusId, StatusKind, Stats, TurnState, UnitData, FISTS, NO_WEAPON};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemId,
    pub amount: u32,
    /// Units promised to staged actions that have not committed yet.
    #[serde(skip)]
    pub reserved: u32,
}

impl ItemStack {
    pub fn new(item: ItemId, amount: u32) -> Self {
        Self {
            item,
            amount,
            reserved: 0,
        }
    }

    pub fn available(&self) -> u32 {
        self.amount.saturating_sub(self.reserved)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponEntity {
    pub item: ItemId,
    /// Turns until the weapon can attack again.
    pub cooldown: u32,
    /// Remaining uses; `None` never breaks.
    pub durability: Option<u32>,
    /// Loaded ammo, oldest first.
    #[serde(default)]
    pub ammo: Vec<ItemId>,
    /// Set while a staged action has claimed this weapon.
    #[serde(skip)]
    pub reserved: bool,
}

impl WeaponEntity {
    pub fn new(catalog: &Catalog, item: &ItemId) -> ContentResult<Self> {
        let data = catalog.weapon(item)?;
        Ok(Self {
            item: item.clone(),
            cooldown: 0,
            durability: data.durability,
            ammo: Vec::new(),
            reserved: false,
        })
    }

    /// The unbreakable fallback weapon.
    pub fn fists() -> Self {
        Self {
            item: ItemId::from(FISTS),
            cooldown: 0,
            durability: None,
            ammo: Vec::new(),
            reserved: false,
        }
    }

    /// The "cannot attack" placeholder carried by passive units.
    pub fn placeholder() -> Self {
        Self {
            item: ItemId::from(NO_WEAPON),
            ..Self::fists()
        }
    }

    pub fn is_fists(&self) -> bool {
        self.item.as_str() == FISTS
    }

    pub fn is_placeholder(&self) -> bool {
        self.item.as_str() == NO_WEAPON
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShieldEntity {
    pub item: ItemId,
    pub durability: u32,
}

impl ShieldEntity {
    pub fn new(catalog: &Catalog, item: &ItemId) -> ContentResult<Self> {
        let data = catalog.shield(item)?;
        Ok(Self {
            item: item.clone(),
            durability: data.durability,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusInstance {
    pub effect: StatusId,
    pub remaining: u32,
    pub magnitude: f64,
}

/// What a resource spend took, so it can be given back exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Payment {
    Energy(f64),
    Health(f64),
}

/// Result of applying one status instance during settlement.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTick {
    pub effect: StatusId,
    pub kind: StatusKind,
    pub amount: f64,
    pub expired: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub exp: f64,
    pub money: f64,
    pub stats: Stats,
    pub weapon: WeaponEntity,
    pub shield: Option<ShieldEntity>,
    pub items: Vec<ItemStack>,
    pub spare_weapons: Vec<WeaponEntity>,
    pub statuses: Vec<StatusInstance>,
    #[serde(skip)]
    pub turn_state: TurnState,
}

impl Combatant {
    /// A bare combatant fighting with fists.
    pub fn new(id: impl Into<String>, name: impl Into<String>, stats: Stats) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level: 1,
            exp: 0.0,
            money: 0.0,
            stats,
            weapon: WeaponEntity::fists(),
            shield: None,
            items: Vec::new(),
            spare_weapons: Vec::new(),
            statuses: Vec::new(),
            turn_state: TurnState::Default,
        }
    }

    /// Spawns an NPC from its unit template. Units without a weapon get the
    /// placeholder and never attack.
    pub fn from_unit(unit: &UnitData, catalog: &Catalog) -> ContentResult<Self> {
        let mut combatant = Self::new(unit.id.as_str(), unit.id.as_str(), unit.stats);
        combatant.level = unit.level;
        combatant.weapon = match &unit.weapon {
            Some(item) => WeaponEntity::new(catalog, item)?,
            None => WeaponEntity::placeholder(),
        };
        combatant.shield = unit
            .shield
            .as_ref()
            .map(|item| ShieldEntity::new(catalog, item))
            .transpose()?;
        for (item, amount) in &unit.items {
            combatant.give_item(catalog, item, *amount)?;
        }
        Ok(combatant)
    }

    // === Resources ===

    /// Pays `cost` from energy, or from health when energy falls short and
    /// `allow_life` is set.
    pub fn spend_energy_or_health(
        &mut self,
        cost: f64,
        allow_life: bool,
    ) -> Result<Payment, ActionError> {
        if cost <= self.stats.energy {
            self.stats.energy -= cost;
            Ok(Payment::Energy(cost))
        } else if allow_life {
            self.stats.health -= cost;
            Ok(Payment::Health(cost))
        } else {
            Err(ActionError::InsufficientResource {
                required: cost,
                available: self.stats.energy,
            })
        }
    }

    pub fn refund(&mut self, payment: Payment) {
        match payment {
            Payment::Energy(amount) => self.stats.energy += amount,
            Payment::Health(amount) => self.stats.health += amount,
        }
    }

    /// Health may go negative; the residue is the overkill.
    pub fn apply_damage(&mut self, amount: f64) {
        self.stats.health -= amount;
    }

    /// Returns the amount actually restored.
    pub fn heal(&mut self, amount: f64) -> f64 {
        let before = self.stats.health;
        self.stats.health = (self.stats.health + amount).min(self.stats.health_max);
        (self.stats.health - before).max(0.0)
    }

    /// Returns the amount actually restored.
    pub fn restore_energy(&mut self, amount: f64) -> f64 {
        let before = self.stats.energy;
        self.stats.energy = (self.stats.energy + amount).min(self.stats.energy_max);
        (self.stats.energy - before).max(0.0)
    }

    pub fn is_defeated(&self) -> bool {
        self.stats.health <= 0.0
    }

    // === Settlement ===

    /// One turn passes for every weapon this combatant owns.
    pub fn tick_cooldowns(&mut self) {
        self.weapon.cooldown = self.weapon.cooldown.saturating_sub(1);
        for weapon in &mut self.spare_weapons {
            weapon.cooldown = weapon.cooldown.saturating_sub(1);
        }
    }

    /// Applies every active status once, then shortens it by one turn and
    /// drops the expired ones. Unknown effects only lose duration.
    pub fn tick_statuses(&mut self, catalog: &Catalog) -> Vec<StatusTick> {
        let mut ticks = Vec::with_capacity(self.statuses.len());
        let mut ledger = std::mem::take(&mut self.statuses);

        for status in &mut ledger {
            status.remaining = status.remaining.saturating_sub(1);
            let expired = status.remaining == 0;

            match catalog.status(&status.effect) {
                Ok(data) => {
                    let amount = match data.kind {
                        StatusKind::Regeneration => self.heal(status.magnitude),
                        StatusKind::Energize => self.restore_energy(status.magnitude),
                        StatusKind::Poison => {
                            self.apply_damage(status.magnitude);
                            status.magnitude
                        }
                    };
                    ticks.push(StatusTick {
                        effect: status.effect.clone(),
                        kind: data.kind,
                        amount,
                        expired,
                    });
                }
                Err(err) => tracing::warn!(combatant = %self.name, "skipping status tick: {}", err),
            }
        }

        ledger.retain(|status| status.remaining > 0);
        self.statuses = ledger;
        ticks
    }

    /// Adds a status, or refreshes it if already present.
    pub fn apply_status(&mut self, grant: &StatusGrant) {
        if grant.duration == 0 {
            return;
        }
        match self.statuses.iter_mut().find(|s| s.effect == grant.effect) {
            Some(existing) => {
                existing.remaining = existing.remaining.max(grant.duration);
                existing.magnitude = grant.magnitude;
            }
            None => self.statuses.push(StatusInstance {
                effect: grant.effect.clone(),
                remaining: grant.duration,
                magnitude: grant.magnitude,
            }),
        }
    }

    // === Equipment & inventory ===

    /// Replaces a broken weapon with fists and returns the broken item.
    pub fn break_weapon(&mut self) -> ItemId {
        std::mem::replace(&mut self.weapon, WeaponEntity::fists()).item
    }

    pub fn stack(&self, item: &ItemId) -> Option<&ItemStack> {
        self.items.iter().find(|stack| &stack.item == item)
    }

    pub fn stack_mut(&mut self, item: &ItemId) -> Option<&mut ItemStack> {
        self.items.iter_mut().find(|stack| &stack.item == item)
    }

    /// Units of `item` not yet claimed by a staged action.
    pub fn available(&self, item: &ItemId) -> u32 {
        self.stack(item).map_or(0, ItemStack::available)
    }

    /// Removes up to `amount` units and drops the stack when it runs out.
    /// Returns what is left.
    pub fn take_items(&mut self, item: &ItemId, amount: u32) -> u32 {
        let Some(index) = self.items.iter().position(|stack| &stack.item == item) else {
            return 0;
        };
        let stack = &mut self.items[index];
        stack.amount = stack.amount.saturating_sub(amount);
        let remaining = stack.amount;
        if remaining == 0 {
            self.items.remove(index);
        }
        remaining
    }

    /// Weapons arrive as separate entities, everything else merges into
    /// a single stack per item.
    pub fn give_item(&mut self, catalog: &Catalog, item: &ItemId, amount: u32) -> ContentResult<()> {
        if amount == 0 {
            return Ok(());
        }
        if catalog.item(item)?.is_weapon() {
            for _ in 0..amount {
                self.spare_weapons.push(WeaponEntity::new(catalog, item)?);
            }
            return Ok(());
        }
        match self.stack_mut(item) {
            Some(stack) => stack.amount += amount,
            None => self.items.push(ItemStack::new(item.clone(), amount)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stats(health: f64, energy: f64) -> Stats {
        Stats {
            health,
            health_max: 20.0,
            energy,
            energy_max: 50.0,
            strength: 0.0,
            defense: 0.0,
        }
    }

    #[test]
    fn test_spend_prefers_energy() {
        let mut fighter = Combatant::new("u", "User", stats(20.0, 10.0));
        let payment = fighter.spend_energy_or_health(4.0, true).unwrap();

        assert_eq!(payment, Payment::Energy(4.0));
        assert_eq!(fighter.stats.energy, 6.0);
        assert_eq!(fighter.stats.health, 20.0);
    }

    #[test]
    fn test_spend_without_override_fails_untouched() {
        let mut fighter = Combatant::new("u", "User", stats(20.0, 0.0));
        let result = fighter.spend_energy_or_health(5.0, false);

        assert_eq!(
            result,
            Err(ActionError::InsufficientResource {
                required: 5.0,
                available: 0.0
            })
        );
        assert_eq!(fighter.stats, stats(20.0, 0.0));
    }

    #[test]
    fn test_spend_with_override_takes_health_and_refunds() {
        let mut fighter = Combatant::new("u", "User", stats(20.0, 2.0));
        let payment = fighter.spend_energy_or_health(5.0, true).unwrap();

        assert_eq!(payment, Payment::Health(5.0));
        assert_eq!(fighter.stats.health, 15.0);
        assert_eq!(fighter.stats.energy, 2.0);

        fighter.refund(payment);
        assert_eq!(fighter.stats, stats(20.0, 2.0));
    }

    #[test]
    fn test_damage_keeps_overkill() {
        let mut fighter = Combatant::new("u", "User", stats(1.0, 0.0));
        fighter.apply_damage(3.5);
        assert_eq!(fighter.stats.health, -2.5);
        assert!(fighter.is_defeated());
    }

    #[test]
    fn test_heal_and_energy_clamp_at_max() {
        let mut fighter = Combatant::new("u", "User", stats(15.0, 45.0));
        assert_eq!(fighter.heal(10.0), 5.0);
        assert_eq!(fighter.stats.health, 20.0);
        assert_eq!(fighter.restore_energy(10.0), 5.0);
        assert_eq!(fighter.stats.energy, 50.0);
    }

    #[test]
    fn test_tick_cooldowns_floors_at_zero() {
        let mut fighter = Combatant::new("u", "User", stats(20.0, 0.0));
        fighter.weapon.cooldown = 2;
        fighter.spare_weapons.push(WeaponEntity {
            cooldown: 0,
            ..WeaponEntity::fists()
        });

        fighter.tick_cooldowns();
        assert_eq!(fighter.weapon.cooldown, 1);
        assert_eq!(fighter.spare_weapons[0].cooldown, 0);

        fighter.tick_cooldowns();
        fighter.tick_cooldowns();
        assert_eq!(fighter.weapon.cooldown, 0);
    }

    #[test]
    fn test_status_ledger_applies_then_expires() {
        let catalog = Catalog::builtin().unwrap();
        let mut fighter = Combatant::new("u", "User", stats(10.0, 0.0));
        fighter.apply_status(&StatusGrant {
            effect: "poison".into(),
            duration: 2,
            magnitude: 1.5,
        });

        let first = fighter.tick_statuses(catalog);
        assert_eq!(first.len(), 1);
        assert!(!first[0].expired);
        assert_eq!(fighter.stats.health, 8.5);
        assert_eq!(fighter.statuses[0].remaining, 1);

        let second = fighter.tick_statuses(catalog);
        assert!(second[0].expired);
        assert_eq!(fighter.stats.health, 7.0);
        assert!(fighter.statuses.is_empty());

        assert!(fighter.tick_statuses(catalog).is_empty());
    }

    #[test]
    fn test_reapplying_status_refreshes_duration() {
        let mut fighter = Combatant::new("u", "User", stats(10.0, 0.0));
        let grant = StatusGrant {
            effect: "regeneration".into(),
            duration: 3,
            magnitude: 1.0,
        };
        fighter.apply_status(&grant);
        fighter.statuses[0].remaining = 1;
        fighter.apply_status(&grant);

        assert_eq!(fighter.statuses.len(), 1);
        assert_eq!(fighter.statuses[0].remaining, 3);
    }

    #[test]
    fn test_give_item_merges_stacks_and_splits_weapons() {
        let catalog = Catalog::builtin().unwrap();
        let mut fighter = Combatant::new("u", "User", stats(10.0, 0.0));

        fighter.give_item(catalog, &"fragment".into(), 2).unwrap();
        fighter.give_item(catalog, &"fragment".into(), 3).unwrap();
        fighter.give_item(catalog, &"stone".into(), 2).unwrap();

        assert_eq!(fighter.items, vec![ItemStack::new("fragment".into(), 5)]);
        assert_eq!(fighter.spare_weapons.len(), 2);
        assert_eq!(fighter.spare_weapons[0].durability, Some(10));
    }

    #[test]
    fn test_take_items_removes_empty_stack() {
        let catalog = Catalog::builtin().unwrap();
        let mut fighter = Combatant::new("u", "User", stats(10.0, 0.0));
        fighter.give_item(catalog, &"energy_bar".into(), 2).unwrap();

        assert_eq!(fighter.take_items(&"energy_bar".into(), 1), 1);
        assert_eq!(fighter.take_items(&"energy_bar".into(), 1), 0);
        assert!(fighter.stack(&"energy_bar".into()).is_none());
    }

    #[test]
    fn test_from_unit_without_weapon_gets_placeholder() {
        let catalog = Catalog::builtin().unwrap();
        let goblin = Combatant::from_unit(catalog.unit(&"goblin".into()).unwrap(), catalog).unwrap();
        assert!(goblin.weapon.is_placeholder());

        let obstruction =
            Combatant::from_unit(catalog.unit(&"obstruction".into()).unwrap(), catalog).unwrap();
        assert_eq!(obstruction.weapon.item.as_str(), "thorn_whip");
    }

    #[test]
    fn test_break_weapon_falls_back_to_fists() {
        let catalog = Catalog::builtin().unwrap();
        let mut fighter = Combatant::new("u", "User", stats(10.0, 0.0));
        fighter.weapon = WeaponEntity::new(catalog, &"stone".into()).unwrap();

        assert_eq!(fighter.break_weapon().as_str(), "stone");
        assert!(fighter.weapon.is_fists());
        assert_eq!(fighter.weapon.durability, None);
    }
}
