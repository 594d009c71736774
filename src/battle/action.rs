//! Action variants and their stage/undo/commit hooks.
//!
//! Staging may only touch reservations on the actor; everything that changes
//! the fight itself happens in `on_commit`, which is never undone.

use crate::battle::state::{BattleContext, BattleEvent, Combatants};
use crate::combatant::{Combatant, Payment, WeaponEntity};
use crate::config::ActionCosts;
use crate::content::Catalog;
use crate::errors::InvalidReason;
use schema::{ActionTag, Buff, ItemId, Side, TurnState};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Extra data a UI submits alongside an action tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionPayload {
    pub item: Option<ItemId>,
    /// Defaults to 1.
    pub amount: Option<u32>,
    /// Spare weapon index for swaps; `None` swaps to fists.
    pub slot: Option<usize>,
    /// Pay with health when energy runs short.
    pub bloody: bool,
}

impl ActionPayload {
    pub fn item(item: impl Into<ItemId>, amount: u32) -> Self {
        Self {
            item: Some(item.into()),
            amount: Some(amount),
            ..Self::default()
        }
    }

    pub fn slot(slot: usize) -> Self {
        Self {
            slot: Some(slot),
            ..Self::default()
        }
    }

    pub fn bloody(mut self) -> Self {
        self.bloody = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionKind {
    Attack,
    Evade,
    Shield,
    Consume { item: ItemId, amount: u32 },
    Reload { item: ItemId, amount: u32 },
    Swap { slot: Option<usize> },
}

impl ActionKind {
    pub fn from_request(tag: ActionTag, payload: &ActionPayload) -> Result<Self, InvalidReason> {
        let amount = payload.amount.unwrap_or(1);
        let kind = match tag {
            ActionTag::Attack => ActionKind::Attack,
            ActionTag::Evasion => ActionKind::Evade,
            ActionTag::Shield => ActionKind::Shield,
            ActionTag::Consume => ActionKind::Consume {
                item: payload.item.clone().ok_or(InvalidReason::MissingItem)?,
                amount,
            },
            ActionTag::Reload => ActionKind::Reload {
                item: payload.item.clone().ok_or(InvalidReason::MissingItem)?,
                amount,
            },
            ActionTag::Swap => ActionKind::Swap { slot: payload.slot },
        };
        Ok(kind)
    }

    pub fn tag(&self) -> ActionTag {
        match self {
            ActionKind::Attack => ActionTag::Attack,
            ActionKind::Evade => ActionTag::Evasion,
            ActionKind::Shield => ActionTag::Shield,
            ActionKind::Consume { .. } => ActionTag::Consume,
            ActionKind::Reload { .. } => ActionTag::Reload,
            ActionKind::Swap { .. } => ActionTag::Swap,
        }
    }

    fn touches_weapon(&self) -> bool {
        matches!(
            self,
            ActionKind::Attack | ActionKind::Reload { .. } | ActionKind::Swap { .. }
        )
    }

    /// Checks legality against the actor's current state and what is
    /// already staged. Reservations made by staged actions count as spent.
    pub fn validate(
        &self,
        actor: &Combatant,
        catalog: &Catalog,
        staged: &[Action],
    ) -> Result<(), InvalidReason> {
        let swap_staged = staged
            .iter()
            .any(|action| matches!(action.kind, ActionKind::Swap { .. }));

        match self {
            ActionKind::Attack => {
                let weapon = &actor.weapon;
                if weapon.is_placeholder() {
                    return Err(InvalidReason::CannotAttack);
                }
                if swap_staged {
                    return Err(InvalidReason::SwapConflict);
                }
                if weapon.reserved {
                    return Err(InvalidReason::WeaponAlreadyCommitted);
                }
                if weapon.cooldown > 0 {
                    return Err(InvalidReason::WeaponCoolingDown(weapon.cooldown));
                }
                let data = catalog
                    .weapon(&weapon.item)
                    .map_err(|_| InvalidReason::NotAWeapon(weapon.item.clone()))?;
                // A staged reload commits first and fills the magazine.
                let reload_staged = staged
                    .iter()
                    .any(|action| matches!(action.kind, ActionKind::Reload { .. }));
                if data.magazine.is_some() && weapon.ammo.is_empty() && !reload_staged {
                    return Err(InvalidReason::OutOfAmmo);
                }
                Ok(())
            }
            ActionKind::Evade => Ok(()),
            ActionKind::Shield => match actor.shield {
                Some(_) => Ok(()),
                None => Err(InvalidReason::NoShield),
            },
            ActionKind::Consume { item, amount } => {
                let consumable = catalog.item(item).map(|data| data.is_consumable());
                if !matches!(consumable, Ok(true)) {
                    return Err(InvalidReason::NotConsumable(item.clone()));
                }
                check_amount(actor, item, *amount)
            }
            ActionKind::Reload { item, amount } => {
                if swap_staged {
                    return Err(InvalidReason::SwapConflict);
                }
                let magazine = catalog
                    .weapon(&actor.weapon.item)
                    .ok()
                    .and_then(|data| data.magazine.as_ref())
                    .ok_or(InvalidReason::NoAmmoSlot)?;
                if !magazine.accepts.contains(item) {
                    return Err(InvalidReason::AmmoNotAccepted(item.clone()));
                }
                check_amount(actor, item, *amount)
            }
            ActionKind::Swap { slot } => {
                if staged.iter().any(|action| action.kind.touches_weapon()) {
                    return Err(InvalidReason::SwapConflict);
                }
                match slot {
                    Some(index) => {
                        let spare = actor
                            .spare_weapons
                            .get(*index)
                            .ok_or(InvalidReason::NoSuchSlot(*index))?;
                        catalog
                            .weapon(&spare.item)
                            .map_err(|_| InvalidReason::NotAWeapon(spare.item.clone()))?;
                        Ok(())
                    }
                    None if actor.weapon.is_fists() => Err(InvalidReason::AlreadyEquipped),
                    None => Ok(()),
                }
            }
        }
    }
}

fn check_amount(actor: &Combatant, item: &ItemId, amount: u32) -> Result<(), InvalidReason> {
    if amount == 0 {
        return Err(InvalidReason::ZeroAmount);
    }
    let available = actor.available(item);
    if amount > available {
        return Err(InvalidReason::NotEnoughItems {
            item: item.clone(),
            requested: amount,
            available,
        });
    }
    Ok(())
}

/// Tags whose preconditions currently hold for `actor`. Cost is not checked
/// since the health override can always pay.
pub fn available_tags(actor: &Combatant, catalog: &Catalog, staged: &[Action]) -> Vec<ActionTag> {
    ActionTag::iter()
        .filter(|tag| {
            let probes: Vec<ActionKind> = match tag {
                ActionTag::Attack => vec![ActionKind::Attack],
                ActionTag::Evasion => vec![ActionKind::Evade],
                ActionTag::Shield => vec![ActionKind::Shield],
                ActionTag::Consume => actor
                    .items
                    .iter()
                    .map(|stack| ActionKind::Consume {
                        item: stack.item.clone(),
                        amount: 1,
                    })
                    .collect(),
                ActionTag::Reload => actor
                    .items
                    .iter()
                    .map(|stack| ActionKind::Reload {
                        item: stack.item.clone(),
                        amount: 1,
                    })
                    .collect(),
                ActionTag::Swap => std::iter::once(ActionKind::Swap { slot: None })
                    .chain((0..actor.spare_weapons.len()).map(|i| ActionKind::Swap { slot: Some(i) }))
                    .collect(),
            };
            probes
                .iter()
                .any(|kind| kind.validate(actor, catalog, staged).is_ok())
        })
        .collect()
}

/// A validated action, ready to be staged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub actor: Side,
    pub target: Option<Side>,
    pub cost: f64,
    pub bloody: bool,
    payment: Option<Payment>,
}

impl Action {
    pub fn new(kind: ActionKind, actor: Side, costs: &ActionCosts, bloody: bool) -> Self {
        let target = match kind {
            ActionKind::Attack => Some(actor.opponent()),
            _ => None,
        };
        Self {
            cost: costs.for_tag(kind.tag()),
            kind,
            actor,
            target,
            bloody,
            payment: None,
        }
    }

    pub fn tag(&self) -> ActionTag {
        self.kind.tag()
    }

    /// What staging charged, once staged.
    pub fn payment(&self) -> Option<Payment> {
        self.payment
    }

    pub(crate) fn set_payment(&mut self, payment: Payment) {
        self.payment = Some(payment);
    }

    // === Hooks ===

    pub fn on_stage(&self, actor: &mut Combatant) {
        match &self.kind {
            ActionKind::Attack => actor.weapon.reserved = true,
            ActionKind::Consume { item, amount } | ActionKind::Reload { item, amount } => {
                if let Some(stack) = actor.stack_mut(item) {
                    stack.reserved += amount;
                }
            }
            ActionKind::Swap { slot: Some(index) } => {
                if let Some(spare) = actor.spare_weapons.get_mut(*index) {
                    spare.reserved = true;
                }
            }
            ActionKind::Evade | ActionKind::Shield | ActionKind::Swap { slot: None } => {}
        }
    }

    pub fn on_undo(&self, actor: &mut Combatant) {
        match &self.kind {
            ActionKind::Attack => actor.weapon.reserved = false,
            ActionKind::Consume { item, amount } | ActionKind::Reload { item, amount } => {
                if let Some(stack) = actor.stack_mut(item) {
                    stack.reserved = stack.reserved.saturating_sub(*amount);
                }
            }
            ActionKind::Swap { slot: Some(index) } => {
                if let Some(spare) = actor.spare_weapons.get_mut(*index) {
                    spare.reserved = false;
                }
            }
            ActionKind::Evade | ActionKind::Shield | ActionKind::Swap { slot: None } => {}
        }
    }

    pub fn on_commit(&self, sides: &mut Combatants<'_>, ctx: &mut BattleContext<'_>) {
        tracing::debug!(actor = %self.actor, tag = %self.tag(), "committing action");
        match &self.kind {
            ActionKind::Attack => self.commit_attack(sides, ctx),
            ActionKind::Evade => self.toggle_stance(sides.get_mut(self.actor), TurnState::Evading, ctx),
            ActionKind::Shield => {
                self.toggle_stance(sides.get_mut(self.actor), TurnState::Shielded, ctx)
            }
            ActionKind::Consume { item, amount } => {
                self.commit_consume(sides.get_mut(self.actor), item, *amount, ctx)
            }
            ActionKind::Reload { item, amount } => {
                self.commit_reload(sides.get_mut(self.actor), item, *amount, ctx)
            }
            ActionKind::Swap { slot } => self.commit_swap(sides.get_mut(self.actor), *slot, ctx),
        }
        ctx.events.push(BattleEvent::ActionCommitted {
            actor: self.actor,
            tag: self.tag(),
        });
    }

    fn commit_attack(&self, sides: &mut Combatants<'_>, ctx: &mut BattleContext<'_>) {
        let (attacker, defender) = sides.pair_mut(self.actor);
        attacker.weapon.reserved = false;

        let catalog = ctx.catalog;
        let weapon_id = attacker.weapon.item.clone();
        let Ok(data) = catalog.weapon(&weapon_id) else {
            tracing::warn!(weapon = %weapon_id, "attack with unknown weapon skipped");
            return;
        };

        let ammo_damage = if data.magazine.is_some() && !attacker.weapon.ammo.is_empty() {
            let round = attacker.weapon.ammo.remove(0);
            catalog
                .item(&round)
                .ok()
                .and_then(|item| item.ammo.as_ref())
                .map_or(0.0, |ammo| ammo.damage)
        } else {
            0.0
        };

        let evaded = defender.turn_state == TurnState::Evading
            && ctx.rng.next_roll("evasion") < ctx.config.evasion_chance;

        if evaded {
            ctx.events.push(BattleEvent::AttackMissed {
                attacker: self.actor,
                weapon: weapon_id.clone(),
            });
        } else {
            let critical = ctx.rng.next_roll("critical hit") < data.critical_chance;
            let multiplier = if critical { 1.0 + data.critical_ratio } else { 1.0 };
            let mut damage = (data.damage + ammo_damage) * multiplier;
            if critical {
                ctx.events.push(BattleEvent::CriticalHit {
                    attacker: self.actor,
                });
            }

            if defender.turn_state == TurnState::Shielded {
                damage = absorb_with_shield(defender, self.actor.opponent(), damage, ctx);
            }

            defender.apply_damage(damage);
            ctx.events.push(BattleEvent::DamageDealt {
                attacker: self.actor,
                weapon: weapon_id.clone(),
                damage,
                remaining_health: defender.stats.health,
            });

            if let Some(grant) = &data.inflicts {
                defender.apply_status(grant);
                ctx.events.push(BattleEvent::StatusApplied {
                    side: self.actor.opponent(),
                    effect: grant.effect.clone(),
                    duration: grant.duration,
                });
            }
        }

        attacker.weapon.cooldown = data.cooldown;
        if let Some(durability) = attacker.weapon.durability.as_mut() {
            *durability = durability.saturating_sub(1);
            if *durability == 0 {
                let broken = attacker.break_weapon();
                ctx.events.push(BattleEvent::WeaponBroken {
                    side: self.actor,
                    weapon: broken,
                });
            }
        }
    }

    fn toggle_stance(&self, actor: &mut Combatant, stance: TurnState, ctx: &mut BattleContext<'_>) {
        actor.turn_state = if actor.turn_state == stance {
            TurnState::Default
        } else {
            stance
        };
        ctx.events.push(BattleEvent::StanceChanged {
            side: self.actor,
            state: actor.turn_state,
        });
    }

    fn commit_consume(
        &self,
        actor: &mut Combatant,
        item: &ItemId,
        amount: u32,
        ctx: &mut BattleContext<'_>,
    ) {
        if let Some(stack) = actor.stack_mut(item) {
            stack.reserved = stack.reserved.saturating_sub(amount);
        }
        actor.take_items(item, amount);
        ctx.events.push(BattleEvent::ItemConsumed {
            side: self.actor,
            item: item.clone(),
            amount,
        });

        let catalog = ctx.catalog;
        let buffs = catalog
            .item(item)
            .ok()
            .and_then(|data| data.consume.as_ref());
        let scale = f64::from(amount);
        // Units that had no effect at all go back into the bag.
        let mut unused = if buffs.is_some_and(|list| !list.is_empty()) {
            amount
        } else {
            0
        };
        for buff in buffs.into_iter().flatten() {
            let event = match buff {
                Buff::Health(value) => {
                    let healed = actor.heal(value * scale);
                    unused = unused.min(wasted_units(*value, scale, healed));
                    BattleEvent::Healed {
                        side: self.actor,
                        amount: healed,
                    }
                }
                Buff::Energy(value) => {
                    let restored = actor.restore_energy(value * scale);
                    unused = unused.min(wasted_units(*value, scale, restored));
                    BattleEvent::EnergyRestored {
                        side: self.actor,
                        amount: restored,
                    }
                }
                Buff::Experience(value) => {
                    unused = 0;
                    actor.exp += value * scale;
                    BattleEvent::ExperienceGained {
                        side: self.actor,
                        amount: value * scale,
                    }
                }
                Buff::Status(grant) => {
                    unused = 0;
                    actor.apply_status(grant);
                    BattleEvent::StatusApplied {
                        side: self.actor,
                        effect: grant.effect.clone(),
                        duration: grant.duration,
                    }
                }
            };
            ctx.events.push(event);
        }

        if unused > 0 {
            match actor.give_item(catalog, item, unused) {
                Ok(()) => ctx.events.push(BattleEvent::ItemReturned {
                    side: self.actor,
                    item: item.clone(),
                    amount: unused,
                }),
                Err(err) => tracing::warn!(%err, item = %item, "could not return unused items"),
            }
        }
    }

    fn commit_reload(
        &self,
        actor: &mut Combatant,
        item: &ItemId,
        amount: u32,
        ctx: &mut BattleContext<'_>,
    ) {
        if let Some(stack) = actor.stack_mut(item) {
            stack.reserved = stack.reserved.saturating_sub(amount);
        }
        let capacity = ctx
            .catalog
            .weapon(&actor.weapon.item)
            .ok()
            .and_then(|data| data.magazine.as_ref())
            .map_or(0, |magazine| magazine.capacity);

        let free = capacity.saturating_sub(actor.weapon.ammo.len() as u32);
        let loaded = amount.min(free).min(actor.available(item));
        actor
            .weapon
            .ammo
            .extend(std::iter::repeat(item.clone()).take(loaded as usize));
        actor.take_items(item, loaded);

        ctx.events.push(BattleEvent::AmmoLoaded {
            side: self.actor,
            item: item.clone(),
            loaded,
            leftover: amount - loaded,
        });
    }

    fn commit_swap(&self, actor: &mut Combatant, slot: Option<usize>, ctx: &mut BattleContext<'_>) {
        let incoming = match slot {
            Some(index) if index < actor.spare_weapons.len() => {
                let mut weapon = actor.spare_weapons.remove(index);
                weapon.reserved = false;
                weapon
            }
            Some(index) => {
                tracing::warn!(slot = index, "swap slot vanished before commit");
                return;
            }
            None => WeaponEntity::fists(),
        };
        let to = incoming.item.clone();
        let outgoing = std::mem::replace(&mut actor.weapon, incoming);
        let from = outgoing.item.clone();
        if !outgoing.is_fists() && !outgoing.is_placeholder() {
            actor.spare_weapons.push(outgoing);
        }
        ctx.events.push(BattleEvent::WeaponSwapped {
            side: self.actor,
            from,
            to,
        });
    }
}

/// Whole units of a `value`-per-unit buff that were clipped by the cap.
fn wasted_units(value: f64, scale: f64, applied: f64) -> u32 {
    if value <= 0.0 {
        return 0;
    }
    ((value * scale - applied) / value + 1e-9).floor().max(0.0) as u32
}

/// Returns the damage left after the defender's shield takes its share.
fn absorb_with_shield(
    defender: &mut Combatant,
    defender_side: Side,
    damage: f64,
    ctx: &mut BattleContext<'_>,
) -> f64 {
    let Some(shield) = defender.shield.as_mut() else {
        return damage;
    };
    let defense = ctx
        .catalog
        .shield(&shield.item)
        .map_or(0.0, |data| data.defense);
    let absorbed = defense.min(damage).max(0.0);

    shield.durability = shield.durability.saturating_sub(1);
    ctx.events.push(BattleEvent::ShieldAbsorbed {
        target: defender_side,
        absorbed,
    });
    if shield.durability == 0 {
        let item = shield.item.clone();
        defender.shield = None;
        ctx.events.push(BattleEvent::ShieldBroken {
            side: defender_side,
            shield: item,
        });
    }
    damage - absorbed
}
