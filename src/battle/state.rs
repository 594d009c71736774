use crate::combatant::{Combatant, Payment};
use crate::config::BattleConfig;
use crate::content::Catalog;
use crate::errors::{ActionError, InvalidReason};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schema::{ActionTag, ItemId, Side, StatusId, StatusKind, TurnState, UnitId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattlePhase {
    AwaitingUserStaging,
    AwaitingUserCommit,
    EnemyReacting,
    Settling,
    Terminal,
}

impl BattlePhase {
    pub fn is_terminal(self) -> bool {
        self == BattlePhase::Terminal
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Session
    BattleStarted {
        user: String,
        enemy: UnitId,
    },
    TurnStarted {
        turn: u32,
        owner: Side,
    },
    TurnEnded {
        turn: u32,
        owner: Side,
    },

    // Queue
    ActionStaged {
        actor: Side,
        tag: ActionTag,
        payment: Payment,
    },
    ActionUndone {
        actor: Side,
        tag: ActionTag,
        refund: Payment,
    },
    ActionCommitted {
        actor: Side,
        tag: ActionTag,
    },

    // Attacks
    AttackMissed {
        attacker: Side,
        weapon: ItemId,
    },
    CriticalHit {
        attacker: Side,
    },
    DamageDealt {
        attacker: Side,
        weapon: ItemId,
        damage: f64,
        remaining_health: f64,
    },
    ShieldAbsorbed {
        target: Side,
        absorbed: f64,
    },
    ShieldBroken {
        side: Side,
        shield: ItemId,
    },
    WeaponBroken {
        side: Side,
        weapon: ItemId,
    },
    EnemyHolds {
        reason: HoldReason,
    },

    // Stances and equipment
    StanceChanged {
        side: Side,
        state: TurnState,
    },
    WeaponSwapped {
        side: Side,
        from: ItemId,
        to: ItemId,
    },
    AmmoLoaded {
        side: Side,
        item: ItemId,
        loaded: u32,
        leftover: u32,
    },

    // Consumables and statuses
    ItemConsumed {
        side: Side,
        item: ItemId,
        amount: u32,
    },
    ItemReturned {
        side: Side,
        item: ItemId,
        amount: u32,
    },
    Healed {
        side: Side,
        amount: f64,
    },
    EnergyRestored {
        side: Side,
        amount: f64,
    },
    ExperienceGained {
        side: Side,
        amount: f64,
    },
    StatusApplied {
        side: Side,
        effect: StatusId,
        duration: u32,
    },
    StatusTicked {
        side: Side,
        effect: StatusId,
        kind: StatusKind,
        amount: f64,
    },
    StatusExpired {
        side: Side,
        effect: StatusId,
    },

    // Battle end
    Victory {
        overkill: bool,
        exp_gained: f64,
        loot: Vec<(ItemId, u32)>,
    },
    Defeat {
        user_health: f64,
    },
}

/// Why the enemy skipped its attack.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldReason {
    CoolingDown(u32),
    /// Not enough energy to pay for the attack.
    Exhausted,
    Blocked,
}

impl From<&ActionError> for HoldReason {
    fn from(err: &ActionError) -> Self {
        match err {
            ActionError::InsufficientResource { .. } => HoldReason::Exhausted,
            ActionError::InvalidAction(InvalidReason::WeaponCoolingDown(turns)) => {
                HoldReason::CoolingDown(*turns)
            }
            _ => HoldReason::Blocked,
        }
    }
}

/// A message key plus formatting arguments. Rendering and localization
/// happen outside the engine.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub key: String,
    pub args: Vec<String>,
}

impl LogEntry {
    fn new(key: &str, args: Vec<String>) -> Self {
        Self {
            key: key.to_string(),
            args,
        }
    }
}

impl BattleEvent {
    /// The player-facing log line for this event, or `None` for
    /// bookkeeping events.
    pub fn log_entry(&self) -> Option<LogEntry> {
        let entry = match self {
            BattleEvent::BattleStarted { user, enemy } => {
                LogEntry::new("battle.start", vec![user.clone(), enemy.to_string()])
            }
            BattleEvent::TurnStarted { turn, owner } => {
                LogEntry::new("battle.turn", vec![turn.to_string(), owner.to_string()])
            }
            BattleEvent::ActionStaged { actor, tag, .. } => {
                LogEntry::new("battle.staged", vec![actor.to_string(), tag.to_string()])
            }
            BattleEvent::ActionUndone { actor, tag, .. } => {
                LogEntry::new("battle.undo", vec![actor.to_string(), tag.to_string()])
            }
            BattleEvent::AttackMissed { attacker, weapon } => {
                LogEntry::new("battle.miss", vec![attacker.to_string(), weapon.to_string()])
            }
            BattleEvent::CriticalHit { attacker } => {
                LogEntry::new("battle.critical", vec![attacker.to_string()])
            }
            BattleEvent::DamageDealt {
                attacker,
                weapon,
                damage,
                remaining_health,
            } => LogEntry::new(
                "battle.hit",
                vec![
                    attacker.to_string(),
                    weapon.to_string(),
                    format!("{:.2}", damage),
                    format!("{:.2}", remaining_health),
                ],
            ),
            BattleEvent::ShieldAbsorbed { target, absorbed } => LogEntry::new(
                "battle.shield.absorb",
                vec![target.to_string(), format!("{:.2}", absorbed)],
            ),
            BattleEvent::ShieldBroken { side, shield } => {
                LogEntry::new("battle.shield.broken", vec![side.to_string(), shield.to_string()])
            }
            BattleEvent::WeaponBroken { side, weapon } => {
                LogEntry::new("battle.broken", vec![side.to_string(), weapon.to_string()])
            }
            BattleEvent::EnemyHolds { reason } => match reason {
                HoldReason::CoolingDown(turns) => {
                    LogEntry::new("battle.cooldown", vec![turns.to_string()])
                }
                HoldReason::Exhausted => LogEntry::new("battle.exhausted", Vec::new()),
                HoldReason::Blocked => LogEntry::new("battle.hold", Vec::new()),
            },
            BattleEvent::StanceChanged { side, state } => {
                let key = match state {
                    TurnState::Default => "battle.stance.default",
                    TurnState::Evading => "battle.stance.evade",
                    TurnState::Shielded => "battle.stance.shield",
                };
                LogEntry::new(key, vec![side.to_string()])
            }
            BattleEvent::WeaponSwapped { side, from, to } => LogEntry::new(
                "battle.swap",
                vec![side.to_string(), from.to_string(), to.to_string()],
            ),
            BattleEvent::AmmoLoaded {
                side, item, loaded, ..
            } => LogEntry::new(
                "battle.reload",
                vec![side.to_string(), item.to_string(), loaded.to_string()],
            ),
            BattleEvent::ItemConsumed { side, item, amount } => LogEntry::new(
                "battle.consume",
                vec![side.to_string(), item.to_string(), amount.to_string()],
            ),
            BattleEvent::ItemReturned { side, item, amount } => LogEntry::new(
                "battle.consume.return",
                vec![side.to_string(), item.to_string(), amount.to_string()],
            ),
            BattleEvent::Healed { side, amount } => {
                LogEntry::new("battle.heal", vec![side.to_string(), format!("{:.2}", amount)])
            }
            BattleEvent::EnergyRestored { side, amount } => {
                LogEntry::new("battle.energy", vec![side.to_string(), format!("{:.2}", amount)])
            }
            BattleEvent::ExperienceGained { side, amount } => {
                LogEntry::new("battle.exp", vec![side.to_string(), format!("{:.2}", amount)])
            }
            BattleEvent::StatusApplied {
                side,
                effect,
                duration,
            } => LogEntry::new(
                "battle.status.applied",
                vec![side.to_string(), effect.to_string(), duration.to_string()],
            ),
            BattleEvent::StatusTicked {
                side,
                effect,
                amount,
                ..
            } => LogEntry::new(
                "battle.status.tick",
                vec![side.to_string(), effect.to_string(), format!("{:.2}", amount)],
            ),
            BattleEvent::StatusExpired { side, effect } => {
                LogEntry::new("battle.status.expired", vec![side.to_string(), effect.to_string()])
            }
            BattleEvent::Victory {
                overkill,
                exp_gained,
                loot,
            } => {
                let mut args = vec![format!("{:.2}", exp_gained)];
                args.extend(loot.iter().map(|(item, amount)| format!("{} x{}", item, amount)));
                let key = if *overkill {
                    "battle.overkill"
                } else {
                    "battle.win"
                };
                LogEntry::new(key, args)
            }
            BattleEvent::Defeat { user_health } => {
                LogEntry::new("battle.lose", vec![format!("{:.2}", user_health)])
            }
            // Silent events
            BattleEvent::TurnEnded { .. } | BattleEvent::ActionCommitted { .. } => return None,
        };
        Some(entry)
    }
}

/// Every event of a session in order, plus the player-facing log derived
/// from them.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
    log: VecDeque<LogEntry>,
    log_capacity: Option<usize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only the newest `capacity` log entries. Events are never dropped.
    pub fn with_log_capacity(capacity: Option<usize>) -> Self {
        Self {
            log_capacity: capacity,
            ..Self::default()
        }
    }

    pub fn push(&mut self, event: BattleEvent) {
        tracing::debug!(?event, "battle event");
        if let Some(entry) = event.log_entry() {
            self.log.push_back(entry);
            if let Some(capacity) = self.log_capacity {
                while self.log.len() > capacity {
                    self.log.pop_front();
                }
            }
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn log(&self) -> impl Iterator<Item = &LogEntry> {
        self.log.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl std::fmt::Display for EventBus {
    /// One line per log entry: the key followed by its arguments.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for entry in &self.log {
            writeln!(f, "{} {}", entry.key, entry.args.join(" | "))?;
        }
        Ok(())
    }
}

/// Source of every random roll in a battle. Rolls are uniform in `[0, 1)`.
#[derive(Debug, Clone)]
pub enum BattleRng {
    Seeded(StdRng),
    /// Replays fixed rolls in order, cycling when exhausted.
    Scripted { rolls: Vec<f64>, index: usize },
}

impl BattleRng {
    pub fn new_seeded(seed: u64) -> Self {
        BattleRng::Seeded(StdRng::seed_from_u64(seed))
    }

    pub fn new_random() -> Self {
        Self::new_seeded(rand::random::<u64>())
    }

    pub fn new_for_test(rolls: Vec<f64>) -> Self {
        BattleRng::Scripted { rolls, index: 0 }
    }

    pub fn next_roll(&mut self, reason: &str) -> f64 {
        let roll = match self {
            BattleRng::Seeded(rng) => rng.random::<f64>(),
            BattleRng::Scripted { rolls, index } => {
                if rolls.is_empty() {
                    0.0
                } else {
                    let roll = rolls[*index % rolls.len()];
                    *index += 1;
                    roll
                }
            }
        };
        tracing::trace!(roll, reason, "rng roll");
        roll
    }
}

/// Mutable access to both fighters of a session.
#[derive(Debug)]
pub struct Combatants<'s> {
    pub user: &'s mut Combatant,
    pub enemy: &'s mut Combatant,
}

impl<'s> Combatants<'s> {
    pub fn get(&self, side: Side) -> &Combatant {
        match side {
            Side::User => &*self.user,
            Side::Enemy => &*self.enemy,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut Combatant {
        match side {
            Side::User => &mut *self.user,
            Side::Enemy => &mut *self.enemy,
        }
    }

    /// `(actor, opponent)`.
    pub fn pair_mut(&mut self, actor: Side) -> (&mut Combatant, &mut Combatant) {
        match actor {
            Side::User => (&mut *self.user, &mut *self.enemy),
            Side::Enemy => (&mut *self.enemy, &mut *self.user),
        }
    }
}

/// Shared services the action hooks need besides the fighters.
#[derive(Debug)]
pub struct BattleContext<'a> {
    pub catalog: &'a Catalog,
    pub config: &'a BattleConfig,
    pub rng: &'a mut BattleRng,
    pub events: &'a mut EventBus,
}
