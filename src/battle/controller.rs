use crate::battle::action::{available_tags, Action, ActionKind, ActionPayload};
use crate::battle::queue::ActionQueue;
use crate::battle::state::{
    BattleContext, BattleEvent, BattlePhase, BattleRng, Combatants, EventBus, HoldReason,
};
use crate::battle::view::{CombatantSummary, TerminalOutcome, TurnOutcome, ViewModel};
use crate::combatant::Combatant;
use crate::config::BattleConfig;
use crate::content::Catalog;
use crate::errors::{ActionError, ContentResult, InvalidReason};
use crate::progression::{Reward, RewardCalculator};
use schema::{ActionTag, Side, TurnState, UnitData, UnitId};
use std::str::FromStr;

/// Drives one battle between the user and an NPC unit.
///
/// The user's record is borrowed for the whole session, so damage, spent
/// items and rewards land on it directly.
#[derive(Debug)]
pub struct BattleController<'a> {
    user: &'a mut Combatant,
    enemy: Combatant,
    unit: UnitData,
    catalog: &'a Catalog,
    config: BattleConfig,
    turn_owner: Side,
    turn_counter: u32,
    phase: BattlePhase,
    queue: ActionQueue,
    events: EventBus,
    rng: BattleRng,
    outcome: Option<TerminalOutcome>,
}

impl<'a> BattleController<'a> {
    /// Spawns `unit_id` and opens the first turn for the user.
    pub fn start(
        user: &'a mut Combatant,
        unit_id: &UnitId,
        catalog: &'a Catalog,
        config: BattleConfig,
        rng: BattleRng,
    ) -> ContentResult<Self> {
        let unit = catalog.unit(unit_id)?.clone();
        let enemy = Combatant::from_unit(&unit, catalog)?;

        user.turn_state = TurnState::Default;
        let mut events = EventBus::with_log_capacity(config.log_capacity);
        events.push(BattleEvent::BattleStarted {
            user: user.name.clone(),
            enemy: unit.id.clone(),
        });
        events.push(BattleEvent::TurnStarted {
            turn: 1,
            owner: Side::User,
        });
        tracing::info!(user = %user.name, enemy = %unit.id, "battle started");

        let mut controller = Self {
            user,
            enemy,
            unit,
            catalog,
            config,
            turn_owner: Side::User,
            turn_counter: 1,
            phase: BattlePhase::AwaitingUserStaging,
            queue: ActionQueue::new(),
            events,
            rng,
            outcome: None,
        };
        controller.check_terminal();
        Ok(controller)
    }

    // === Accessors ===

    pub fn user(&self) -> &Combatant {
        &*self.user
    }

    pub fn enemy(&self) -> &Combatant {
        &self.enemy
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn turn(&self) -> u32 {
        self.turn_counter
    }

    pub fn turn_owner(&self) -> Side {
        self.turn_owner
    }

    pub fn staged(&self) -> &[Action] {
        self.queue.staged()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn outcome(&self) -> Option<&TerminalOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    // === External interface ===

    /// Stages an action for the user from a UI tag such as `"attack"`.
    pub fn submit_action(&mut self, tag: &str, payload: ActionPayload) -> Result<(), ActionError> {
        let tag = ActionTag::from_str(tag).map_err(|_| InvalidReason::UnknownTag(tag.to_string()))?;
        self.stage_for(Side::User, tag, payload)
    }

    /// Stages an action on behalf of `side`. Only the turn owner may stage.
    pub fn stage_for(
        &mut self,
        side: Side,
        tag: ActionTag,
        payload: ActionPayload,
    ) -> Result<(), ActionError> {
        self.ensure_active()?;
        if side != self.turn_owner {
            tracing::warn!(actor = %side, owner = %self.turn_owner, %tag, "rejected out-of-turn action");
            return Err(ActionError::NotYourTurn {
                actor: side,
                owner: self.turn_owner,
            });
        }

        let kind = ActionKind::from_request(tag, &payload)?;
        let action = Action::new(kind, side, &self.config.costs, payload.bloody);
        let (queue, mut sides, mut ctx) = self.parts();
        let result = queue.stage(action, &mut sides, &mut ctx);
        if let Err(err) = &result {
            tracing::debug!(actor = %side, %tag, %err, "action rejected");
        }
        result
    }

    /// Retracts the newest staged action. Returns whether anything was undone.
    pub fn request_undo(&mut self) -> Result<bool, ActionError> {
        self.ensure_active()?;
        let (queue, mut sides, ctx) = self.parts();
        Ok(queue.undo_last(&mut sides, ctx.events).is_some())
    }

    /// Commits the user's queue, runs the enemy's reply and settles both
    /// half-turns.
    pub fn request_turn_end(&mut self) -> Result<TurnOutcome, ActionError> {
        self.ensure_active()?;

        self.phase = BattlePhase::AwaitingUserCommit;
        if self.resolve_half_turn(Side::User) {
            return Ok(self.terminal_outcome());
        }

        self.phase = BattlePhase::EnemyReacting;
        self.enemy_react();
        if self.resolve_half_turn(Side::Enemy) {
            return Ok(self.terminal_outcome());
        }

        Ok(TurnOutcome::Continue(self.current_view()))
    }

    pub fn current_view(&self) -> ViewModel {
        ViewModel {
            turn: self.turn_counter,
            owner: self.turn_owner,
            phase: self.phase,
            user: CombatantSummary::from(&*self.user),
            enemy: CombatantSummary::from(&self.enemy),
            log: self.events.log().cloned().collect(),
            staged: self.queue.staged().iter().map(Action::tag).collect(),
            available: self.available_actions(),
            terminal: self.outcome.clone(),
        }
    }

    /// Tags the user could stage right now.
    pub fn available_actions(&self) -> Vec<ActionTag> {
        if self.is_over() || self.turn_owner != Side::User {
            return Vec::new();
        }
        available_tags(&*self.user, self.catalog, self.queue.staged())
    }

    // === Turn pipeline ===

    fn ensure_active(&self) -> Result<(), ActionError> {
        if self.is_over() {
            return Err(ActionError::BattleOver);
        }
        Ok(())
    }

    fn parts(&mut self) -> (&mut ActionQueue, Combatants<'_>, BattleContext<'_>) {
        (
            &mut self.queue,
            Combatants {
                user: &mut *self.user,
                enemy: &mut self.enemy,
            },
            BattleContext {
                catalog: self.catalog,
                config: &self.config,
                rng: &mut self.rng,
                events: &mut self.events,
            },
        )
    }

    /// Commits `side`'s queue and settles its half-turn. Returns true once
    /// the battle is over.
    fn resolve_half_turn(&mut self, side: Side) -> bool {
        {
            let (queue, mut sides, mut ctx) = self.parts();
            queue.commit_all(&mut sides, &mut ctx);
        }
        if self.check_terminal() {
            return true;
        }

        self.phase = BattlePhase::Settling;
        self.tick(side);
        if self.check_terminal() {
            return true;
        }

        self.events.push(BattleEvent::TurnEnded {
            turn: self.turn_counter,
            owner: side,
        });
        self.turn_owner = side.opponent();
        match self.turn_owner {
            Side::User => {
                self.turn_counter += 1;
                self.user.turn_state = TurnState::Default;
                self.phase = BattlePhase::AwaitingUserStaging;
                self.events.push(BattleEvent::TurnStarted {
                    turn: self.turn_counter,
                    owner: Side::User,
                });
                tracing::info!(turn = self.turn_counter, "turn settled");
            }
            Side::Enemy => self.enemy.turn_state = TurnState::Default,
        }
        false
    }

    /// The enemy attacks whenever its weapon allows it and it can pay.
    fn enemy_react(&mut self) {
        if self.enemy.weapon.is_placeholder() {
            tracing::debug!(enemy = %self.unit.id, "enemy has no weapon");
            return;
        }

        let action = Action::new(ActionKind::Attack, Side::Enemy, &self.config.costs, false);
        let (queue, mut sides, mut ctx) = self.parts();
        match queue.stage(action, &mut sides, &mut ctx) {
            Ok(()) => {}
            Err(err) => {
                tracing::debug!(%err, "enemy holds");
                ctx.events.push(BattleEvent::EnemyHolds {
                    reason: HoldReason::from(&err),
                });
            }
        }
    }

    fn tick(&mut self, side: Side) {
        let combatant = match side {
            Side::User => &mut *self.user,
            Side::Enemy => &mut self.enemy,
        };
        combatant.tick_cooldowns();
        for tick in combatant.tick_statuses(self.catalog) {
            self.events.push(BattleEvent::StatusTicked {
                side,
                effect: tick.effect.clone(),
                kind: tick.kind,
                amount: tick.amount,
            });
            if tick.expired {
                self.events.push(BattleEvent::StatusExpired {
                    side,
                    effect: tick.effect,
                });
            }
        }
    }

    /// Moves to `Terminal` if either side is down, running rewards on a win.
    fn check_terminal(&mut self) -> bool {
        if self.outcome.is_some() {
            return true;
        }
        let enemy_down = self.enemy.is_defeated();
        if !enemy_down && !self.user.is_defeated() {
            return false;
        }

        self.phase = BattlePhase::Terminal;
        let outcome = if enemy_down {
            self.victory()
        } else {
            let user_health = self.user.stats.health;
            self.events.push(BattleEvent::Defeat { user_health });
            tracing::info!(user_health, "battle lost");
            TerminalOutcome::Defeat { user_health }
        };
        self.outcome = Some(outcome);
        true
    }

    fn victory(&mut self) -> TerminalOutcome {
        let exp_before = self.user.exp;
        let enemy_health = self.enemy.stats.health;
        let calculator = RewardCalculator::new(self.catalog, &self.config);
        let reward = match calculator.apply_victory(&mut *self.user, &self.unit, &mut self.rng) {
            Ok(reward) => reward,
            Err(err) => {
                tracing::error!(%err, "loot could not be granted");
                Reward {
                    exp_gained: self.user.exp - exp_before,
                    loot: Vec::new(),
                }
            }
        };

        let overkill = enemy_health < 0.0;
        self.events.push(BattleEvent::Victory {
            overkill,
            exp_gained: reward.exp_gained,
            loot: reward.loot.clone(),
        });
        tracing::info!(overkill, exp = reward.exp_gained, "battle won");

        TerminalOutcome::Victory {
            overkill,
            enemy_health,
            exp_before,
            exp_after: self.user.exp,
            loot: reward.loot,
        }
    }

    fn terminal_outcome(&self) -> TurnOutcome {
        match &self.outcome {
            Some(outcome) => TurnOutcome::Terminal(outcome.clone()),
            None => TurnOutcome::Continue(self.current_view()),
        }
    }
}
