use crate::battle::action::Action;
use crate::battle::state::{BattleContext, BattleEvent, Combatants, EventBus};
use crate::errors::ActionError;

/// Actions staged by the current turn owner, oldest first.
#[derive(Debug, Clone, Default)]
pub struct ActionQueue {
    staged: Vec<Action>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates, charges and reserves for `action`, then appends it.
    /// On error nothing has changed.
    pub fn stage(
        &mut self,
        mut action: Action,
        sides: &mut Combatants<'_>,
        ctx: &mut BattleContext<'_>,
    ) -> Result<(), ActionError> {
        let actor = sides.get_mut(action.actor);
        action.kind.validate(actor, ctx.catalog, &self.staged)?;
        let payment = actor.spend_energy_or_health(action.cost, action.bloody)?;
        action.on_stage(actor);
        action.set_payment(payment);

        ctx.events.push(BattleEvent::ActionStaged {
            actor: action.actor,
            tag: action.tag(),
            payment,
        });
        self.staged.push(action);
        Ok(())
    }

    /// Retracts the newest action and refunds what it cost. Does nothing on
    /// an empty queue.
    pub fn undo_last(&mut self, sides: &mut Combatants<'_>, events: &mut EventBus) -> Option<Action> {
        let action = self.staged.pop()?;
        let actor = sides.get_mut(action.actor);
        action.on_undo(actor);
        if let Some(refund) = action.payment() {
            actor.refund(refund);
            events.push(BattleEvent::ActionUndone {
                actor: action.actor,
                tag: action.tag(),
                refund,
            });
        }
        Some(action)
    }

    /// Commits every staged action in staging order and empties the queue.
    pub fn commit_all(&mut self, sides: &mut Combatants<'_>, ctx: &mut BattleContext<'_>) {
        for action in self.staged.drain(..) {
            action.on_commit(sides, ctx);
        }
    }

    pub fn staged(&self) -> &[Action] {
        &self.staged
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }
}
