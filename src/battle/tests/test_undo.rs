#[cfg(test)]
mod tests {
    use crate::battle::action::{ActionKind, ActionPayload};
    use crate::battle::state::BattleEvent;
    use crate::battle::tests::common::{
        assert_ok, count_events, predictable_rng, start_battle, TestCombatantBuilder,
    };
    use crate::combatant::Payment;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::ActionTag;

    #[rstest]
    #[case("attack", ActionPayload::default())]
    #[case("evasion", ActionPayload::default())]
    #[case("consume", ActionPayload::item("energy_bar", 2))]
    #[case("shield", ActionPayload::default())]
    #[case("swap", ActionPayload::slot(0))]
    fn test_stage_then_undo_restores_user(#[case] tag: &str, #[case] payload: ActionPayload) {
        // Arrange
        let mut user = TestCombatantBuilder::new()
            .with_weapon("stone")
            .with_shield("wooden_shield")
            .with_item("energy_bar", 3)
            .with_item("wooden_sword", 1)
            .build();
        let mut battle = start_battle(&mut user, "goblin", predictable_rng());
        let before = battle.user().clone();

        // Act
        assert_ok(battle.submit_action(tag, payload));
        assert_ne!(battle.user(), &before, "staging {} should charge energy", tag);
        let undone = assert_ok(battle.request_undo());

        // Assert
        assert!(undone);
        assert!(battle.staged().is_empty());
        assert_eq!(battle.user(), &before);
    }

    #[test]
    fn test_undo_refunds_health_override() {
        // Arrange
        let mut user = TestCombatantBuilder::new().with_energy(0.0).build();
        let mut battle = start_battle(&mut user, "goblin", predictable_rng());

        // Act
        assert_ok(battle.submit_action("attack", ActionPayload::default().bloody()));
        assert_eq!(battle.user().stats.health, 15.0);
        assert_ok(battle.request_undo());

        // Assert
        assert_eq!(battle.user().stats.health, 20.0);
        assert_eq!(battle.user().stats.energy, 0.0);
        assert_eq!(
            count_events(&battle, |e| matches!(
                e,
                BattleEvent::ActionUndone {
                    refund: Payment::Health(_),
                    ..
                }
            )),
            1
        );
    }

    #[test]
    fn test_undo_on_empty_queue_is_a_no_op() {
        let mut user = TestCombatantBuilder::new().build();
        let mut battle = start_battle(&mut user, "goblin", predictable_rng());
        let before = battle.current_view();

        assert_eq!(battle.request_undo(), Ok(false));
        assert_eq!(battle.current_view(), before);
    }

    #[test]
    fn test_attack_reload_then_undo_reload() {
        // Arrange
        let mut user = TestCombatantBuilder::new()
            .with_weapon("slingshot")
            .with_ammo("pebble", 1)
            .with_item("pebble", 3)
            .build();
        let mut battle = start_battle(&mut user, "goblin", predictable_rng());

        // Act
        assert_ok(battle.submit_action("attack", ActionPayload::default()));
        let after_attack = battle.user().stats.energy;
        assert_ok(battle.submit_action("reload", ActionPayload::item("pebble", 2)));
        assert_eq!(battle.user().stats.energy, after_attack - 2.0);
        assert_eq!(battle.user().available(&"pebble".into()), 1);
        assert_ok(battle.request_undo());

        // Assert
        assert_eq!(battle.user().stats.energy, after_attack);
        assert_eq!(after_attack, 45.0);
        assert_eq!(battle.user().available(&"pebble".into()), 3);
        let staged: Vec<ActionTag> = battle.staged().iter().map(|a| a.tag()).collect();
        assert_eq!(staged, vec![ActionTag::Attack]);
        assert!(battle.user().weapon.reserved, "attack keeps its weapon reserved");
        assert_eq!(battle.staged()[0].kind, ActionKind::Attack);
    }

    #[test]
    fn test_undo_after_commit_has_nothing_to_retract() {
        let mut user = TestCombatantBuilder::new().with_weapon("stone").build();
        let mut battle = start_battle(&mut user, "goblin", predictable_rng());

        assert_ok(battle.submit_action("attack", ActionPayload::default()));
        assert_ok(battle.request_turn_end());

        assert_eq!(battle.request_undo(), Ok(false));
        assert_eq!(battle.enemy().stats.health, 5.0 - 1.15);
    }
}
