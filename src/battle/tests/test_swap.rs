#[cfg(test)]
mod tests {
    use crate::battle::action::ActionPayload;
    use crate::battle::tests::common::{assert_ok, predictable_rng, start_battle, TestCombatantBuilder};
    use crate::errors::{ActionError, InvalidReason};
    use pretty_assertions::assert_eq;
    use schema::{ActionTag, FISTS};

    #[test]
    fn test_swap_equips_spare_and_stores_previous() {
        // Arrange
        let mut user = TestCombatantBuilder::new()
            .with_weapon("stone")
            .with_item("aluminum_sword", 1)
            .build();
        let mut battle = start_battle(&mut user, "goblin", predictable_rng());

        // Act
        assert_ok(battle.submit_action("swap", ActionPayload::slot(0)));
        assert_ok(battle.request_turn_end());

        // Assert
        let user = battle.user();
        assert_eq!(user.weapon.item.as_str(), "aluminum_sword");
        let spares: Vec<&str> = user.spare_weapons.iter().map(|w| w.item.as_str()).collect();
        assert_eq!(spares, vec!["stone"]);
        assert!(user.spare_weapons.iter().all(|w| !w.reserved));
    }

    #[test]
    fn test_swap_to_fists_keeps_weapon() {
        let mut user = TestCombatantBuilder::new().with_weapon("wooden_sword").build();
        let mut battle = start_battle(&mut user, "goblin", predictable_rng());

        assert_ok(battle.submit_action("swap", ActionPayload::default()));
        assert_ok(battle.request_turn_end());

        assert_eq!(battle.user().weapon.item.as_str(), FISTS);
        assert_eq!(battle.user().spare_weapons.len(), 1);
        assert_eq!(battle.user().spare_weapons[0].durability, Some(25));
    }

    #[test]
    fn test_swap_excludes_other_weapon_actions() {
        // Arrange
        let mut user = TestCombatantBuilder::new()
            .with_weapon("stone")
            .with_item("wooden_sword", 1)
            .build();
        let mut battle = start_battle(&mut user, "goblin", predictable_rng());

        // Act
        assert_ok(battle.submit_action("swap", ActionPayload::slot(0)));
        let attack = battle.submit_action("attack", ActionPayload::default());
        let second_swap = battle.submit_action("swap", ActionPayload::default());

        // Assert
        let conflict = Err(ActionError::InvalidAction(InvalidReason::SwapConflict));
        assert_eq!(attack, conflict);
        assert_eq!(second_swap, conflict);
        assert!(!battle.available_actions().contains(&ActionTag::Attack));
        assert!(battle.available_actions().contains(&ActionTag::Evasion));
    }

    #[test]
    fn test_swap_to_missing_slot_is_rejected() {
        let mut user = TestCombatantBuilder::new().with_weapon("stone").build();
        let mut battle = start_battle(&mut user, "goblin", predictable_rng());

        assert_eq!(
            battle.submit_action("swap", ActionPayload::slot(3)),
            Err(ActionError::InvalidAction(InvalidReason::NoSuchSlot(3)))
        );
        assert_eq!(battle.user().stats.energy, 50.0);
    }
}
