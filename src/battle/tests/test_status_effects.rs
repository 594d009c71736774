#[cfg(test)]
mod tests {
    use crate::battle::action::ActionPayload;
    use crate::battle::state::BattleEvent;
    use crate::battle::tests::common::{
        assert_close, assert_ok, count_events, predictable_rng, start_battle, TestCombatantBuilder,
    };
    use pretty_assertions::assert_eq;
    use schema::Side;

    #[test]
    fn test_regeneration_ticks_once_per_settlement() {
        // Arrange
        let mut user = TestCombatantBuilder::new()
            .with_health(10.0)
            .with_item("herbal_tea", 1)
            .build();
        let mut battle = start_battle(&mut user, "goblin", predictable_rng());

        // Act
        assert_ok(battle.submit_action("consume", ActionPayload::item("herbal_tea", 1)));
        assert_ok(battle.request_turn_end());

        // Assert
        // Applied at commit, then ticked at the same settlement.
        assert_close(battle.user().stats.health, 11.0);
        assert_eq!(battle.user().statuses[0].remaining, 2);

        assert_ok(battle.request_turn_end());
        assert_ok(battle.request_turn_end());
        assert_close(battle.user().stats.health, 13.0);
        assert!(battle.user().statuses.is_empty());
        assert_eq!(
            count_events(&battle, |e| matches!(e, BattleEvent::StatusExpired { .. })),
            1
        );

        assert_ok(battle.request_turn_end());
        assert_close(battle.user().stats.health, 13.0);
    }

    #[test]
    fn test_enemy_statuses_tick_once_per_enemy_half_turn() {
        // Arrange
        let mut user = TestCombatantBuilder::new().build();
        let mut battle = start_battle(&mut user, "obstruction", predictable_rng());

        // Act
        // Enemy poisons the user on turn 1; the user's ledger ticks at the
        // user's own settlements only.
        assert_ok(battle.request_turn_end());
        let after_first = battle.user().stats.health;
        assert_close(after_first, 20.0 - 0.6);
        assert_eq!(battle.user().statuses[0].remaining, 2);

        assert_ok(battle.request_turn_end());

        // Assert
        assert_close(battle.user().stats.health, after_first - 0.5);
        let ticks = count_events(&battle, |e| {
            matches!(
                e,
                BattleEvent::StatusTicked {
                    side: Side::User,
                    ..
                }
            )
        });
        assert_eq!(ticks, 1);
        assert_eq!(
            count_events(&battle, |e| matches!(
                e,
                BattleEvent::StatusTicked {
                    side: Side::Enemy,
                    ..
                }
            )),
            0
        );
    }
}
