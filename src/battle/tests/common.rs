use crate::battle::controller::BattleController;
use crate::battle::state::{BattleEvent, BattleRng};
use crate::combatant::{Combatant, ShieldEntity, WeaponEntity};
use crate::config::BattleConfig;
use crate::content::Catalog;
use crate::errors::ActionError;
use schema::Stats;

/// A builder for test combatants with common defaults: 20 health,
/// 50 energy, fists and an empty bag.
///
/// # Example
/// ```
/// let user = TestCombatantBuilder::new()
///     .with_weapon("slingshot")
///     .with_ammo("pebble", 1)
///     .with_item("pebble", 3)
///     .build();
/// ```
pub struct TestCombatantBuilder {
    health: f64,
    energy: f64,
    weapon: Option<&'static str>,
    durability: Option<u32>,
    ammo: Vec<&'static str>,
    shield: Option<&'static str>,
    items: Vec<(&'static str, u32)>,
}

impl TestCombatantBuilder {
    pub fn new() -> Self {
        Self {
            health: 20.0,
            energy: 50.0,
            weapon: None,
            durability: None,
            ammo: Vec::new(),
            shield: None,
            items: Vec::new(),
        }
    }

    pub fn with_health(mut self, health: f64) -> Self {
        self.health = health;
        self
    }

    pub fn with_energy(mut self, energy: f64) -> Self {
        self.energy = energy;
        self
    }

    /// Equips a fresh copy of `weapon`.
    pub fn with_weapon(mut self, weapon: &'static str) -> Self {
        self.weapon = Some(weapon);
        self
    }

    /// Overrides the equipped weapon's remaining durability.
    pub fn with_durability(mut self, durability: u32) -> Self {
        self.durability = Some(durability);
        self
    }

    /// Preloads the equipped weapon's magazine.
    pub fn with_ammo(mut self, ammo: &'static str, amount: usize) -> Self {
        self.ammo.extend(std::iter::repeat(ammo).take(amount));
        self
    }

    pub fn with_shield(mut self, shield: &'static str) -> Self {
        self.shield = Some(shield);
        self
    }

    /// Adds inventory; weapon items become spare weapons.
    pub fn with_item(mut self, item: &'static str, amount: u32) -> Self {
        self.items.push((item, amount));
        self
    }

    pub fn build(self) -> Combatant {
        let catalog = catalog();
        let mut combatant = Combatant::new(
            "tester",
            "Tester",
            Stats {
                health: self.health,
                health_max: 20.0,
                energy: self.energy,
                energy_max: 50.0,
                strength: 0.0,
                defense: 0.0,
            },
        );

        if let Some(weapon) = self.weapon {
            combatant.weapon = match WeaponEntity::new(catalog, &weapon.into()) {
                Ok(entity) => entity,
                Err(err) => panic!("Failed to build weapon {}: {}", weapon, err),
            };
        }
        if let Some(durability) = self.durability {
            combatant.weapon.durability = Some(durability);
        }
        combatant.weapon.ammo = self.ammo.into_iter().map(Into::into).collect();
        if let Some(shield) = self.shield {
            combatant.shield = Some(
                ShieldEntity::new(catalog, &shield.into()).expect("test shield should exist"),
            );
        }
        for (item, amount) in self.items {
            combatant
                .give_item(catalog, &item.into(), amount)
                .expect("test item should exist");
        }
        combatant
    }
}

pub fn catalog() -> &'static Catalog {
    Catalog::builtin().expect("built-in content should load")
}

/// Rolls 0.99 forever: no critical hits, no evasions.
pub fn predictable_rng() -> BattleRng {
    BattleRng::new_for_test(vec![0.99])
}

/// Starts a battle against a built-in unit with default rules.
pub fn start_battle<'a>(user: &'a mut Combatant, unit: &str, rng: BattleRng) -> BattleController<'a> {
    match BattleController::start(user, &unit.into(), catalog(), BattleConfig::default(), rng) {
        Ok(battle) => battle,
        Err(err) => panic!("Failed to start battle against {}: {}", unit, err),
    }
}

/// Helper function to assert that a Result is Ok and return the value.
pub fn assert_ok<T>(result: Result<T, ActionError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {} but got {}",
        expected,
        actual
    );
}

/// Counts events matching `predicate`.
pub fn count_events(battle: &BattleController<'_>, predicate: impl Fn(&BattleEvent) -> bool) -> usize {
    battle
        .events()
        .events()
        .iter()
        .filter(|event| predicate(event))
        .count()
}
