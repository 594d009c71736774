use rpg_battle::{
    ActionPayload, ActionTag, BattleConfig, BattleController, BattleEngineError, BattleRng,
    Catalog, Combatant, Stats, TerminalOutcome, TurnOutcome, WeaponEntity,
};
use std::path::Path;
use tracing_subscriber::EnvFilter;

const MAX_TURNS: u32 = 50;

/// Plays a scripted battle against a built-in unit and prints the log.
///
/// Usage: `rpg-battle [unit] [config.ron]`
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let unit = args.next().unwrap_or_else(|| "goblin".to_string());
    let config_path = args.next();

    if let Err(e) = run(&unit, config_path.as_deref()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(unit: &str, config_path: Option<&str>) -> Result<(), BattleEngineError> {
    let catalog = Catalog::builtin()?;
    let config = match config_path {
        Some(path) => BattleConfig::load(Path::new(path))?,
        None => BattleConfig::default(),
    };

    let mut user = Combatant::new(
        "demo",
        "Wanderer",
        Stats {
            health: 20.0,
            health_max: 20.0,
            energy: 30.0,
            energy_max: 30.0,
            strength: 0.0,
            defense: 0.0,
        },
    );
    user.weapon = WeaponEntity::new(catalog, &"stone".into())?;
    user.give_item(catalog, &"energy_bar".into(), 2)?;
    user.give_item(catalog, &"mochi_cookie".into(), 1)?;

    let mut battle = BattleController::start(
        &mut user,
        &unit.into(),
        catalog,
        config,
        BattleRng::new_random(),
    )?;

    let outcome = loop {
        if battle.turn() > MAX_TURNS {
            println!("Nobody won after {} turns.", MAX_TURNS);
            return Ok(());
        }

        let available = battle.available_actions();
        let low_energy = battle.user().stats.energy < 5.0;
        if low_energy && available.contains(&ActionTag::Consume) {
            let snack = if battle.user().stack(&"energy_bar".into()).is_some() {
                "energy_bar"
            } else {
                "mochi_cookie"
            };
            if let Err(e) = battle.submit_action("consume", ActionPayload::item(snack, 1)) {
                println!("  ({})", e);
            }
        }
        let tag = if available.contains(&ActionTag::Attack) {
            "attack"
        } else {
            "evasion"
        };
        if let Err(e) = battle.submit_action(tag, ActionPayload::default().bloody()) {
            println!("  ({})", e);
        }

        match battle.request_turn_end()? {
            TurnOutcome::Continue(view) => {
                println!(
                    "Turn {}: you {:.2} hp / {:.2} energy, {} {:.2} hp",
                    view.turn, view.user.health, view.user.energy, view.enemy.name, view.enemy.health
                );
            }
            TurnOutcome::Terminal(outcome) => break outcome,
        }
    };

    println!("\n{}", battle.events());
    match outcome {
        TerminalOutcome::Victory { exp_after, loot, .. } => {
            println!("Victory! Experience is now {:.2}.", exp_after);
            for (item, amount) in loot {
                println!("  + {} x{}", item, amount);
            }
        }
        TerminalOutcome::Defeat { user_health } => {
            println!("Defeated with {:.2} health left.", user_health);
        }
    }
    Ok(())
}
