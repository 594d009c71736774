// In: src/lib.rs

//! RPG Battle Engine
//!
//! Turn-based combat between a player and an NPC unit. Actions are staged,
//! can be undone until the turn is committed, and resolve strictly in order.
//! Item, unit and status content is plain RON data.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod combatant;
pub mod config;
pub mod content;
pub mod errors;
pub mod progression;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{
    ActionTag, Buff, ItemData, ItemId, Side, StatusGrant, StatusId, StatusKind, Stats, TurnState,
    UnitData, UnitId, WeaponData,
};

// --- From this crate's modules (`src/`) ---

// Battle session and its inputs/outputs.
pub use battle::action::{Action, ActionKind, ActionPayload};
pub use battle::controller::BattleController;
pub use battle::state::{BattleEvent, BattlePhase, BattleRng, EventBus, HoldReason, LogEntry};
pub use battle::view::{TerminalOutcome, TurnOutcome, ViewModel};

// Runtime data.
pub use combatant::{Combatant, ItemStack, Payment, WeaponEntity};
pub use config::BattleConfig;
pub use content::Catalog;
pub use progression::{Reward, RewardCalculator};

// Crate-specific error and result types.
pub use errors::{
    ActionError, BattleEngineError, BattleResult, ConfigError, ContentError, ContentResult,
    InvalidReason,
};
