use schema::{ItemId, Side, StatusId, UnitId};
use thiserror::Error;

/// Main error type for the battle engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BattleEngineError {
    /// A player or NPC action was rejected
    #[error("Action error: {0}")]
    Action(#[from] ActionError),
    /// Content lookup or parsing failed
    #[error("Content error: {0}")]
    Content(#[from] ContentError),
    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors reported back to whoever submitted an action. None of them
/// change battle state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    /// Cost exceeds energy and paying with health was not allowed
    #[error("Not enough energy: need {required}, have {available}")]
    InsufficientResource { required: f64, available: f64 },
    /// Preconditions of the action are not met
    #[error("Invalid action: {0}")]
    InvalidAction(#[from] InvalidReason),
    /// The actor does not own the current turn
    #[error("It is not {actor}'s turn ({owner} is acting)")]
    NotYourTurn { actor: Side, owner: Side },
    /// The battle already reached its terminal state
    #[error("The battle is already over")]
    BattleOver,
}

/// Why an action could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidReason {
    #[error("unknown action tag '{0}'")]
    UnknownTag(String),
    #[error("the equipped weapon cannot attack")]
    CannotAttack,
    #[error("weapon is cooling down for {0} more turn(s)")]
    WeaponCoolingDown(u32),
    #[error("the weapon is already committed to an attack this turn")]
    WeaponAlreadyCommitted,
    #[error("the weapon has no ammo loaded")]
    OutOfAmmo,
    #[error("no shield is equipped")]
    NoShield,
    #[error("the equipped weapon has no ammo slot")]
    NoAmmoSlot,
    #[error("{0} is not accepted by the equipped weapon")]
    AmmoNotAccepted(ItemId),
    #[error("{0} is not a weapon")]
    NotAWeapon(ItemId),
    #[error("{0} cannot be consumed")]
    NotConsumable(ItemId),
    #[error("no spare weapon in slot {0}")]
    NoSuchSlot(usize),
    #[error("that weapon is already equipped")]
    AlreadyEquipped,
    #[error("an item must be selected")]
    MissingItem,
    #[error("amount must be at least 1")]
    ZeroAmount,
    #[error("requested {requested} of {item} but only {available} available")]
    NotEnoughItems {
        item: ItemId,
        requested: u32,
        available: u32,
    },
    #[error("a weapon swap cannot share a turn with other weapon actions")]
    SwapConflict,
}

/// Errors related to content lookup and loading
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),
    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),
    #[error("Status effect not found: {0}")]
    StatusNotFound(StatusId),
    #[error("{0} is not a weapon")]
    NotAWeapon(ItemId),
    #[error("{0} is not a shield")]
    NotAShield(ItemId),
    #[error("Failed to read content file '{path}': {message}")]
    Io { path: String, message: String },
    #[error("Malformed content data: {0}")]
    MalformedData(String),
}

/// Errors related to loading a battle configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {message}")]
    Io { path: String, message: String },
    #[error("Malformed config: {0}")]
    Parse(String),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;

/// Type alias for Results using ContentError
pub type ContentResult<T> = Result<T, ContentError>;
