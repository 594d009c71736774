use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// UI-level action tags. These are the strings the rendering layer sends
/// when a button or menu entry is picked.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActionTag {
    Attack,
    #[strum(to_string = "evasion", serialize = "evade")]
    Evasion,
    Shield,
    Consume,
    Reload,
    Swap,
}

/// Which side of the battle a combatant is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Side {
    User,
    Enemy,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::User => Side::Enemy,
            Side::Enemy => Side::User,
        }
    }
}

/// Per-turn stance of a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    #[default]
    Default,
    Evading,
    Shielded,
}
