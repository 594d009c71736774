use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! content_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

content_id!(
    /// Key of an item definition (e.g. `"stone"`).
    ItemId
);
content_id!(
    /// Key of a unit template (e.g. `"goblin"`).
    UnitId
);
content_id!(
    /// Key of a status effect definition (e.g. `"poison"`).
    StatusId
);

/// The weapon every combatant falls back to when its weapon breaks.
pub const FISTS: &str = "punch";

/// Placeholder weapon for units that cannot attack at all.
pub const NO_WEAPON: &str = "none";
