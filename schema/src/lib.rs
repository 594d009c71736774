// RPG Battle Schema - Shared content definitions
// Items, units and status effects are authored as RON data and
// deserialized into these types; the engine crate only reads them.

// Re-export the main types
pub use actions::*;
pub use ids::*;
pub use item_data::*;
pub use unit_data::*;

pub mod actions;
pub mod ids;
pub mod item_data;
pub mod unit_data;
