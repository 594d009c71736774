use crate::{ItemId, StatusId};
use serde::{Deserialize, Serialize};

fn yes() -> bool {
    true
}

/// Where an item may show up as a random reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropFlags {
    #[serde(default = "yes")]
    pub walk: bool,
    #[serde(default = "yes")]
    pub battle: bool,
    #[serde(default = "yes")]
    pub shop: bool,
}

impl Default for DropFlags {
    fn default() -> Self {
        Self {
            walk: true,
            battle: true,
            shop: true,
        }
    }
}

/// A status effect handed out by a consumable or a weapon hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusGrant {
    pub effect: StatusId,
    pub duration: u32,
    pub magnitude: f64,
}

/// One effect of a consumable. Values are per consumed unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Buff {
    Health(f64),
    Energy(f64),
    Experience(f64),
    Status(StatusGrant),
}

/// Ammo slot of a weapon that needs loading before it can fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagazineData {
    pub capacity: u32,
    pub accepts: Vec<ItemId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponData {
    pub damage: f64,
    /// Turns the weapon stays unusable after an attack.
    pub cooldown: u32,
    pub critical_chance: f64,
    pub critical_ratio: f64,
    /// `None` means the weapon never breaks.
    #[serde(default)]
    pub durability: Option<u32>,
    #[serde(default)]
    pub magazine: Option<MagazineData>,
    #[serde(default)]
    pub inflicts: Option<StatusGrant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShieldData {
    /// Damage absorbed from each hit while shielded.
    pub defense: f64,
    pub durability: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmmoData {
    /// Added to the firing weapon's base damage.
    pub damage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    pub id: ItemId,
    pub rarity: f64,
    pub cost: f64,
    #[serde(default)]
    pub drops: DropFlags,
    #[serde(default)]
    pub weapon: Option<WeaponData>,
    #[serde(default)]
    pub shield: Option<ShieldData>,
    #[serde(default)]
    pub consume: Option<Vec<Buff>>,
    #[serde(default)]
    pub ammo: Option<AmmoData>,
}

impl ItemData {
    pub fn is_weapon(&self) -> bool {
        self.weapon.is_some()
    }

    pub fn is_consumable(&self) -> bool {
        self.consume.as_ref().is_some_and(|buffs| !buffs.is_empty())
    }

    pub fn is_ammo(&self) -> bool {
        self.ammo.is_some()
    }
}
