use crate::errors::{ContentError, ContentResult};
use schema::{
    Buff, ItemData, ItemId, ShieldData, StatusEffectData, StatusId, UnitData, UnitId, WeaponData,
    FISTS, NO_WEAPON,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

const BUILTIN_CONTENT: &str = include_str!("../data/content.ron");

static BUILTIN_CATALOG: OnceLock<ContentResult<Catalog>> = OnceLock::new();

/// On-disk layout of a content file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ContentFile {
    items: Vec<ItemData>,
    units: Vec<UnitData>,
    statuses: Vec<StatusEffectData>,
}

/// Lookup tables for every item, unit and status effect the engine knows.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<ItemData>,
    item_index: HashMap<ItemId, usize>,
    units: HashMap<UnitId, UnitData>,
    statuses: HashMap<StatusId, StatusEffectData>,
}

impl Catalog {
    /// The content shipped with the crate, parsed once per process.
    pub fn builtin() -> ContentResult<&'static Catalog> {
        BUILTIN_CATALOG
            .get_or_init(|| Catalog::from_ron_str(BUILTIN_CONTENT))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn from_ron_str(source: &str) -> ContentResult<Self> {
        let file: ContentFile =
            ron::from_str(source).map_err(|e| ContentError::MalformedData(e.to_string()))?;
        Self::from_parts(file.items, file.units, file.statuses)
    }

    pub fn load(path: &Path) -> ContentResult<Self> {
        let source = fs::read_to_string(path).map_err(|e| ContentError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_ron_str(&source)
    }

    pub fn from_parts(
        items: Vec<ItemData>,
        units: Vec<UnitData>,
        statuses: Vec<StatusEffectData>,
    ) -> ContentResult<Self> {
        let mut item_index = HashMap::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            if item_index.insert(item.id.clone(), i).is_some() {
                return Err(ContentError::MalformedData(format!(
                    "duplicate item id '{}'",
                    item.id
                )));
            }
        }

        let catalog = Self {
            items,
            item_index,
            units: units.into_iter().map(|u| (u.id.clone(), u)).collect(),
            statuses: statuses.into_iter().map(|s| (s.id.clone(), s)).collect(),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Checks that every cross reference resolves and that the fallback
    /// weapons exist.
    fn validate(&self) -> ContentResult<()> {
        self.weapon(&ItemId::from(FISTS))?;
        self.weapon(&ItemId::from(NO_WEAPON))?;

        for item in &self.items {
            if let Some(weapon) = &item.weapon {
                if let Some(grant) = &weapon.inflicts {
                    self.status(&grant.effect)?;
                }
                if let Some(magazine) = &weapon.magazine {
                    for ammo in &magazine.accepts {
                        if !self.item(ammo)?.is_ammo() {
                            return Err(ContentError::MalformedData(format!(
                                "{} accepts {} which is not ammo",
                                item.id, ammo
                            )));
                        }
                    }
                }
            }
            for buff in item.consume.iter().flatten() {
                if let Buff::Status(grant) = buff {
                    self.status(&grant.effect)?;
                }
            }
        }

        for unit in self.units.values() {
            if let Some(weapon) = &unit.weapon {
                self.weapon(weapon)?;
            }
            if let Some(shield) = &unit.shield {
                self.shield(shield)?;
            }
            for (item, _) in &unit.items {
                self.item(item)?;
            }
        }
        Ok(())
    }

    pub fn item(&self, id: &ItemId) -> ContentResult<&ItemData> {
        self.item_index
            .get(id)
            .map(|&i| &self.items[i])
            .ok_or_else(|| ContentError::ItemNotFound(id.clone()))
    }

    pub fn weapon(&self, id: &ItemId) -> ContentResult<&WeaponData> {
        self.item(id)?
            .weapon
            .as_ref()
            .ok_or_else(|| ContentError::NotAWeapon(id.clone()))
    }

    pub fn shield(&self, id: &ItemId) -> ContentResult<&ShieldData> {
        self.item(id)?
            .shield
            .as_ref()
            .ok_or_else(|| ContentError::NotAShield(id.clone()))
    }

    pub fn unit(&self, id: &UnitId) -> ContentResult<&UnitData> {
        self.units
            .get(id)
            .ok_or_else(|| ContentError::UnitNotFound(id.clone()))
    }

    pub fn status(&self, id: &StatusId) -> ContentResult<&StatusEffectData> {
        self.statuses
            .get(id)
            .ok_or_else(|| ContentError::StatusNotFound(id.clone()))
    }

    /// Items in declaration order.
    pub fn items(&self) -> &[ItemData] {
        &self.items
    }

    pub fn units(&self) -> impl Iterator<Item = &UnitData> {
        self.units.values()
    }

    /// Items that can be rewarded after a won battle, in declaration order.
    pub fn battle_drops(&self) -> Vec<&ItemData> {
        self.items.iter().filter(|item| item.drops.battle).collect()
    }
}
