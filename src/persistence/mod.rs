//! Cross-run progression
//!
//! Features:
//! - Leveled permanent bonuses folded into the player's base stats at run start
//! - Points ledger credited with each run's final score
//! - Shop purchases validated against cost curves and level caps
//! - JSON save file, written via tmp file + rename

pub mod shop;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub use shop::{PermanentUpgrade, PurchaseError, SHOP_ITEMS, ShopItem};

/// Purchased levels of each permanent upgrade
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progression {
    pub vitality: u32,
    pub damage: u32,
    pub crit_chance: u32,
    pub move_speed: u32,
    pub attack_speed: u32,
    pub luck: u32,
}

impl Progression {
    pub fn level(&self, upgrade: PermanentUpgrade) -> u32 {
        match upgrade {
            PermanentUpgrade::Vitality => self.vitality,
            PermanentUpgrade::Damage => self.damage,
            PermanentUpgrade::CritChance => self.crit_chance,
            PermanentUpgrade::MoveSpeed => self.move_speed,
            PermanentUpgrade::AttackSpeed => self.attack_speed,
            PermanentUpgrade::Luck => self.luck,
        }
    }

    fn level_mut(&mut self, upgrade: PermanentUpgrade) -> &mut u32 {
        match upgrade {
            PermanentUpgrade::Vitality => &mut self.vitality,
            PermanentUpgrade::Damage => &mut self.damage,
            PermanentUpgrade::CritChance => &mut self.crit_chance,
            PermanentUpgrade::MoveSpeed => &mut self.move_speed,
            PermanentUpgrade::AttackSpeed => &mut self.attack_speed,
            PermanentUpgrade::Luck => &mut self.luck,
        }
    }

    /// Total stat bonus granted by an upgrade at its current level
    pub fn bonus(&self, upgrade: PermanentUpgrade) -> f32 {
        upgrade.item().effect_at(self.level(upgrade))
    }
}

/// Everything written to disk between runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveData {
    pub total_points: u64,
    pub progression: Progression,
}

impl SaveData {
    /// Load from a JSON file. A missing file yields a fresh save; fields absent
    /// from an older file keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No save at {}, starting fresh", path.display());
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read save file {}", path.display()))?;
        let data: SaveData = serde_json::from_str(&json)
            .with_context(|| format!("save file {} is not valid JSON", path.display()))?;
        log::info!("Loaded save: {} points", data.total_points);
        Ok(data)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, self)?;
        log::info!("Saved progression ({} points)", self.total_points);
        Ok(())
    }

    /// Credit a finished run
    pub fn award_run(&mut self, final_score: u64) {
        self.total_points = self.total_points.saturating_add(final_score);
    }

    /// Buy the next level of an upgrade. Returns the new level.
    pub fn purchase(&mut self, upgrade: PermanentUpgrade) -> Result<u32, PurchaseError> {
        let item = upgrade.item();
        let level = self.progression.level(upgrade);
        if level >= item.max_level {
            return Err(PurchaseError::MaxLevel {
                upgrade,
                max_level: item.max_level,
            });
        }
        let cost = item.cost_at(level);
        if self.total_points < cost {
            return Err(PurchaseError::InsufficientPoints {
                cost,
                available: self.total_points,
            });
        }
        self.total_points -= cost;
        let slot = self.progression.level_mut(upgrade);
        *slot += 1;
        log::debug!("Purchased {:?} level {} for {}", upgrade, *slot, cost);
        Ok(*slot)
    }
}

/// Serialize to `<path>.tmp`, then rename over `path`
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("failed to serialize")?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to move {} into place", tmp.display()))?;
    Ok(())
}
