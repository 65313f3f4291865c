//! Permanent upgrade shop
//!
//! Each item has a linear cost curve and a level cap. Purchases spend from the
//! points ledger and bump the matching progression level.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Leveled bonuses carried across runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermanentUpgrade {
    Vitality,
    Damage,
    CritChance,
    MoveSpeed,
    AttackSpeed,
    Luck,
}

/// Static shop entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShopItem {
    pub upgrade: PermanentUpgrade,
    pub name: &'static str,
    pub base_cost: u64,
    pub cost_increase_per_level: u64,
    pub max_level: u32,
    /// Stat change per purchased level (attack speed is a reduction in ms)
    pub effect_per_level: f32,
}

pub const SHOP_ITEMS: [ShopItem; 6] = [
    ShopItem {
        upgrade: PermanentUpgrade::Vitality,
        name: "Base Vitality",
        base_cost: 100,
        cost_increase_per_level: 150,
        max_level: 10,
        effect_per_level: 5.0,
    },
    ShopItem {
        upgrade: PermanentUpgrade::Damage,
        name: "Base Projectile Damage",
        base_cost: 150,
        cost_increase_per_level: 200,
        max_level: 10,
        effect_per_level: 1.0,
    },
    ShopItem {
        upgrade: PermanentUpgrade::CritChance,
        name: "Starting Crit Chance",
        base_cost: 200,
        cost_increase_per_level: 250,
        max_level: 5,
        effect_per_level: 0.005,
    },
    ShopItem {
        upgrade: PermanentUpgrade::MoveSpeed,
        name: "Starting Agility",
        base_cost: 120,
        cost_increase_per_level: 180,
        max_level: 5,
        effect_per_level: 0.2,
    },
    ShopItem {
        upgrade: PermanentUpgrade::AttackSpeed,
        name: "Quick Draw",
        base_cost: 180,
        cost_increase_per_level: 220,
        max_level: 5,
        effect_per_level: 10.0,
    },
    ShopItem {
        upgrade: PermanentUpgrade::Luck,
        name: "Lucky Charm",
        base_cost: 300,
        cost_increase_per_level: 400,
        max_level: 3,
        effect_per_level: 1.0,
    },
];

impl PermanentUpgrade {
    pub const ALL: [PermanentUpgrade; 6] = [
        PermanentUpgrade::Vitality,
        PermanentUpgrade::Damage,
        PermanentUpgrade::CritChance,
        PermanentUpgrade::MoveSpeed,
        PermanentUpgrade::AttackSpeed,
        PermanentUpgrade::Luck,
    ];

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "vitality" | "hp" => Some(PermanentUpgrade::Vitality),
            "damage" => Some(PermanentUpgrade::Damage),
            "crit_chance" | "crit" => Some(PermanentUpgrade::CritChance),
            "move_speed" | "agility" => Some(PermanentUpgrade::MoveSpeed),
            "attack_speed" | "quick_draw" => Some(PermanentUpgrade::AttackSpeed),
            "luck" => Some(PermanentUpgrade::Luck),
            _ => None,
        }
    }

    pub fn item(self) -> &'static ShopItem {
        match self {
            PermanentUpgrade::Vitality => &SHOP_ITEMS[0],
            PermanentUpgrade::Damage => &SHOP_ITEMS[1],
            PermanentUpgrade::CritChance => &SHOP_ITEMS[2],
            PermanentUpgrade::MoveSpeed => &SHOP_ITEMS[3],
            PermanentUpgrade::AttackSpeed => &SHOP_ITEMS[4],
            PermanentUpgrade::Luck => &SHOP_ITEMS[5],
        }
    }
}

impl ShopItem {
    /// Price of the next level when `current_level` levels are owned
    pub fn cost_at(&self, current_level: u32) -> u64 {
        self.base_cost + self.cost_increase_per_level * current_level as u64
    }

    /// Total effect at the given level
    pub fn effect_at(&self, level: u32) -> f32 {
        self.effect_per_level * level.min(self.max_level) as f32
    }
}

/// Why a purchase was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseError {
    MaxLevel { upgrade: PermanentUpgrade, max_level: u32 },
    InsufficientPoints { cost: u64, available: u64 },
}

impl fmt::Display for PurchaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurchaseError::MaxLevel { upgrade, max_level } => {
                write!(f, "{:?} is already at max level {}", upgrade, max_level)
            }
            PurchaseError::InsufficientPoints { cost, available } => {
                write!(f, "costs {} points but only {} available", cost, available)
            }
        }
    }
}

impl std::error::Error for PurchaseError {}
