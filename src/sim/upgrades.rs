//! In-run upgrade catalog and level-up choice generation
//!
//! Upgrades are plain data: each catalog entry carries an [`UpgradeEffect`]
//! that [`apply_effect`] interprets against a player. Common-tier magnitudes
//! are scaled by the player's common effectiveness at the time of the pick.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Epic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeId {
    // Common
    Catalyst,
    Vision,
    Growth,
    Boost,
    Renew,
    Resistance,
    Resonance,
    Souls,
    Stability,
    Speed,
    // Uncommon
    Catalyst2,
    Charge,
    Camouflage,
    Fragmentation1,
    Friction1,
    Growth2,
    Gush,
    Leech1,
    Luck,
    Orb,
    Precision,
    Rage,
    Regeneration,
    Shrink,
    Swift,
    Thunderbolt1,
    // Epic
    Appraisal,
    Barrier,
    Cold,
    Fragmentation2,
    Friction2,
    Focus,
    Growth3,
    Leech2,
    Superheat,
    Thunderbolt2,
    Tome,
    Wisp,
    Wound,
    /// Never offered at level-up
    Immortal,
}

impl UpgradeId {
    pub fn def(self) -> &'static Upgrade {
        // The catalog lists every id exactly once, in declaration order
        &CATALOG[self as usize]
    }

    pub fn rarity(self) -> Rarity {
        self.def().rarity
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }
}

/// Passive behaviors that an upgrade switches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Passive {
    Rage,
    Regeneration,
    Barrier,
    Cold,
    Focus,
    Superheat,
    Wisp,
    Bleed,
}

/// Data-described mutation of the player
///
/// `Scale*` variants multiply by `1 + value`; negative values shrink.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpgradeEffect {
    AddDamage(f32),
    AddCritChance(f32),
    AddCritMultiplier(f32),
    /// Raises max hp and heals by the same amount
    AddMaxHp(f32),
    AddDefense(f32),
    AddLifesteal(f32),
    AddHits(u32),
    AddJumps(u32),
    ScaleJumpPower(f32),
    ScaleSpeed(f32),
    ScaleAttackInterval(f32),
    ScaleProjectileSize(f32),
    ScaleHitbox(f32),
    FullHeal,
    AddCamouflage(f32),
    AddSoulOrbChance(f32),
    AddHealOrbChance(f32),
    AddLuck(u32),
    AddChoices(u32),
    AddCommonEffectiveness(f32),
    AddRevives(u32),
    /// Raise to at least this many projectiles per death
    Fragmentation(u32),
    /// Raise to at least this many shots per volley
    Friction(u32),
    /// Raise to at least this many strikes per cycle
    Thunderbolt(u32),
    Enable(Passive),
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Upgrade {
    pub id: UpgradeId,
    pub name: &'static str,
    pub description: &'static str,
    pub rarity: Rarity,
    pub effect: UpgradeEffect,
}

const fn up(id: UpgradeId, name: &'static str, description: &'static str, rarity: Rarity, effect: UpgradeEffect) -> Upgrade {
    Upgrade {
        id,
        name,
        description,
        rarity,
        effect,
    }
}

use Rarity::{Common, Epic, Uncommon};
use UpgradeEffect as E;
use UpgradeId as U;

pub const CATALOG: &[Upgrade] = &[
    up(U::Catalyst, "Catalyst", "Projectile damage +2", Common, E::AddDamage(2.0)),
    up(U::Vision, "Vision", "Crit chance +5%", Common, E::AddCritChance(0.05)),
    up(U::Growth, "Growth", "Max HP +10", Common, E::AddMaxHp(10.0)),
    up(U::Boost, "Boost", "Jump height +30%", Common, E::ScaleJumpPower(0.3)),
    up(U::Renew, "Renew", "Heal to full HP", Common, E::FullHeal),
    up(U::Resistance, "Resistance", "Defense +4%", Common, E::AddDefense(0.04)),
    up(U::Resonance, "Resonance", "Attack speed +12%", Common, E::ScaleAttackInterval(-0.12)),
    up(U::Souls, "Souls", "Soul orb drop chance +1%", Common, E::AddSoulOrbChance(0.01)),
    up(U::Stability, "Stability", "Projectiles hit one more enemy", Common, E::AddHits(1)),
    up(U::Speed, "Speed", "Movement speed +20%", Common, E::ScaleSpeed(0.2)),
    up(U::Catalyst2, "Catalyst II", "Projectile damage +4", Uncommon, E::AddDamage(4.0)),
    up(U::Charge, "Charge", "Projectile size +20%", Uncommon, E::ScaleProjectileSize(0.2)),
    up(U::Camouflage, "Camouflage", "Invincibility after a hit lasts 10% longer", Uncommon, E::AddCamouflage(0.1)),
    up(U::Fragmentation1, "Fragmentation", "Enemies release 2 weak projectiles on death", Uncommon, E::Fragmentation(2)),
    up(U::Friction1, "Friction", "Walking launches 1 explosive projectile", Uncommon, E::Friction(1)),
    up(U::Growth2, "Growth II", "Max HP +20", Uncommon, E::AddMaxHp(20.0)),
    up(U::Gush, "Gush", "One extra jump", Uncommon, E::AddJumps(1)),
    up(U::Leech1, "Leech", "Heal 3% of damage dealt", Uncommon, E::AddLifesteal(0.03)),
    up(U::Luck, "Luck", "Rare upgrades show up more often", Uncommon, E::AddLuck(1)),
    up(U::Orb, "Orb", "Enemies have a 5% chance to drop a healing orb", Uncommon, E::AddHealOrbChance(0.05)),
    up(U::Precision, "Precision", "Critical hits deal 50% more damage", Uncommon, E::AddCritMultiplier(0.5)),
    up(U::Rage, "Rage", "Below half HP, deal up to 50% more damage", Uncommon, E::Enable(Passive::Rage)),
    up(U::Regeneration, "Regeneration", "Regenerate HP based on living enemies", Uncommon, E::Enable(Passive::Regeneration)),
    up(U::Shrink, "Shrink", "Become 10% smaller", Uncommon, E::ScaleHitbox(-0.1)),
    up(U::Swift, "Swift", "Movement speed +40%", Uncommon, E::ScaleSpeed(0.4)),
    up(U::Thunderbolt1, "Thunderbolt", "Call down 2 lightning strikes", Uncommon, E::Thunderbolt(2)),
    up(U::Appraisal, "Appraisal", "One more upgrade choice from now on", Epic, E::AddChoices(1)),
    up(U::Barrier, "Barrier", "A recharging shield blocks one hit", Epic, E::Enable(Passive::Barrier)),
    up(U::Cold, "Cold", "Damaged enemies are slowed", Epic, E::Enable(Passive::Cold)),
    up(U::Fragmentation2, "Fragmentation II", "Enemies release 6 weak projectiles on death", Epic, E::Fragmentation(6)),
    up(U::Friction2, "Friction II", "Walking launches 3 explosive projectiles", Epic, E::Friction(3)),
    up(U::Focus, "Focus", "Attack faster while standing still", Epic, E::Enable(Passive::Focus)),
    up(U::Growth3, "Growth III", "Max HP +40", Epic, E::AddMaxHp(40.0)),
    up(U::Leech2, "Leech II", "Heal 9% of damage dealt", Epic, E::AddLifesteal(0.09)),
    up(U::Superheat, "Superheat", "Your body deals 40 contact damage per second", Epic, E::Enable(Passive::Superheat)),
    up(U::Thunderbolt2, "Thunderbolt II", "Call down 6 lightning strikes", Epic, E::Thunderbolt(6)),
    up(U::Tome, "Tome", "New common upgrades are 35% more effective", Epic, E::AddCommonEffectiveness(0.35)),
    up(U::Wisp, "Wisp", "Summon a companion that attacks", Epic, E::Enable(Passive::Wisp)),
    up(U::Wound, "Wound", "Dealing damage applies bleed", Epic, E::Enable(Passive::Bleed)),
    up(U::Immortal, "Immortal", "+1 revive", Epic, E::AddRevives(1)),
];

pub fn find(id: UpgradeId) -> &'static Upgrade {
    id.def()
}

/// Whether an upgrade can appear in a level-up batch
pub fn offered_randomly(id: UpgradeId) -> bool {
    id != UpgradeId::Immortal
}

/// Interpret an effect. `effectiveness` scales magnitudes and is 1 outside the common tier.
pub fn apply_effect(player: &mut Player, effect: UpgradeEffect, effectiveness: f32) {
    let e = effectiveness;
    let stats = &mut player.stats;
    let bag = &mut player.upgrades;
    match effect {
        E::AddDamage(v) => stats.projectile_damage += v * e,
        E::AddCritChance(v) => stats.crit_chance += v * e,
        E::AddCritMultiplier(v) => stats.crit_multiplier += v * e,
        E::AddMaxHp(v) => {
            stats.max_hp += v * e;
            player.hp += v * e;
        }
        E::AddDefense(v) => stats.defense += v * e,
        E::AddLifesteal(v) => stats.lifesteal += v * e,
        E::AddHits(n) => stats.projectile_hits += n * e.round().max(0.0) as u32,
        E::AddJumps(n) => stats.max_jumps += n,
        E::ScaleJumpPower(v) => stats.jump_power *= 1.0 + v * e,
        E::ScaleSpeed(v) => stats.speed *= 1.0 + v * e,
        E::ScaleAttackInterval(v) => stats.attack_interval_ms *= 1.0 + v * e,
        E::ScaleProjectileSize(v) => stats.projectile_size *= 1.0 + v * e,
        E::ScaleHitbox(v) => bag.shrink *= 1.0 + v * e,
        E::FullHeal => player.hp = stats.max_hp,
        E::AddCamouflage(v) => bag.camouflage += v * e,
        E::AddSoulOrbChance(v) => bag.soul_orb_chance += v * e,
        E::AddHealOrbChance(v) => bag.heal_orb_chance += v * e,
        E::AddLuck(n) => bag.luck += n,
        E::AddChoices(n) => bag.level_up_choices += n,
        E::AddCommonEffectiveness(v) => bag.common_effectiveness += v,
        E::AddRevives(n) => bag.revives += n,
        E::Fragmentation(n) => bag.fragmentation = bag.fragmentation.max(n),
        E::Friction(n) => bag.friction = bag.friction.max(n),
        E::Thunderbolt(n) => bag.thunderbolt = bag.thunderbolt.max(n),
        E::Enable(passive) => match passive {
            Passive::Rage => bag.rage = true,
            Passive::Regeneration => bag.regeneration = true,
            Passive::Barrier => {
                bag.barrier = true;
                player.passives.barrier_ready = true;
            }
            Passive::Cold => bag.cold = true,
            Passive::Focus => bag.focus = true,
            Passive::Superheat => bag.superheat = true,
            Passive::Wisp => bag.willowisp = true,
            Passive::Bleed => bag.bleed = true,
        },
    }
}

/// Apply a catalog upgrade, then bring hp and jumps back under their caps
pub fn apply_upgrade(player: &mut Player, id: UpgradeId) {
    let upgrade = id.def();
    let effectiveness = match upgrade.rarity {
        Rarity::Common => player.upgrades.common_effectiveness,
        _ => 1.0,
    };
    apply_effect(player, upgrade.effect, effectiveness);
    player.clamp_vitals();
    log::debug!("Applied upgrade {}", upgrade.name);
}

/// Tier for a 0-100 roll. Luck widens the epic and uncommon bands.
pub fn roll_rarity(roll: f32, luck: u32) -> Rarity {
    let luck = luck as f32;
    if roll < 5.0 + 2.0 * luck {
        Rarity::Epic
    } else if roll < 25.0 + 5.0 * luck {
        Rarity::Uncommon
    } else {
        Rarity::Common
    }
}

/// Build a batch of distinct upgrade choices
///
/// Each tier's pool is shuffled once and drawn without replacement. An empty
/// tier falls back to common, then to whatever pool still has entries; the
/// batch is shorter than `count` only when every pool is exhausted.
pub fn generate_choices(count: usize, luck: u32, rng: &mut impl Rng) -> Vec<UpgradeId> {
    let mut pools: [Vec<UpgradeId>; 3] = Default::default();
    for upgrade in CATALOG.iter().filter(|u| offered_randomly(u.id)) {
        pools[tier_index(upgrade.rarity)].push(upgrade.id);
    }
    for pool in pools.iter_mut() {
        pool.shuffle(rng);
    }

    let mut choices = Vec::with_capacity(count);
    while choices.len() < count {
        let tier = roll_rarity(rng.random::<f32>() * 100.0, luck);
        let preferred = [tier_index(tier), tier_index(Rarity::Common), 1, 2];
        let Some(pick) = preferred.iter().find_map(|&i| pools[i].pop()) else {
            break;
        };
        choices.push(pick);
    }
    choices
}

fn tier_index(rarity: Rarity) -> usize {
    match rarity {
        Rarity::Common => 0,
        Rarity::Uncommon => 1,
        Rarity::Epic => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Progression;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_matches_ids() {
        for (i, upgrade) in CATALOG.iter().enumerate() {
            assert_eq!(upgrade.id as usize, i, "{} out of place", upgrade.name);
        }
        assert_eq!(CATALOG.len(), UpgradeId::Immortal as usize + 1);
        assert_eq!(UpgradeId::Immortal.rarity(), Rarity::Epic);
    }

    #[test]
    fn test_tier_sizes() {
        let count = |r| CATALOG.iter().filter(|u| u.rarity == r && offered_randomly(u.id)).count();
        assert_eq!(count(Rarity::Common), 10);
        assert_eq!(count(Rarity::Uncommon), 16);
        assert_eq!(count(Rarity::Epic), 13);
    }

    #[test]
    fn test_roll_rarity_thresholds() {
        assert_eq!(roll_rarity(4.99, 0), Rarity::Epic);
        assert_eq!(roll_rarity(5.0, 0), Rarity::Uncommon);
        assert_eq!(roll_rarity(24.9, 0), Rarity::Uncommon);
        assert_eq!(roll_rarity(25.0, 0), Rarity::Common);
        assert_eq!(roll_rarity(8.0, 2), Rarity::Epic);
        assert_eq!(roll_rarity(34.0, 2), Rarity::Uncommon);
    }

    #[test]
    fn test_immortal_never_offered() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..200 {
            let batch = generate_choices(39, 10, &mut rng);
            assert!(!batch.contains(&UpgradeId::Immortal));
        }
    }

    #[test]
    fn test_batch_fills_until_exhausted() {
        let mut rng = Pcg32::seed_from_u64(2);
        let batch = generate_choices(100, 0, &mut rng);
        assert_eq!(batch.len(), 39);
        let unique: HashSet<_> = batch.iter().collect();
        assert_eq!(unique.len(), 39);
    }

    #[test]
    fn test_rarity_distribution() {
        let mut rng = Pcg32::seed_from_u64(99);
        let trials = 20_000;
        let mut epic = 0;
        let mut uncommon = 0;
        for _ in 0..trials {
            match generate_choices(1, 0, &mut rng)[0].rarity() {
                Rarity::Epic => epic += 1,
                Rarity::Uncommon => uncommon += 1,
                Rarity::Common => {}
            }
        }
        let epic_rate = epic as f32 / trials as f32;
        let uncommon_rate = uncommon as f32 / trials as f32;
        assert!((epic_rate - 0.05).abs() < 0.01, "epic {}", epic_rate);
        assert!((uncommon_rate - 0.20).abs() < 0.015, "uncommon {}", uncommon_rate);
    }

    #[test]
    fn test_common_effects_scale_with_effectiveness() {
        let mut p = Player::new(&Progression::default());
        p.upgrades.common_effectiveness = 1.35;
        apply_upgrade(&mut p, UpgradeId::Catalyst);
        assert!((p.stats.projectile_damage - 12.7).abs() < 1e-4);

        // Uncommon ignores effectiveness
        apply_upgrade(&mut p, UpgradeId::Catalyst2);
        assert!((p.stats.projectile_damage - 16.7).abs() < 1e-4);

        apply_upgrade(&mut p, UpgradeId::Stability);
        assert_eq!(p.stats.projectile_hits, 2);
    }

    #[test]
    fn test_growth_raises_max_and_current() {
        let mut p = Player::new(&Progression::default());
        p.hp = 40.0;
        apply_upgrade(&mut p, UpgradeId::Growth2);
        assert_eq!(p.stats.max_hp, 120.0);
        assert_eq!(p.hp, 60.0);
    }

    #[test]
    fn test_apply_clamps_vitals() {
        let mut p = Player::new(&Progression::default());
        p.hp = 500.0;
        p.jumps_left = 4;
        apply_upgrade(&mut p, UpgradeId::Vision);
        assert_eq!(p.hp, p.stats.max_hp);
        assert_eq!(p.jumps_left, p.stats.max_jumps);
    }

    #[test]
    fn test_max_style_upgrades_never_downgrade() {
        let mut p = Player::new(&Progression::default());
        apply_upgrade(&mut p, UpgradeId::Thunderbolt2);
        apply_upgrade(&mut p, UpgradeId::Thunderbolt1);
        assert_eq!(p.upgrades.thunderbolt, 6);
        apply_upgrade(&mut p, UpgradeId::Fragmentation1);
        assert_eq!(p.upgrades.fragmentation, 2);
    }

    #[test]
    fn test_barrier_arrives_ready() {
        let mut p = Player::new(&Progression::default());
        apply_upgrade(&mut p, UpgradeId::Barrier);
        assert!(p.upgrades.barrier);
        assert!(p.passives.barrier_ready);
    }

    #[test]
    fn test_multiplicative_effects() {
        let mut p = Player::new(&Progression::default());
        apply_upgrade(&mut p, UpgradeId::Resonance);
        assert!((p.stats.attack_interval_ms - 440.0).abs() < 1e-3);
        apply_upgrade(&mut p, UpgradeId::Shrink);
        assert!((p.upgrades.shrink - 0.9).abs() < 1e-6);
        apply_upgrade(&mut p, UpgradeId::Swift);
        assert!((p.stats.speed - 7.0).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn prop_batches_have_no_duplicates(count in 1usize..=39, luck in 0u32..6, seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let batch = generate_choices(count, luck, &mut rng);
            prop_assert_eq!(batch.len(), count);
            let unique: HashSet<_> = batch.iter().collect();
            prop_assert_eq!(unique.len(), batch.len());
        }
    }
}
