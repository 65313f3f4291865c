//! Game state owned by the simulation
//!
//! Everything a run needs to continue deterministically lives here: the RNG,
//! every entity collection, the clock, the wave director and the player.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::enemy::Enemy;
use super::events::{DamageIndicator, GameEvent};
use super::particle::Particle;
use super::player::Player;
use super::projectile::Projectile;
use super::terrain::Terrain;
use super::upgrades::{self, UpgradeId};
use super::wave::{WaveDirector, WaveState};
use crate::persistence::Progression;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Frozen until one of `pending_choices` is picked
    ChoosingUpgrade,
    /// Paused by the player
    Paused,
    /// Run ended
    GameOver,
}

/// Counters for the HUD and end-of-run summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub score: u64,
    pub kills: u32,
    pub wave: u32,
    pub wave_state: WaveState,
    pub enemies_to_spawn: u32,
    pub enemies_defeated: u32,
    pub enemies_active: usize,
    pub intermission_remaining: f32,
    /// Simulated seconds since the run began
    pub elapsed: f32,
    pub level: u32,
    pub exp: f32,
    pub exp_to_next: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Permanent bonuses the run started with
    pub progression: Progression,
    pub phase: GamePhase,
    pub clock: Clock,
    pub terrain: Terrain,
    pub player: Player,
    /// Sorted by id for determinism
    pub enemies: Vec<Enemy>,
    /// Sorted by id for determinism
    pub projectiles: Vec<Projectile>,
    pub particles: Vec<Particle>,
    pub indicators: Vec<DamageIndicator>,
    pub director: WaveDirector,
    pub score: u64,
    pub kills: u32,
    /// Upgrade ids offered at the last level-up
    pub pending_choices: Vec<UpgradeId>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulated seconds, unaffected by clock skips
    pub elapsed: f32,
    /// Set once when the run ends
    pub final_score: Option<u64>,
    /// Emitted during the last tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// New run. The first wave starts on the first tick.
    pub fn new(seed: u64, progression: &Progression) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            progression: *progression,
            phase: GamePhase::Playing,
            clock: Clock::run_start(),
            terrain: Terrain::generate(),
            player: Player::new(progression),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            indicators: Vec::new(),
            director: WaveDirector::new(),
            score: 0,
            kills: 0,
            pending_choices: Vec::new(),
            time_ticks: 0,
            elapsed: 0.0,
            final_score: None,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Start over with fresh progression, keeping the seed and the player's identity
    pub fn reset(&mut self, progression: &Progression) {
        log::info!("Resetting run (seed {})", self.seed);
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.progression = *progression;
        self.phase = GamePhase::Playing;
        self.clock = Clock::run_start();
        self.player.reset(progression);
        self.enemies.clear();
        self.projectiles.clear();
        self.particles.clear();
        self.indicators.clear();
        self.director = WaveDirector::new();
        self.score = 0;
        self.kills = 0;
        self.pending_choices.clear();
        self.time_ticks = 0;
        self.elapsed = 0.0;
        self.final_score = None;
        self.events.clear();
        self.next_id = 1;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add_enemy(&mut self, mut enemy: Enemy) {
        enemy.id = self.next_entity_id();
        self.enemies.push(enemy);
    }

    pub fn add_projectile(&mut self, mut projectile: Projectile) {
        projectile.id = self.next_entity_id();
        self.projectiles.push(projectile);
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.projectiles.sort_by_key(|p| p.id);
    }

    pub fn upgrade_choices(&self) -> &[UpgradeId] {
        &self.pending_choices
    }

    /// Apply the offered upgrade at `index` and resume play
    pub fn choose_upgrade(&mut self, index: usize) -> bool {
        if self.phase != GamePhase::ChoosingUpgrade {
            log::warn!("Upgrade choice {} ignored outside of level-up", index);
            return false;
        }
        let Some(&id) = self.pending_choices.get(index) else {
            log::warn!("Upgrade choice {} out of range ({} offered)", index, self.pending_choices.len());
            return false;
        };
        upgrades::apply_upgrade(&mut self.player, id);
        self.pending_choices.clear();
        self.phase = GamePhase::Playing;
        log::info!("Picked upgrade {} at level {}", id.name(), self.player.progress.level);
        true
    }

    /// Same as [`Self::choose_upgrade`], by id. The id must be one of the offered choices.
    pub fn choose_upgrade_id(&mut self, id: UpgradeId) -> bool {
        match self.pending_choices.iter().position(|&c| c == id) {
            Some(index) => self.choose_upgrade(index),
            None => {
                log::warn!("Upgrade {:?} was not offered", id);
                false
            }
        }
    }

    /// Apply an upgrade outside the level-up flow (e.g. Immortal)
    pub fn grant_upgrade(&mut self, id: UpgradeId) {
        upgrades::apply_upgrade(&mut self.player, id);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn stats(&self) -> RunStats {
        RunStats {
            score: self.score,
            kills: self.kills,
            wave: self.director.wave,
            wave_state: self.director.state,
            enemies_to_spawn: self.director.to_spawn,
            enemies_defeated: self.director.defeated,
            enemies_active: self.enemies.len(),
            intermission_remaining: self.director.intermission_remaining(),
            elapsed: self.elapsed,
            level: self.player.progress.level,
            exp: self.player.progress.exp,
            exp_to_next: self.player.progress.exp_to_next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::EnemyKind;
    use glam::Vec2;

    #[test]
    fn test_ids_are_unique_and_sorted() {
        let mut state = GameState::new(1, &Progression::default());
        for x in [300.0, 100.0, 200.0] {
            state.add_enemy(Enemy::new(EnemyKind::Pawn, Vec2::new(x, 100.0), 30.0, 1.0, 2, 5.0));
        }
        state.enemies.reverse();
        state.normalize_order();
        let ids: Vec<u32> = state.enemies.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_choose_upgrade_requires_level_up() {
        let mut state = GameState::new(2, &Progression::default());
        assert!(!state.choose_upgrade(0));

        state.phase = GamePhase::ChoosingUpgrade;
        state.pending_choices = vec![UpgradeId::Catalyst, UpgradeId::Gush];
        assert!(!state.choose_upgrade(5));
        assert_eq!(state.phase, GamePhase::ChoosingUpgrade);

        assert!(state.choose_upgrade_id(UpgradeId::Gush));
        assert_eq!(state.player.stats.max_jumps, 2);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.upgrade_choices().is_empty());
    }

    #[test]
    fn test_unoffered_id_rejected() {
        let mut state = GameState::new(3, &Progression::default());
        state.phase = GamePhase::ChoosingUpgrade;
        state.pending_choices = vec![UpgradeId::Catalyst];
        assert!(!state.choose_upgrade_id(UpgradeId::Wisp));
        assert!(!state.player.upgrades.willowisp);
    }

    #[test]
    fn test_grant_immortal() {
        let mut state = GameState::new(4, &Progression::default());
        state.grant_upgrade(UpgradeId::Immortal);
        assert_eq!(state.player.upgrades.revives, 1);
    }

    #[test]
    fn test_reset_applies_new_progression() {
        let mut state = GameState::new(5, &Progression::default());
        state.score = 900;
        state.player.progress.level = 7;
        state.add_enemy(Enemy::new(EnemyKind::Pawn, Vec2::ZERO, 30.0, 1.0, 2, 5.0));

        let prog = Progression {
            vitality: 4,
            ..Default::default()
        };
        state.reset(&prog);
        assert_eq!(state.score, 0);
        assert!(state.enemies.is_empty());
        assert_eq!(state.player.progress.level, 1);
        assert_eq!(state.player.stats.max_hp, 120.0);
        assert_eq!(state.director.state, WaveState::Inactive);
        assert_eq!(state.next_entity_id(), 1);
    }
}
