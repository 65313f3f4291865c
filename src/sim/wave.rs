//! Wave director: per-wave configuration, batch spawning and clear detection

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyKind};

/// Seconds between spawn batches
pub const SPAWN_BATCH_DELAY: f32 = 0.75;
/// Rest between a cleared wave and the next
pub const INTERMISSION_DURATION: f32 = 5.0;

const BASE_ENEMY_COUNT: u32 = 5;
const ENEMIES_PER_WAVE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KindWeight {
    pub kind: EnemyKind,
    pub weight: f32,
}

const fn w(kind: EnemyKind, weight: f32) -> KindWeight {
    KindWeight { kind, weight }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    pub enemy_count: u32,
    pub enemy_types: Vec<KindWeight>,
    pub health_multiplier: f32,
    pub speed_multiplier: f32,
    pub value_multiplier: f32,
    pub spawn_batch_size: u32,
}

impl WaveConfig {
    /// Derive everything from the wave number (1-based)
    pub fn for_wave(wave: u32) -> Self {
        let step = wave.saturating_sub(1) as f32;
        let enemy_types = match wave {
            0..=1 => vec![w(EnemyKind::Pawn, 1.0)],
            2..=3 => vec![w(EnemyKind::Pawn, 0.6), w(EnemyKind::Cannon, 0.4)],
            4..=5 => vec![
                w(EnemyKind::Pawn, 0.4),
                w(EnemyKind::Cannon, 0.3),
                w(EnemyKind::Spiker, 0.3),
            ],
            _ => vec![
                w(EnemyKind::Pawn, 0.3),
                w(EnemyKind::Cannon, 0.25),
                w(EnemyKind::Spiker, 0.25),
                w(EnemyKind::Bruiser, 0.2),
            ],
        };
        Self {
            enemy_count: BASE_ENEMY_COUNT + wave.saturating_sub(1) * ENEMIES_PER_WAVE,
            enemy_types,
            health_multiplier: 1.0 + step * 0.1,
            speed_multiplier: 1.0 + step * 0.05,
            value_multiplier: 1.0 + step * 0.15,
            spawn_batch_size: (wave / 2).clamp(1, 3),
        }
    }

    /// Weighted pick for a roll in 0..1
    pub fn pick_kind(&self, roll: f32) -> EnemyKind {
        let mut cumulative = 0.0;
        for option in &self.enemy_types {
            cumulative += option.weight;
            if roll <= cumulative {
                return option.kind;
            }
        }
        self.enemy_types.first().map_or(EnemyKind::Pawn, |o| o.kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveState {
    Inactive,
    Spawning,
    WaitingForClear,
    Intermission,
}

/// What one director step produced
#[derive(Debug, Default)]
pub struct DirectorUpdate {
    pub spawned: Vec<Enemy>,
    /// Set when a new wave began this step
    pub wave_started: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveDirector {
    pub wave: u32,
    pub state: WaveState,
    pub config: WaveConfig,
    pub to_spawn: u32,
    pub spawned: u32,
    pub defeated: u32,
    batch_timer: f32,
    intermission_timer: f32,
}

impl Default for WaveDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveDirector {
    pub fn new() -> Self {
        Self {
            wave: 0,
            state: WaveState::Inactive,
            config: WaveConfig::for_wave(1),
            to_spawn: 0,
            spawned: 0,
            defeated: 0,
            batch_timer: 0.0,
            intermission_timer: 0.0,
        }
    }

    /// Advance the wave counter and begin spawning. Returns the new wave number.
    pub fn start_next_wave(&mut self) -> u32 {
        self.wave += 1;
        self.config = WaveConfig::for_wave(self.wave);
        self.to_spawn = self.config.enemy_count;
        self.spawned = 0;
        self.defeated = 0;
        self.state = WaveState::Spawning;
        self.batch_timer = SPAWN_BATCH_DELAY;
        self.intermission_timer = 0.0;
        log::info!(
            "Wave {} started: {} enemies, batches of {}",
            self.wave,
            self.to_spawn,
            self.config.spawn_batch_size
        );
        self.wave
    }

    pub fn advance(&mut self, dt: f32, rng: &mut impl Rng) -> DirectorUpdate {
        let mut out = DirectorUpdate::default();
        match self.state {
            WaveState::Spawning => {
                self.batch_timer -= dt;
                if self.batch_timer <= 0.0 && self.spawned < self.to_spawn {
                    let batch = self.config.spawn_batch_size.min(self.to_spawn - self.spawned);
                    for _ in 0..batch {
                        let kind = self.config.pick_kind(rng.random::<f32>());
                        out.spawned.push(Enemy::spawn(
                            rng,
                            kind,
                            self.config.health_multiplier,
                            self.config.speed_multiplier,
                        ));
                    }
                    self.spawned += batch;
                    self.batch_timer = SPAWN_BATCH_DELAY;
                    log::debug!("Spawned batch of {} ({}/{})", batch, self.spawned, self.to_spawn);
                }
                if self.spawned >= self.to_spawn {
                    self.state = WaveState::WaitingForClear;
                }
            }
            WaveState::Intermission => {
                self.intermission_timer -= dt;
                if self.intermission_timer <= 0.0 {
                    out.wave_started = Some(self.start_next_wave());
                }
            }
            WaveState::Inactive | WaveState::WaitingForClear => {}
        }
        out
    }

    /// Count a death toward this wave's quota
    pub fn record_defeat(&mut self) {
        self.defeated = (self.defeated + 1).min(self.to_spawn);
    }

    /// Enter intermission if the quota is spawned, defeated and nothing is
    /// left alive. Returns true on the transition.
    pub fn check_clear(&mut self, active_enemies: usize) -> bool {
        let cleared = self.state == WaveState::WaitingForClear
            && self.spawned >= self.to_spawn
            && self.defeated >= self.to_spawn
            && active_enemies == 0;
        if cleared {
            self.state = WaveState::Intermission;
            self.intermission_timer = INTERMISSION_DURATION;
            log::info!("Wave {} cleared", self.wave);
        }
        cleared
    }

    /// Seconds left in the current intermission, 0 otherwise
    pub fn intermission_remaining(&self) -> f32 {
        if self.state == WaveState::Intermission {
            self.intermission_timer.max(0.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_first_wave_config() {
        let cfg = WaveConfig::for_wave(1);
        assert_eq!(cfg.enemy_count, 5);
        assert_eq!(cfg.spawn_batch_size, 1);
        assert_eq!(cfg.enemy_types, vec![KindWeight { kind: EnemyKind::Pawn, weight: 1.0 }]);
        assert_eq!(cfg.health_multiplier, 1.0);
        assert_eq!(cfg.value_multiplier, 1.0);
    }

    #[test]
    fn test_config_growth() {
        let cfg = WaveConfig::for_wave(5);
        assert_eq!(cfg.enemy_count, 13);
        assert_eq!(cfg.spawn_batch_size, 2);
        assert!((cfg.health_multiplier - 1.4).abs() < 1e-6);
        assert!((cfg.speed_multiplier - 1.2).abs() < 1e-6);
        assert!((cfg.value_multiplier - 1.6).abs() < 1e-6);
        assert_eq!(cfg.enemy_types.len(), 3);

        assert_eq!(WaveConfig::for_wave(2).enemy_types.len(), 2);
        assert_eq!(WaveConfig::for_wave(6).enemy_types.len(), 4);
        assert_eq!(WaveConfig::for_wave(40).spawn_batch_size, 3);
    }

    #[test]
    fn test_pick_kind_cumulative() {
        let cfg = WaveConfig::for_wave(6);
        assert_eq!(cfg.pick_kind(0.0), EnemyKind::Pawn);
        assert_eq!(cfg.pick_kind(0.3), EnemyKind::Pawn);
        assert_eq!(cfg.pick_kind(0.5), EnemyKind::Cannon);
        assert_eq!(cfg.pick_kind(0.7), EnemyKind::Spiker);
        assert_eq!(cfg.pick_kind(0.99), EnemyKind::Bruiser);
    }

    #[test]
    fn test_spawns_in_timed_batches() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut d = WaveDirector::new();
        assert_eq!(d.start_next_wave(), 1);

        let out = d.advance(0.5, &mut rng);
        assert!(out.spawned.is_empty());
        let out = d.advance(0.3, &mut rng);
        assert_eq!(out.spawned.len(), 1);
        assert_eq!(out.spawned[0].kind, EnemyKind::Pawn);

        let mut total = 1;
        for _ in 0..20 {
            total += d.advance(0.75, &mut rng).spawned.len();
        }
        assert_eq!(total, 5);
        assert_eq!(d.spawned, 5);
        assert_eq!(d.state, WaveState::WaitingForClear);
    }

    #[test]
    fn test_last_batch_is_trimmed() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut d = WaveDirector::new();
        d.wave = 5;
        d.start_next_wave();
        // Wave 6: 15 enemies in batches of 3
        let mut total = 0;
        while d.state == WaveState::Spawning {
            total += d.advance(0.75, &mut rng).spawned.len();
        }
        assert_eq!(total, 15);
        assert_eq!(d.spawned, d.to_spawn);
    }

    #[test]
    fn test_no_clear_with_stragglers() {
        let mut d = WaveDirector::new();
        d.start_next_wave();
        d.state = WaveState::WaitingForClear;
        d.spawned = d.to_spawn;
        for _ in 0..d.to_spawn {
            d.record_defeat();
        }
        assert!(!d.check_clear(1));
        assert_eq!(d.state, WaveState::WaitingForClear);
        assert!(d.check_clear(0));
        assert_eq!(d.state, WaveState::Intermission);
        assert_eq!(d.intermission_remaining(), INTERMISSION_DURATION);
    }

    #[test]
    fn test_no_clear_before_quota_defeated() {
        let mut d = WaveDirector::new();
        d.start_next_wave();
        d.state = WaveState::WaitingForClear;
        d.spawned = d.to_spawn;
        d.record_defeat();
        assert!(!d.check_clear(0));
    }

    #[test]
    fn test_defeats_never_exceed_quota() {
        let mut d = WaveDirector::new();
        d.start_next_wave();
        for _ in 0..20 {
            d.record_defeat();
        }
        assert_eq!(d.defeated, d.to_spawn);
    }

    #[test]
    fn test_intermission_starts_next_wave() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut d = WaveDirector::new();
        d.start_next_wave();
        d.state = WaveState::WaitingForClear;
        d.spawned = d.to_spawn;
        d.defeated = d.to_spawn;
        assert!(d.check_clear(0));

        assert!(d.advance(4.9, &mut rng).wave_started.is_none());
        let out = d.advance(0.2, &mut rng);
        assert_eq!(out.wave_started, Some(2));
        assert_eq!(d.state, WaveState::Spawning);
        assert_eq!(d.to_spawn, 7);
        assert_eq!(d.defeated, 0);
    }

    proptest! {
        #[test]
        fn prop_never_intermission_with_active(active in 1usize..50, defeated in 0u32..20, wave in 1u32..10) {
            let mut d = WaveDirector::new();
            d.wave = wave - 1;
            d.start_next_wave();
            d.state = WaveState::WaitingForClear;
            d.spawned = d.to_spawn;
            d.defeated = defeated.min(d.to_spawn);
            prop_assert!(!d.check_clear(active));
            prop_assert_ne!(d.state, WaveState::Intermission);
        }
    }
}
