//! Discrete notifications the simulation emits each tick
//!
//! Events are fire-and-forget: the state collects them during a tick and the
//! host drains them (audio, HUD flashes). Nothing in the simulation waits on them.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;
use super::particle::OrbKind;
use crate::consts::TILE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player fired a primary shot
    PlayerShot,
    PlayerJumped,
    /// An enemy shot connected with the player
    PlayerHit,
    BarrierBroken,
    Revived,
    LevelUp { level: u32 },
    /// One or more player projectiles connected this tick
    EnemyHit,
    EnemyShot,
    EnemyDied { kind: EnemyKind },
    /// Explosive projectile burst
    Explosion,
    OrbCollected { kind: OrbKind },
    WaveStarted { wave: u32 },
    WaveCleared { wave: u32 },
    GameOver { score: u64 },
}

/// Source of a damage number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageKind {
    Normal,
    Crit,
    Bleed,
    Superheat,
    Lightning,
}

/// One damage application against an enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageTaken {
    pub amount: f32,
    pub kind: DamageKind,
}

/// Seconds an indicator stays visible
pub const INDICATOR_DURATION: f32 = 0.75;
/// Vertical drift (units/s, negative is up)
pub const INDICATOR_RISE_SPEED: f32 = -50.0;

/// Floating damage number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageIndicator {
    pub amount: u32,
    pub pos: Vec2,
    pub kind: DamageKind,
    pub age: f32,
}

impl DamageIndicator {
    /// Spawn above the top edge of whatever was hit, with a little horizontal scatter
    pub fn new(rng: &mut impl Rng, amount: f32, top_center: Vec2, kind: DamageKind) -> Self {
        let scatter = (rng.random::<f32>() - 0.5) * TILE_SIZE;
        Self {
            amount: amount.floor().max(1.0) as u32,
            pos: Vec2::new(top_center.x + scatter, top_center.y - TILE_SIZE),
            kind,
            age: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.pos.y += INDICATOR_RISE_SPEED * dt;
        self.age += dt;
    }

    pub fn expired(&self) -> bool {
        self.age >= INDICATOR_DURATION
    }

    /// Fade value for rendering
    pub fn alpha(&self) -> f32 {
        (1.0 - self.age / INDICATOR_DURATION).clamp(0.0, 1.0)
    }
}
