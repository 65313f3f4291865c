//! Orbiting companion that fires at the nearest enemy

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::projectile::{Owner, Projectile};
use crate::consts::TILE_SIZE;

pub const ORBIT_RADIUS: f32 = TILE_SIZE * 5.0;
/// Radians per second
pub const ORBIT_SPEED: f32 = 2.0;
/// Orbit center sits this far above the owner
const ORBIT_LIFT: f32 = TILE_SIZE * 2.5;
const SHOT_SPEED: f32 = 12.0;

/// Owner stats the companion's shots derive from
#[derive(Debug, Clone, Copy)]
pub struct WispArms {
    pub damage: f32,
    pub size: f32,
    pub attack_interval_ms: f32,
    pub cold: bool,
    pub bleed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wisp {
    pub pos: Vec2,
    pub orbit_angle: f32,
    /// Milliseconds until the next shot
    pub fire_cooldown_ms: f32,
}

impl Wisp {
    pub fn new(owner_pos: Vec2) -> Self {
        Self {
            pos: owner_pos - Vec2::new(0.0, 50.0),
            orbit_angle: 0.0,
            fire_cooldown_ms: 0.0,
        }
    }

    /// Advance the orbit and fire if ready and anything is alive
    pub fn update(&mut self, dt: f32, owner_pos: Vec2, arms: &WispArms, enemies: &[Enemy]) -> Option<Projectile> {
        self.orbit_angle += ORBIT_SPEED * dt;
        let center = owner_pos - Vec2::new(0.0, ORBIT_LIFT);
        self.pos = center + Vec2::new(self.orbit_angle.cos(), self.orbit_angle.sin()) * ORBIT_RADIUS;

        self.fire_cooldown_ms -= dt * 1000.0;
        if self.fire_cooldown_ms > 0.0 {
            return None;
        }
        let target = closest_enemy(self.pos, enemies)?;
        let to_target = target.pos - self.pos;
        let angle = to_target.y.atan2(to_target.x);
        self.fire_cooldown_ms = arms.attack_interval_ms * 2.0;
        Some(
            Projectile::new(Owner::Player, self.pos, angle, SHOT_SPEED, arms.damage / 2.0, arms.size / 1.5)
                .with_status(arms.cold, arms.bleed),
        )
    }
}

/// Nearest living enemy to a point
pub fn closest_enemy(pos: Vec2, enemies: &[Enemy]) -> Option<&Enemy> {
    enemies
        .iter()
        .filter(|e| e.is_alive())
        .min_by(|a, b| {
            a.pos
                .distance_squared(pos)
                .partial_cmp(&b.pos.distance_squared(pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}
