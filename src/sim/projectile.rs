//! Projectiles fired by the player, its companion, enemies and on-death effects

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Collidable};
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH, FRAME_SCALE, GRAVITY, OFFSCREEN_MARGIN};

/// Which side fired a projectile; it only collides with the other side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub owner: Owner,
    pub pos: Vec2,
    /// Fixed at creation from angle and speed
    pub vel: Vec2,
    pub size: f32,
    pub damage: f32,
    pub crit: bool,
    pub hits_left: u32,
    /// Slows enemies on hit
    pub cold: bool,
    /// Stacks bleed on hit
    pub bleed: bool,
    /// Arcs under half gravity and bursts when spent
    pub explosive: bool,
}

impl Projectile {
    pub fn new(owner: Owner, pos: Vec2, angle: f32, speed: f32, damage: f32, size: f32) -> Self {
        Self {
            id: 0,
            owner,
            pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            size,
            damage,
            crit: false,
            hits_left: 1,
            cold: false,
            bleed: false,
            explosive: false,
        }
    }

    pub fn with_hits(mut self, hits: u32) -> Self {
        self.hits_left = hits.max(1);
        self
    }

    pub fn with_crit(mut self, crit: bool) -> Self {
        self.crit = crit;
        self
    }

    pub fn with_status(mut self, cold: bool, bleed: bool) -> Self {
        self.cold = cold;
        self.bleed = bleed;
        self
    }

    pub fn explosive(mut self) -> Self {
        self.explosive = true;
        self
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt * FRAME_SCALE;
        if self.explosive {
            self.vel.y += GRAVITY * 0.5 * dt * FRAME_SCALE;
        }
    }

    /// Consume one hit
    pub fn register_hit(&mut self) {
        self.hits_left = self.hits_left.saturating_sub(1);
    }

    pub fn exhausted(&self) -> bool {
        self.hits_left == 0
    }

    /// Bottom edge at or below the ground while still inside the arena
    pub fn touches_ground(&self, ground_y: f32) -> bool {
        self.pos.y + self.size / 2.0 >= ground_y && self.pos.y < ARENA_HEIGHT
    }

    pub fn out_of_bounds(&self) -> bool {
        self.pos.x < -OFFSCREEN_MARGIN
            || self.pos.x > ARENA_WIDTH + OFFSCREEN_MARGIN
            || self.pos.y < -OFFSCREEN_MARGIN
            || self.pos.y > ARENA_HEIGHT + OFFSCREEN_MARGIN
    }
}

impl Collidable for Projectile {
    fn bounds(&self) -> Aabb {
        Aabb::from_size(self.pos, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_linear_motion() {
        let mut p = Projectile::new(Owner::Player, Vec2::new(100.0, 100.0), 0.0, 15.0, 10.0, 6.0);
        p.update(1.0 / 60.0);
        assert!((p.pos.x - 115.0).abs() < 1e-3);
        assert!((p.pos.y - 100.0).abs() < 1e-3);
        assert_eq!(p.vel, Vec2::new(15.0, 0.0));
    }

    #[test]
    fn test_explosive_arcs_downward() {
        let mut p = Projectile::new(Owner::Player, Vec2::new(100.0, 300.0), -FRAC_PI_2, 10.0, 5.0, 6.0)
            .explosive();
        let start_vy = p.vel.y;
        for _ in 0..10 {
            p.update(1.0 / 60.0);
        }
        assert!(p.vel.y > start_vy);
        assert!((p.vel.y - (start_vy + 3.0)).abs() < 1e-3);
    }

    #[test]
    fn test_hits_never_go_negative() {
        let mut p = Projectile::new(Owner::Player, Vec2::ZERO, 0.0, 1.0, 1.0, 1.0).with_hits(2);
        p.register_hit();
        assert!(!p.exhausted());
        p.register_hit();
        p.register_hit();
        assert!(p.exhausted());
        assert_eq!(p.hits_left, 0);
    }

    #[test]
    fn test_bounds_margin() {
        let mut p = Projectile::new(Owner::Enemy, Vec2::new(-20.0, 100.0), 0.0, 0.0, 1.0, 1.0);
        assert!(!p.out_of_bounds());
        p.pos.x = -30.0;
        assert!(p.out_of_bounds());
    }
}
