//! Short-lived effects: sparks, lightning strikes and collectible orbs
//!
//! All three share a decaying [`ParticleBody`]. The orchestrator dispatches on
//! the [`Particle`] variant; only lightning and orbs have gameplay effects.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Collidable};
use super::enemy::Enemy;
use crate::consts::{ARENA_HEIGHT, FRAME_SCALE, GRAVITY, TILE_SIZE};

/// Packed 0xRRGGBB colors used by the simulation's effects
pub mod palette {
    pub const ORANGE: u32 = 0xFFA500;
    pub const RED_ORANGE: u32 = 0xFF4500;
    pub const DIRT: u32 = 0x8B4513;
    pub const PURPLE: u32 = 0xA855F7;
    pub const BARRIER_BLUE: u32 = 0x6496FF;
    pub const YELLOW: u32 = 0xFFFF00;
    pub const HEAL_GREEN: u32 = 0x84CC16;
}

/// Lifetime of a lightning strike
pub const LIGHTNING_LIFE: f32 = 0.5;
/// Orbs fade after this long if uncollected
pub const ORB_LIFE: f32 = 10.0;
/// Orbs start homing inside this distance
pub const ORB_CAPTURE_RADIUS: f32 = TILE_SIZE * 10.0;
/// Per-axis speed cap for orbs
pub const ORB_MAX_SPEED: f32 = 5.0;
/// Homing pull per tick
const ORB_PULL: f32 = 0.5;

/// Position, motion and lifetime shared by every effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleBody {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: u32,
    pub life: f32,
    pub initial_life: f32,
}

impl ParticleBody {
    pub fn new(pos: Vec2, vel: Vec2, size: f32, color: u32, life: f32) -> Self {
        Self {
            pos,
            vel,
            size,
            color,
            life,
            initial_life: life,
        }
    }

    /// Move and decay
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt * FRAME_SCALE;
        self.life -= dt;
    }

    pub fn alive(&self) -> bool {
        self.life > 0.0
    }

    /// Remaining life as a 0-1 fade value
    pub fn alpha(&self) -> f32 {
        if self.initial_life <= 0.0 {
            return 0.0;
        }
        (self.life / self.initial_life).clamp(0.0, 1.0)
    }
}

/// A lightning bolt from the top of the arena down to the floor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lightning {
    pub body: ParticleBody,
    pub damage: f32,
    /// Jagged path, top to bottom
    pub points: Vec<Vec2>,
    /// Set after the single damage pulse
    pub struck: bool,
}

impl Lightning {
    pub fn new(rng: &mut impl Rng, x: f32, damage: f32) -> Self {
        let mut points = vec![Vec2::new(x, 0.0)];
        let mut last = points[0];
        while last.y < ARENA_HEIGHT {
            let next = Vec2::new(
                last.x + (rng.random::<f32>() - 0.5) * TILE_SIZE * 3.0,
                last.y + rng.random::<f32>() * TILE_SIZE * 4.0 + TILE_SIZE * 1.5,
            );
            points.push(next);
            last = next;
        }
        Self {
            body: ParticleBody::new(Vec2::new(x, 0.0), Vec2::ZERO, 0.0, palette::YELLOW, LIGHTNING_LIFE),
            damage,
            points,
            struck: false,
        }
    }

    /// Whether an enemy sits inside the strike band of any path point
    pub fn reaches(&self, enemy: &Enemy) -> bool {
        self.points.iter().any(|p| {
            (enemy.pos.x - p.x).abs() < enemy.width / 2.0 + TILE_SIZE * 1.5
                && enemy.pos.y > p.y - TILE_SIZE * 2.0
                && enemy.pos.y < p.y + enemy.height / 2.0 + TILE_SIZE * 4.0
        })
    }

    /// Decay, then deliver the strike once. Returns the indices of damaged enemies.
    pub fn update(&mut self, dt: f32, enemies: &mut [Enemy]) -> Vec<usize> {
        self.body.integrate(dt);
        if self.struck || !self.body.alive() {
            return Vec::new();
        }
        self.struck = true;

        let mut hit = Vec::new();
        for (i, enemy) in enemies.iter_mut().enumerate() {
            if enemy.is_alive() && self.reaches(enemy) {
                enemy.take_damage(self.damage, false, false);
                hit.push(i);
            }
        }
        hit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrbKind {
    /// Restores 10% of max HP
    Heal,
    /// Grants 10% of the current level threshold as experience
    Soul,
}

/// A drop that drifts down and homes in on the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Orb {
    pub body: ParticleBody,
    pub kind: OrbKind,
    pub collected: bool,
}

impl Orb {
    pub fn new(rng: &mut impl Rng, pos: Vec2, kind: OrbKind) -> Self {
        let vel = Vec2::new((rng.random::<f32>() - 0.5) * 2.0, -rng.random::<f32>() * 3.0);
        let color = match kind {
            OrbKind::Heal => palette::HEAL_GREEN,
            OrbKind::Soul => palette::PURPLE,
        };
        Self {
            body: ParticleBody::new(pos, vel, TILE_SIZE, color, ORB_LIFE),
            kind,
            collected: false,
        }
    }

    /// Fall, home toward the player, and report collection on overlap
    pub fn update(&mut self, dt: f32, player_pos: Vec2, player_bounds: &Aabb) -> Option<OrbKind> {
        if self.collected {
            return None;
        }
        self.body.vel.y += GRAVITY * 0.5 * dt * FRAME_SCALE;

        let to_player = player_pos - self.body.pos;
        if to_player.length() < ORB_CAPTURE_RADIUS {
            let angle = to_player.y.atan2(to_player.x);
            self.body.vel += Vec2::new(angle.cos(), angle.sin()) * ORB_PULL;
        }
        self.body.vel = self
            .body
            .vel
            .clamp(Vec2::splat(-ORB_MAX_SPEED), Vec2::splat(ORB_MAX_SPEED));

        self.body.integrate(dt);

        if self.bounds().overlaps(player_bounds) {
            self.collected = true;
            self.body.life = 0.0;
            return Some(self.kind);
        }
        None
    }
}

impl Collidable for Orb {
    fn bounds(&self) -> Aabb {
        Aabb::from_size(self.body.pos, self.body.size)
    }
}

/// Any short-lived effect in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Particle {
    Spark(ParticleBody),
    Lightning(Lightning),
    Orb(Orb),
}

impl Particle {
    pub fn body(&self) -> &ParticleBody {
        match self {
            Particle::Spark(body) => body,
            Particle::Lightning(l) => &l.body,
            Particle::Orb(o) => &o.body,
        }
    }

    pub fn alive(&self) -> bool {
        self.body().alive()
    }
}

/// Radial fan of sparks
pub fn burst(rng: &mut impl Rng, pos: Vec2, count: usize, color: u32) -> Vec<Particle> {
    (0..count)
        .map(|_| {
            let angle = rng.random::<f32>() * TAU;
            let speed = rng.random::<f32>() * 5.0 + 2.0;
            let life = rng.random::<f32>() * 0.5 + 0.3;
            let size = rng.random::<f32>() * 3.0 + 1.0;
            Particle::Spark(ParticleBody::new(
                pos,
                Vec2::new(angle.cos(), angle.sin()) * speed,
                size,
                color,
                life,
            ))
        })
        .collect()
}
