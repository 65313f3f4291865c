//! Enemies: four kinds that chase the player and shoot at it

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Collidable};
use super::events::{DamageKind, DamageTaken};
use super::particle::{Orb, OrbKind, Particle, burst, palette};
use super::player::Player;
use super::projectile::{Owner, Projectile};
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH, FRAME_SCALE, TILE_SIZE};

/// Velocity blend toward the desired heading, per tick
const STEERING: f32 = 0.1;
/// Enemy shot speed and size
const SHOT_SPEED: f32 = 8.0;
const SHOT_SIZE: f32 = TILE_SIZE / 2.5;
const SHOT_BASE_DAMAGE: f32 = 10.0;
/// Seconds between bleed ticks, and how long a fresh stack delays the next tick
const BLEED_INTERVAL: f32 = 1.0;
const BLEED_ONSET: f32 = 3.0;
const BLEED_PER_STACK: f32 = 0.5;
/// Contact damage per second from the superheat passive
const SUPERHEAT_DPS: f32 = 40.0;
/// Cold hits multiply the slow factor by this, down to the floor
const COLD_DECAY: f32 = 0.99;
const MIN_SLOW: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Pawn,
    Cannon,
    Spiker,
    Bruiser,
}

/// Base numbers for one enemy kind
#[derive(Debug, Clone, Copy)]
pub struct KindStats {
    pub health: f32,
    pub speed: f32,
    pub value: u32,
    /// First shot delay: base + U(0, spread)
    pub first_shot: (f32, f32),
    /// Delay after each shot: base + U(0, spread)
    pub reload: (f32, f32),
    pub shot_multiplier: f32,
    /// Hitbox in tiles
    pub size_tiles: (f32, f32),
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Pawn,
        EnemyKind::Cannon,
        EnemyKind::Spiker,
        EnemyKind::Bruiser,
    ];

    pub fn stats(self) -> KindStats {
        match self {
            EnemyKind::Pawn => KindStats {
                health: 30.0,
                speed: 1.6,
                value: 2,
                first_shot: (2.0, 1.5),
                reload: (2.0, 2.0),
                shot_multiplier: 1.0,
                size_tiles: (2.0, 2.5),
            },
            EnemyKind::Cannon => KindStats {
                health: 55.0,
                speed: 1.0,
                value: 3,
                first_shot: (2.5, 2.0),
                reload: (3.0, 2.0),
                shot_multiplier: 1.0,
                size_tiles: (2.0, 2.5),
            },
            EnemyKind::Spiker => KindStats {
                health: 20.0,
                speed: 2.3,
                value: 2,
                first_shot: (0.8, 0.7),
                reload: (0.8, 0.7),
                shot_multiplier: 0.7,
                size_tiles: (1.5, 2.0),
            },
            EnemyKind::Bruiser => KindStats {
                health: 120.0,
                speed: 0.65,
                value: 5,
                first_shot: (3.5, 2.0),
                reload: (3.5, 2.5),
                shot_multiplier: 1.3,
                size_tiles: (2.5, 2.2),
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Pawn => "pawn",
            EnemyKind::Cannon => "cannon",
            EnemyKind::Spiker => "spiker",
            EnemyKind::Bruiser => "bruiser",
        }
    }
}

/// What one enemy update produced
#[derive(Debug, Default)]
pub struct EnemyUpdate {
    pub damage_taken: Vec<DamageTaken>,
    pub projectiles: Vec<Projectile>,
    pub particles: Vec<Particle>,
    pub died: bool,
    /// Unscaled experience value, set on death
    pub value: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub width: f32,
    pub height: f32,
    pub max_hp: f32,
    pub hp: f32,
    pub speed: f32,
    pub value: u32,
    /// Seconds until the next shot
    pub shoot_cooldown: f32,
    /// Speed multiplier from cold hits, 1 = unslowed
    pub slow_factor: f32,
    pub bleed_stacks: u32,
    pub bleed_timer: f32,
}

impl Enemy {
    pub fn new(kind: EnemyKind, pos: Vec2, health: f32, speed: f32, value: u32, shoot_cooldown: f32) -> Self {
        let (w, h) = kind.stats().size_tiles;
        Self {
            id: 0,
            kind,
            pos,
            vel: Vec2::ZERO,
            width: TILE_SIZE * w,
            height: TILE_SIZE * h,
            max_hp: health,
            hp: health,
            speed,
            value,
            shoot_cooldown,
            slow_factor: 1.0,
            bleed_stacks: 0,
            bleed_timer: 0.0,
        }
    }

    /// Spawn just off the left or right edge, somewhere in the upper arena
    pub fn spawn(rng: &mut impl Rng, kind: EnemyKind, health_mult: f32, speed_mult: f32) -> Self {
        let stats = kind.stats();
        let x = if rng.random_bool(0.5) {
            -TILE_SIZE * 3.0
        } else {
            ARENA_WIDTH + TILE_SIZE * 3.0
        };
        let y = rng.random::<f32>() * ARENA_HEIGHT * 0.7 + TILE_SIZE * 2.0;
        let (base, spread) = stats.first_shot;
        Self::new(
            kind,
            Vec2::new(x, y),
            (stats.health * health_mult).floor().max(1.0),
            stats.speed * speed_mult,
            stats.value,
            base + rng.random::<f32>() * spread,
        )
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Apply a hit. Cold slows; bleed adds a stack and delays the next bleed tick.
    pub fn take_damage(&mut self, amount: f32, cold: bool, bleed: bool) {
        self.hp = (self.hp - amount).max(0.0);
        if cold {
            self.slow_factor = (self.slow_factor * COLD_DECAY).max(MIN_SLOW);
        }
        if bleed {
            self.bleed_stacks += 1;
            self.bleed_timer = BLEED_ONSET;
        }
    }

    /// Damage of this enemy's shots against a player of the given level
    pub fn shot_damage(&self, player_level: u32) -> f32 {
        let level_scale = 1.0 + (player_level as f32 * 30.0) / 300.0;
        SHOT_BASE_DAMAGE * level_scale * self.kind.stats().shot_multiplier
    }

    pub fn update(&mut self, dt: f32, player: &Player, rng: &mut impl Rng) -> EnemyUpdate {
        let mut out = EnemyUpdate::default();

        let to_player = player.pos - self.pos;
        let angle = to_player.y.atan2(to_player.x);
        let desired = Vec2::new(angle.cos(), angle.sin()) * self.speed * self.slow_factor;
        self.vel += (desired - self.vel) * STEERING;
        self.pos += self.vel * dt * FRAME_SCALE;

        self.shoot_cooldown -= dt;
        if self.shoot_cooldown <= 0.0 {
            out.projectiles.push(Projectile::new(
                Owner::Enemy,
                self.pos,
                angle,
                SHOT_SPEED,
                self.shot_damage(player.progress.level),
                SHOT_SIZE,
            ));
            let (base, spread) = self.kind.stats().reload;
            self.shoot_cooldown = base + rng.random::<f32>() * spread;
        }

        if self.bleed_stacks > 0 {
            self.bleed_timer -= dt;
            if self.bleed_timer <= 0.0 {
                let amount = self.bleed_stacks as f32 * BLEED_PER_STACK;
                self.take_damage(amount, false, false);
                out.damage_taken.push(DamageTaken {
                    amount,
                    kind: DamageKind::Bleed,
                });
                self.bleed_timer = BLEED_INTERVAL;
            }
        }

        if player.upgrades.superheat && self.bounds().overlaps(&player.hitbox()) {
            let amount = SUPERHEAT_DPS * dt;
            self.take_damage(amount, false, false);
            out.damage_taken.push(DamageTaken {
                amount,
                kind: DamageKind::Superheat,
            });
        }

        if !self.is_alive() {
            out.died = true;
            out.value = self.value;
            out.particles = burst(rng, self.pos, 15, palette::ORANGE);

            for _ in 0..player.upgrades.fragmentation {
                let angle = rng.random::<f32>() * TAU;
                out.projectiles.push(Projectile::new(
                    Owner::Player,
                    self.pos,
                    angle,
                    SHOT_SPEED,
                    player.stats.projectile_damage / 4.0,
                    player.stats.projectile_size / 2.0,
                ));
            }

            if rng.random::<f32>() < player.upgrades.heal_orb_chance {
                out.particles.push(Particle::Orb(Orb::new(rng, self.pos, OrbKind::Heal)));
            }
            if rng.random::<f32>() < player.upgrades.soul_orb_chance {
                out.particles.push(Particle::Orb(Orb::new(rng, self.pos, OrbKind::Soul)));
            }
        }

        out
    }
}

impl Collidable for Enemy {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Progression;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn player() -> Player {
        Player::new(&Progression::default())
    }

    #[test]
    fn test_spawn_scaling_and_position() {
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..50 {
            let e = Enemy::spawn(&mut rng, EnemyKind::Cannon, 1.25, 1.1);
            assert_eq!(e.max_hp, 68.0);
            assert!((e.speed - 1.1).abs() < 1e-5);
            assert!(e.pos.x < 0.0 || e.pos.x > ARENA_WIDTH);
            assert!(e.pos.y >= TILE_SIZE * 2.0 && e.pos.y <= ARENA_HEIGHT * 0.7 + TILE_SIZE * 2.0);
            assert!(e.shoot_cooldown >= 2.5 && e.shoot_cooldown <= 4.5);
        }
    }

    #[test]
    fn test_steers_toward_player() {
        let mut rng = Pcg32::seed_from_u64(1);
        let p = player();
        let mut e = Enemy::new(EnemyKind::Pawn, p.pos - Vec2::new(300.0, 0.0), 30.0, 1.6, 2, 100.0);
        let out = e.update(1.0 / 60.0, &p, &mut rng);
        assert!(e.vel.x > 0.0);
        // One blend step toward full speed
        assert!((e.vel.length() - 0.16).abs() < 1e-3);
        assert!(out.projectiles.is_empty());
        assert!(!out.died);
    }

    #[test]
    fn test_shoots_on_cooldown_and_rerolls() {
        let mut rng = Pcg32::seed_from_u64(2);
        let p = player();
        let mut e = Enemy::new(EnemyKind::Bruiser, Vec2::new(100.0, 100.0), 120.0, 0.65, 5, 0.0);
        let out = e.update(1.0 / 60.0, &p, &mut rng);
        assert_eq!(out.projectiles.len(), 1);
        let shot = &out.projectiles[0];
        assert_eq!(shot.owner, Owner::Enemy);
        // Level 1: 10 * 1.1 * 1.3
        assert!((shot.damage - 14.3).abs() < 1e-3);
        assert!(e.shoot_cooldown >= 3.5 && e.shoot_cooldown <= 6.0);
    }

    #[test]
    fn test_bleed_ticks_on_interval() {
        let mut rng = Pcg32::seed_from_u64(3);
        let p = player();
        let mut e = Enemy::new(EnemyKind::Pawn, Vec2::new(100.0, 100.0), 100.0, 0.0, 2, 100.0);
        e.take_damage(0.0, false, true);
        e.take_damage(0.0, false, true);
        assert_eq!(e.bleed_stacks, 2);
        assert_eq!(e.bleed_timer, 3.0);

        let out = e.update(2.9, &p, &mut rng);
        assert!(out.damage_taken.is_empty());
        let out = e.update(0.2, &p, &mut rng);
        assert_eq!(out.damage_taken.len(), 1);
        assert_eq!(out.damage_taken[0].kind, DamageKind::Bleed);
        assert_eq!(e.hp, 99.0);
        assert_eq!(e.bleed_timer, 1.0);
    }

    #[test]
    fn test_cold_slow_has_floor() {
        let mut e = Enemy::new(EnemyKind::Spiker, Vec2::ZERO, 1e9, 2.3, 2, 1.0);
        for _ in 0..1000 {
            e.take_damage(1.0, true, false);
        }
        assert_eq!(e.slow_factor, MIN_SLOW);
    }

    #[test]
    fn test_hp_never_negative() {
        let mut e = Enemy::new(EnemyKind::Pawn, Vec2::ZERO, 30.0, 1.6, 2, 1.0);
        e.take_damage(1000.0, false, false);
        assert_eq!(e.hp, 0.0);
        assert!(!e.is_alive());
    }

    #[test]
    fn test_death_report_with_fragmentation() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut p = player();
        p.upgrades.fragmentation = 6;
        let mut e = Enemy::new(EnemyKind::Pawn, Vec2::new(100.0, 100.0), 30.0, 1.6, 2, 100.0);
        e.hp = 0.0;
        let out = e.update(1.0 / 60.0, &p, &mut rng);
        assert!(out.died);
        assert_eq!(out.value, 2);
        let frags: Vec<_> = out.projectiles.iter().filter(|p| p.owner == Owner::Player).collect();
        assert_eq!(frags.len(), 6);
        assert!(frags.iter().all(|f| (f.damage - 2.5).abs() < 1e-5));
        assert!(out.particles.len() >= 15);
    }

    #[test]
    fn test_superheat_contact_damage() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut p = player();
        p.upgrades.superheat = true;
        let mut e = Enemy::new(EnemyKind::Bruiser, p.pos, 120.0, 0.0, 5, 100.0);
        let out = e.update(0.5, &p, &mut rng);
        assert!(out.damage_taken.iter().any(|d| d.kind == DamageKind::Superheat));
        assert!((e.hp - 100.0).abs() < 1e-3);
    }
}
