//! The player character: movement, firing, passives and damage intake
//!
//! The player owns its stat block, leveling progress and the per-run upgrade
//! state. Timers that tick every frame live in [`PassiveTimers`]; the update
//! returns everything it spawned in a [`PlayerUpdate`] rather than pushing into
//! shared collections.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Collidable};
use super::enemy::Enemy;
use super::particle::{Lightning, Particle, burst, palette};
use super::projectile::{Owner, Projectile};
use super::terrain::Terrain;
use super::tick::TickInput;
use super::wisp::{Wisp, WispArms};
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH, FRAME_SCALE, GRAVITY, TILE_SIZE};
use crate::persistence::{PermanentUpgrade, Progression};

pub const PLAYER_WIDTH: f32 = TILE_SIZE * 2.0;
pub const PLAYER_HEIGHT: f32 = TILE_SIZE * 3.0;
/// Primary shot speed
const SHOT_SPEED: f32 = 15.0;
/// Base invincibility window after a hit (seconds)
const INVINCIBILITY_DURATION: f32 = 0.5;
const REVIVE_INVINCIBILITY: f32 = 3.0;
const BARRIER_RECHARGE: f32 = 15.0;
/// Attack interval floor after permanent upgrades (ms)
const MIN_ATTACK_INTERVAL: f32 = 50.0;
/// Distance walked per friction volley
const FRICTION_STRIDE: f32 = 100.0;
const FRICTION_SHOT_SPEED: f32 = 10.0;
const THUNDERBOLT_COOLDOWN: f32 = 5.0;
/// Seconds standing still to reach full focus
const FOCUS_RAMP: f32 = 2.0;
/// Landing tolerance for a grounded jump
const JUMP_GROUND_SLACK: f32 = 5.0;

/// Core numbers, after permanent and in-run upgrades
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub speed: f32,
    pub jump_power: f32,
    pub max_hp: f32,
    pub attack_interval_ms: f32,
    pub projectile_damage: f32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    /// Fraction of incoming damage mitigated
    pub defense: f32,
    /// Fraction of dealt damage returned as healing
    pub lifesteal: f32,
    pub max_jumps: u32,
    pub projectile_size: f32,
    pub projectile_hits: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            speed: 5.0,
            jump_power: 12.0,
            max_hp: 100.0,
            attack_interval_ms: 500.0,
            projectile_damage: 10.0,
            crit_chance: 0.05,
            crit_multiplier: 1.5,
            defense: 0.0,
            lifesteal: 0.0,
            max_jumps: 1,
            projectile_size: TILE_SIZE / 2.0,
            projectile_hits: 1,
        }
    }
}

impl Stats {
    /// Base stats with permanent bonuses folded in
    pub fn from_progression(progression: &Progression) -> Self {
        let mut stats = Self::default();
        stats.max_hp += progression.bonus(PermanentUpgrade::Vitality);
        stats.projectile_damage += progression.bonus(PermanentUpgrade::Damage);
        stats.crit_chance += progression.bonus(PermanentUpgrade::CritChance);
        stats.speed += progression.bonus(PermanentUpgrade::MoveSpeed);
        stats.attack_interval_ms = (stats.attack_interval_ms
            - progression.bonus(PermanentUpgrade::AttackSpeed))
        .max(MIN_ATTACK_INTERVAL);
        stats
    }
}

/// Level and experience
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub level: u32,
    pub exp: f32,
    pub exp_to_next: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            level: 1,
            exp: 0.0,
            exp_to_next: 10,
        }
    }
}

impl Progress {
    /// Threshold for the level after `level`, grown from the current one
    pub fn next_threshold(threshold: u32, level: u32) -> u32 {
        (threshold as f32 * 1.5 + level as f32 * 5.0).floor() as u32
    }

    /// Consume one threshold's worth of experience if available
    pub fn try_level_up(&mut self) -> bool {
        if self.exp < self.exp_to_next as f32 {
            return false;
        }
        self.level += 1;
        self.exp -= self.exp_to_next as f32;
        self.exp_to_next = Self::next_threshold(self.exp_to_next, self.level);
        true
    }
}

/// Flags and magnitudes unlocked by in-run upgrades
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeState {
    pub revives: u32,
    pub level_up_choices: u32,
    /// Multiplier on common-tier effects picked from now on
    pub common_effectiveness: f32,
    pub rage: bool,
    pub bleed: bool,
    pub superheat: bool,
    pub cold: bool,
    pub regeneration: bool,
    pub focus: bool,
    pub barrier: bool,
    pub willowisp: bool,
    /// Hitbox scale
    pub shrink: f32,
    /// Multiplier on post-hit invincibility
    pub camouflage: f32,
    pub soul_orb_chance: f32,
    pub heal_orb_chance: f32,
    /// Projectiles released on each enemy death
    pub fragmentation: u32,
    /// Explosive shots per friction volley
    pub friction: u32,
    /// Lightning strikes per thunderbolt cycle
    pub thunderbolt: u32,
    pub luck: u32,
}

impl UpgradeState {
    pub fn new(luck: u32) -> Self {
        Self {
            revives: 0,
            level_up_choices: 3,
            common_effectiveness: 1.0,
            rage: false,
            bleed: false,
            superheat: false,
            cold: false,
            regeneration: false,
            focus: false,
            barrier: false,
            willowisp: false,
            shrink: 1.0,
            camouflage: 1.0,
            soul_orb_chance: 0.0,
            heal_orb_chance: 0.0,
            fragmentation: 0,
            friction: 0,
            thunderbolt: 0,
            luck,
        }
    }
}

/// Running counters behind the passive upgrades
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassiveTimers {
    pub barrier_ready: bool,
    pub barrier_cooldown: f32,
    pub thunderbolt_cooldown: f32,
    pub focus_timer: f32,
    /// 0..=1, shortens the attack interval by up to half
    pub focus_bonus: f32,
}

/// What one player update produced
#[derive(Debug, Default)]
pub struct PlayerUpdate {
    pub projectiles: Vec<Projectile>,
    pub particles: Vec<Particle>,
    pub leveled_up: bool,
    pub fired: bool,
    pub jumped: bool,
}

/// Result of [`Player::take_damage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invincible; nothing happened
    Ignored,
    /// Shield absorbed the hit
    BarrierBroken,
    Hurt,
    /// Lethal hit consumed a revive charge
    Revived,
    Dead,
}

#[derive(Debug)]
pub struct DamageResult {
    pub outcome: DamageOutcome,
    pub particles: Vec<Particle>,
}

impl DamageResult {
    pub fn is_dead(&self) -> bool {
        self.outcome == DamageOutcome::Dead
    }

    pub fn used_revive(&self) -> bool {
        self.outcome == DamageOutcome::Revived
    }

    pub fn barrier_broken(&self) -> bool {
        self.outcome == DamageOutcome::BarrierBroken
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub width: f32,
    pub height: f32,
    pub stats: Stats,
    pub hp: f32,
    pub jumps_left: u32,
    pub progress: Progress,
    /// Seconds of remaining invincibility
    pub invincibility: f32,
    /// Milliseconds until the next primary shot
    pub fire_cooldown_ms: f32,
    /// Distance walked since the last friction volley
    pub distance_walked: f32,
    pub upgrades: UpgradeState,
    pub passives: PassiveTimers,
    pub companion: Option<Wisp>,
}

impl Player {
    pub fn new(progression: &Progression) -> Self {
        let stats = Stats::from_progression(progression);
        Self {
            pos: Self::spawn_point(),
            vel: Vec2::ZERO,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            hp: stats.max_hp,
            jumps_left: stats.max_jumps,
            stats,
            progress: Progress::default(),
            invincibility: 0.0,
            fire_cooldown_ms: 0.0,
            distance_walked: 0.0,
            upgrades: UpgradeState::new(progression.level(PermanentUpgrade::Luck)),
            passives: PassiveTimers::default(),
            companion: None,
        }
    }

    fn spawn_point() -> Vec2 {
        Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT - PLAYER_HEIGHT / 2.0 - TILE_SIZE * 2.0)
    }

    /// Reinitialize every derived value for a new run, in place
    pub fn reset(&mut self, progression: &Progression) {
        *self = Self::new(progression);
    }

    /// Hitbox after the shrink upgrade
    pub fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, self.width, self.height).scaled(self.upgrades.shrink)
    }

    fn half_height(&self) -> f32 {
        self.height / 2.0 * self.upgrades.shrink
    }

    fn half_width(&self) -> f32 {
        self.width / 2.0 * self.upgrades.shrink
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility > 0.0
    }

    /// Keep hp and jumps inside their caps
    pub fn clamp_vitals(&mut self) {
        self.hp = self.hp.clamp(0.0, self.stats.max_hp);
        self.jumps_left = self.jumps_left.min(self.stats.max_jumps);
    }

    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.stats.max_hp);
    }

    pub fn gain_exp(&mut self, amount: f32) {
        self.progress.exp += amount;
    }

    /// Damage multiplier from rage: up to +50% as hp falls below half
    pub fn rage_multiplier(&self) -> f32 {
        let half = self.stats.max_hp / 2.0;
        if self.upgrades.rage && self.hp < half && half > 0.0 {
            1.0 + (1.0 - self.hp / half) * 0.5
        } else {
            1.0
        }
    }

    /// Attack interval after focus
    pub fn effective_attack_interval(&self) -> f32 {
        self.stats.attack_interval_ms * (1.0 - self.passives.focus_bonus * 0.5)
    }

    fn wisp_arms(&self) -> WispArms {
        WispArms {
            damage: self.stats.projectile_damage,
            size: self.stats.projectile_size,
            attack_interval_ms: self.stats.attack_interval_ms,
            cold: self.upgrades.cold,
            bleed: self.upgrades.bleed,
        }
    }

    /// Start a jump if a charge is available and the player is grounded, or
    /// mid-air with multi-jump and not already rising fast
    pub fn attempt_jump(&mut self, terrain: &Terrain) -> bool {
        if self.jumps_left == 0 || (self.vel.y < 0.0 && self.jumps_left != self.stats.max_jumps) {
            return false;
        }
        let ground = terrain.ground_at(self.pos.x);
        let grounded = self.pos.y + self.half_height() >= ground - JUMP_GROUND_SLACK;
        let air_jump = self.stats.max_jumps > 1 && self.vel.y > -self.stats.jump_power * 0.5;
        if grounded || air_jump {
            self.vel.y = -self.stats.jump_power;
            self.jumps_left -= 1;
            return true;
        }
        false
    }

    pub fn update(
        &mut self,
        dt: f32,
        input: &TickInput,
        terrain: &Terrain,
        enemies: &[Enemy],
        rng: &mut impl Rng,
    ) -> PlayerUpdate {
        let mut out = PlayerUpdate::default();

        if input.jump {
            out.jumped = self.attempt_jump(terrain);
        }

        let mut moved = false;
        if input.left && self.pos.x > self.half_width() {
            self.vel.x = -self.stats.speed;
            if !input.right {
                self.distance_walked += self.stats.speed * dt;
                moved = true;
            }
        } else if input.right && self.pos.x < ARENA_WIDTH - self.half_width() {
            self.vel.x = self.stats.speed;
            if !input.left {
                self.distance_walked += self.stats.speed * dt;
                moved = true;
            }
        } else {
            self.vel.x = 0.0;
        }

        if self.upgrades.focus {
            if moved {
                self.passives.focus_timer = 0.0;
                self.passives.focus_bonus = 0.0;
            } else {
                self.passives.focus_timer += dt;
                self.passives.focus_bonus = (self.passives.focus_timer / FOCUS_RAMP).min(1.0);
            }
        }

        self.pos.x += self.vel.x * dt * FRAME_SCALE;
        self.vel.y += GRAVITY * dt * FRAME_SCALE;
        self.pos.y += self.vel.y * dt * FRAME_SCALE;

        let ground = terrain.ground_at(self.pos.x);
        if self.pos.y + self.half_height() > ground {
            self.pos.y = ground - self.half_height();
            self.vel.y = 0.0;
            self.jumps_left = self.stats.max_jumps;
        }
        self.pos.x = self.pos.x.clamp(0.0, ARENA_WIDTH - 1.0);

        self.invincibility = (self.invincibility - dt).max(0.0);
        self.fire_cooldown_ms = (self.fire_cooldown_ms - dt * 1000.0).max(0.0);

        if input.fire && self.fire_cooldown_ms <= 0.0 {
            out.projectiles.push(self.fire(input.pointer, rng));
            out.fired = true;
            self.fire_cooldown_ms = self.effective_attack_interval();
        }

        self.advance_passives(dt, enemies, rng, &mut out);

        if self.progress.try_level_up() {
            self.heal(self.stats.max_hp * 0.25);
            out.leveled_up = true;
        }

        out
    }

    /// Build one primary shot aimed at `target`
    pub fn fire(&self, target: Vec2, rng: &mut impl Rng) -> Projectile {
        let aim = target - self.pos;
        let angle = aim.y.atan2(aim.x);
        let mut damage = self.stats.projectile_damage * self.rage_multiplier();
        let crit = rng.random::<f32>() < self.stats.crit_chance;
        if crit {
            damage *= self.stats.crit_multiplier;
        }
        Projectile::new(
            Owner::Player,
            self.pos,
            angle,
            SHOT_SPEED,
            damage,
            self.stats.projectile_size,
        )
        .with_crit(crit)
        .with_hits(self.stats.projectile_hits)
        .with_status(self.upgrades.cold, self.upgrades.bleed)
    }

    fn advance_passives(&mut self, dt: f32, enemies: &[Enemy], rng: &mut impl Rng, out: &mut PlayerUpdate) {
        if self.upgrades.friction > 0 && self.distance_walked >= FRICTION_STRIDE {
            for _ in 0..self.upgrades.friction {
                let angle = -FRAC_PI_2 + (rng.random::<f32>() - 0.5) * 0.5;
                out.projectiles.push(
                    Projectile::new(
                        Owner::Player,
                        self.pos,
                        angle,
                        FRICTION_SHOT_SPEED,
                        self.stats.projectile_damage / 2.0,
                        self.stats.projectile_size,
                    )
                    .explosive(),
                );
            }
            self.distance_walked = 0.0;
        }

        if self.upgrades.thunderbolt > 0 {
            self.passives.thunderbolt_cooldown -= dt;
            if self.passives.thunderbolt_cooldown <= 0.0 {
                let living: Vec<&Enemy> = enemies.iter().filter(|e| e.is_alive()).collect();
                for _ in 0..self.upgrades.thunderbolt {
                    let x = if living.is_empty() {
                        rng.random::<f32>() * ARENA_WIDTH
                    } else {
                        living[rng.random_range(0..living.len())].pos.x
                    };
                    out.particles.push(Particle::Lightning(Lightning::new(
                        rng,
                        x,
                        self.stats.projectile_damage * 2.0,
                    )));
                }
                self.passives.thunderbolt_cooldown = THUNDERBOLT_COOLDOWN;
            }
        }

        if self.upgrades.willowisp && self.companion.is_none() {
            self.companion = Some(Wisp::new(self.pos));
        }
        let arms = self.wisp_arms();
        let owner_pos = self.pos;
        if let Some(wisp) = self.companion.as_mut() {
            if let Some(shot) = wisp.update(dt, owner_pos, &arms, enemies) {
                out.projectiles.push(shot);
            }
        }

        if self.upgrades.barrier && !self.passives.barrier_ready {
            self.passives.barrier_cooldown -= dt;
            if self.passives.barrier_cooldown <= 0.0 {
                self.passives.barrier_ready = true;
            }
        }

        if self.upgrades.regeneration {
            let living = enemies.iter().filter(|e| e.is_alive()).count();
            if living > 0 {
                self.heal(self.stats.max_hp * 0.001 * living as f32 * dt);
            }
        }
    }

    pub fn take_damage(&mut self, amount: f32, rng: &mut impl Rng) -> DamageResult {
        if self.is_invincible() {
            return DamageResult {
                outcome: DamageOutcome::Ignored,
                particles: Vec::new(),
            };
        }

        if self.upgrades.barrier && self.passives.barrier_ready {
            self.passives.barrier_ready = false;
            self.passives.barrier_cooldown = BARRIER_RECHARGE;
            self.invincibility = INVINCIBILITY_DURATION * self.upgrades.camouflage;
            return DamageResult {
                outcome: DamageOutcome::BarrierBroken,
                particles: burst(rng, self.pos, 20, palette::BARRIER_BLUE),
            };
        }

        let dealt = (amount * (1.0 - self.stats.defense)).max(1.0);
        self.hp -= dealt;
        self.invincibility = INVINCIBILITY_DURATION * self.upgrades.camouflage;

        if self.hp > 0.0 {
            return DamageResult {
                outcome: DamageOutcome::Hurt,
                particles: Vec::new(),
            };
        }

        if self.upgrades.revives > 0 {
            self.upgrades.revives -= 1;
            self.hp = self.stats.max_hp / 2.0;
            self.invincibility = REVIVE_INVINCIBILITY;
            log::info!("Revive used, {} left", self.upgrades.revives);
            DamageResult {
                outcome: DamageOutcome::Revived,
                particles: burst(rng, self.pos, 100, palette::YELLOW),
            }
        } else {
            self.hp = 0.0;
            DamageResult {
                outcome: DamageOutcome::Dead,
                particles: Vec::new(),
            }
        }
    }
}

impl Collidable for Player {
    fn bounds(&self) -> Aabb {
        self.hitbox()
    }
}
