//! Per-frame simulation tick
//!
//! Core game loop: clock, player, wave director, enemies, projectiles,
//! particles, indicators, then the terminal check. Collections are walked in
//! reverse so removals never disturb indices still to be visited.

use glam::Vec2;

use super::collision::check_collision;
use super::events::{DamageIndicator, DamageKind, GameEvent};
use super::particle::{OrbKind, Particle, burst, palette};
use super::player::DamageOutcome;
use super::projectile::Owner;
use super::state::{GamePhase, GameState};
use super::upgrades::generate_choices;
use super::wave::WaveState;
use super::wisp::closest_enemy;
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held direction
    pub left: bool,
    pub right: bool,
    /// Jump pressed this tick (edge, not held)
    pub jump: bool,
    /// Fire button held
    pub fire: bool,
    /// Aim point in arena coordinates
    pub pointer: Vec2,
    /// Pause toggle
    pub pause: bool,
    /// Demo mode - the simulation steers, aims and picks upgrades itself
    pub autopilot: bool,
}

/// Heal fraction of max HP per heal orb
const HEAL_ORB_FRACTION: f32 = 0.1;
/// Experience per soul orb, as a fraction of the current threshold
const SOUL_ORB_FRACTION: f32 = 0.1;

/// Advance the game state by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }

    if input.autopilot && state.phase == GamePhase::ChoosingUpgrade {
        autopick_upgrade(state);
    }

    // Don't tick if paused, choosing or game over
    if state.phase != GamePhase::Playing {
        return;
    }
    if !dt.is_finite() || dt <= 0.0 {
        return;
    }
    let dt = dt.min(MAX_DT);

    let input = if input.autopilot {
        autopilot_input(state, input)
    } else {
        input.clone()
    };

    state.time_ticks += 1;
    state.elapsed += dt;
    state.clock.advance(dt);

    if state.director.state == WaveState::Inactive {
        let wave = state.director.start_next_wave();
        state.events.push(GameEvent::WaveStarted { wave });
    }

    update_player(state, &input, dt);
    update_director(state, dt);
    update_enemies(state, dt);
    let killed = update_projectiles(state, dt);
    update_particles(state, dt);
    update_indicators(state, dt);
    check_game_over(state, killed);

    state.normalize_order();
}

fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let out = state
        .player
        .update(dt, input, &state.terrain, &state.enemies, &mut state.rng);

    if out.fired {
        state.events.push(GameEvent::PlayerShot);
    }
    if out.jumped {
        state.events.push(GameEvent::PlayerJumped);
    }
    for projectile in out.projectiles {
        state.add_projectile(projectile);
    }
    state.particles.extend(out.particles);

    if out.leveled_up {
        let level = state.player.progress.level;
        state.events.push(GameEvent::LevelUp { level });
        let choices = generate_choices(
            state.player.upgrades.level_up_choices as usize,
            state.player.upgrades.luck,
            &mut state.rng,
        );
        log::info!("Level {} reached, offering {} upgrades", level, choices.len());
        if !choices.is_empty() {
            state.pending_choices = choices;
            state.phase = GamePhase::ChoosingUpgrade;
        }
    }
}

fn update_director(state: &mut GameState, dt: f32) {
    let out = state.director.advance(dt, &mut state.rng);
    if let Some(wave) = out.wave_started {
        state.events.push(GameEvent::WaveStarted { wave });
    }
    for enemy in out.spawned {
        state.add_enemy(enemy);
    }
}

fn update_enemies(state: &mut GameState, dt: f32) {
    let mut shots = Vec::new();
    let mut i = state.enemies.len();
    while i > 0 {
        i -= 1;
        let out = state.enemies[i].update(dt, &state.player, &mut state.rng);
        let enemy = &state.enemies[i];
        let top = enemy.pos - Vec2::new(0.0, enemy.height / 2.0);

        for hit in &out.damage_taken {
            state
                .indicators
                .push(DamageIndicator::new(&mut state.rng, hit.amount, top, hit.kind));
        }
        if out.projectiles.iter().any(|p| p.owner == Owner::Enemy) {
            state.events.push(GameEvent::EnemyShot);
        }
        shots.extend(out.projectiles);

        if out.died {
            let kind = enemy.kind;
            state.director.record_defeat();
            let reward = (out.value as f32 * state.director.config.value_multiplier).floor();
            state.player.gain_exp(reward);
            state.score += reward as u64 * 10;
            state.kills += 1;
            state.particles.extend(out.particles);
            state.events.push(GameEvent::EnemyDied { kind });
            state.enemies.remove(i);
        } else {
            state.particles.extend(out.particles);
        }
    }
    for shot in shots {
        state.add_projectile(shot);
    }

    if state.director.check_clear(state.enemies.len()) {
        state.clock.skip_for_clear();
        state.events.push(GameEvent::WaveCleared {
            wave: state.director.wave,
        });
    }
}

/// Returns true if an enemy shot killed the player outright
fn update_projectiles(state: &mut GameState, dt: f32) -> bool {
    let mut killed = false;
    let mut enemy_hit = false;
    let mut i = state.projectiles.len();
    while i > 0 {
        i -= 1;
        let proj = &mut state.projectiles[i];
        proj.update(dt);
        let mut remove = false;

        match proj.owner {
            Owner::Player => {
                // First living enemy touched consumes one hit
                if let Some(enemy) = state
                    .enemies
                    .iter_mut()
                    .find(|e| e.is_alive() && check_collision(&*proj, &**e))
                {
                    enemy.take_damage(proj.damage, proj.cold, proj.bleed);
                    let kind = if proj.crit { DamageKind::Crit } else { DamageKind::Normal };
                    let top = enemy.pos - Vec2::new(0.0, enemy.height / 2.0);
                    state
                        .indicators
                        .push(DamageIndicator::new(&mut state.rng, proj.damage, top, kind));
                    if state.player.stats.lifesteal > 0.0 {
                        state.player.heal(proj.damage * state.player.stats.lifesteal);
                    }
                    proj.register_hit();
                    enemy_hit = true;
                }

                if proj.exhausted() || proj.touches_ground(state.terrain.ground_at(proj.pos.x)) {
                    if proj.explosive {
                        let pos = proj.pos;
                        state.particles.extend(burst(&mut state.rng, pos, 10, palette::PURPLE));
                        state.events.push(GameEvent::Explosion);
                    }
                    remove = true;
                }
            }
            Owner::Enemy => {
                if check_collision(&*proj, &state.player.hitbox()) {
                    let pos = proj.pos;
                    let damage = proj.damage;
                    state.particles.extend(burst(&mut state.rng, pos, 8, palette::RED_ORANGE));
                    let result = state.player.take_damage(damage, &mut state.rng);
                    state.particles.extend(result.particles);
                    match result.outcome {
                        DamageOutcome::Ignored => {}
                        DamageOutcome::Hurt => state.events.push(GameEvent::PlayerHit),
                        DamageOutcome::BarrierBroken => state.events.push(GameEvent::BarrierBroken),
                        DamageOutcome::Revived => {
                            state.events.push(GameEvent::Revived);
                            // Everything on screen dies with the revive; removal happens next tick
                            for enemy in state.enemies.iter_mut() {
                                enemy.hp = 0.0;
                            }
                        }
                        DamageOutcome::Dead => {
                            state.events.push(GameEvent::PlayerHit);
                            killed = true;
                        }
                    }
                    remove = true;
                } else if proj.touches_ground(state.terrain.ground_at(proj.pos.x)) {
                    let pos = proj.pos;
                    state.particles.extend(burst(&mut state.rng, pos, 5, palette::DIRT));
                    remove = true;
                }
            }
        }

        if remove || state.projectiles[i].out_of_bounds() {
            state.projectiles.remove(i);
        }
    }
    if enemy_hit {
        state.events.push(GameEvent::EnemyHit);
    }
    killed
}

fn update_particles(state: &mut GameState, dt: f32) {
    let player_pos = state.player.pos;
    let player_box = state.player.hitbox();
    let mut i = state.particles.len();
    while i > 0 {
        i -= 1;
        match &mut state.particles[i] {
            Particle::Spark(body) => body.integrate(dt),
            Particle::Lightning(bolt) => {
                let damage = bolt.damage;
                for index in bolt.update(dt, &mut state.enemies) {
                    let enemy = &state.enemies[index];
                    let top = enemy.pos - Vec2::new(0.0, enemy.height / 2.0);
                    state
                        .indicators
                        .push(DamageIndicator::new(&mut state.rng, damage, top, DamageKind::Lightning));
                }
            }
            Particle::Orb(orb) => {
                if let Some(kind) = orb.update(dt, player_pos, &player_box) {
                    match kind {
                        OrbKind::Heal => state.player.heal(state.player.stats.max_hp * HEAL_ORB_FRACTION),
                        OrbKind::Soul => state
                            .player
                            .gain_exp(state.player.progress.exp_to_next as f32 * SOUL_ORB_FRACTION),
                    }
                    state.events.push(GameEvent::OrbCollected { kind });
                }
            }
        }
        if !state.particles[i].alive() {
            state.particles.remove(i);
        }
    }
}

fn update_indicators(state: &mut GameState, dt: f32) {
    for indicator in state.indicators.iter_mut() {
        indicator.update(dt);
    }
    state.indicators.retain(|d| !d.expired());
}

fn check_game_over(state: &mut GameState, killed: bool) {
    let player = &state.player;
    let out_of_lives = player.hp <= 0.0 && player.upgrades.revives == 0 && !player.is_invincible();
    if killed || out_of_lives {
        state.phase = GamePhase::GameOver;
        state.final_score = Some(state.score);
        state.pending_choices.clear();
        state.events.push(GameEvent::GameOver { score: state.score });
        log::info!(
            "Game over: score {}, wave {}, level {}",
            state.score,
            state.director.wave,
            state.player.progress.level
        );
    }
}

/// Pick the rarest upgrade on offer; ties go to the first listed
fn autopick_upgrade(state: &mut GameState) {
    let best = state
        .pending_choices
        .iter()
        .enumerate()
        .max_by_key(|(i, id)| (id.rarity() as u8, std::cmp::Reverse(*i)))
        .map(|(i, _)| i);
    if let Some(index) = best {
        state.choose_upgrade(index);
    }
}

/// Steer the player: dodge the nearest incoming shot, otherwise hover near
/// the center, and keep firing at the closest enemy
fn autopilot_input(state: &GameState, input: &TickInput) -> TickInput {
    let mut input = input.clone();
    let player = &state.player;

    match closest_enemy(player.pos, &state.enemies) {
        Some(target) => {
            input.fire = true;
            input.pointer = target.pos;
        }
        None => input.fire = false,
    }

    let threat = state
        .projectiles
        .iter()
        .filter(|p| p.owner == Owner::Enemy)
        .filter(|p| (p.pos - player.pos).dot(p.vel) < 0.0)
        .min_by(|a, b| {
            a.pos
                .distance_squared(player.pos)
                .partial_cmp(&b.pos.distance_squared(player.pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .filter(|p| p.pos.distance(player.pos) < TILE_SIZE * 10.0);

    input.left = false;
    input.right = false;
    input.jump = false;
    if let Some(shot) = threat {
        if shot.pos.x > player.pos.x {
            input.left = true;
        } else {
            input.right = true;
        }
        input.jump = shot.pos.y > player.pos.y - player.height;
    } else {
        // Wander around the middle with some variety
        let time_factor = state.time_ticks as f32 * 0.01;
        let anchor = ARENA_WIDTH / 2.0 + time_factor.sin() * ARENA_WIDTH * 0.25;
        if player.pos.x < anchor - TILE_SIZE * 4.0 {
            input.right = true;
        } else if player.pos.x > anchor + TILE_SIZE * 4.0 {
            input.left = true;
        }
    }
    input
}
