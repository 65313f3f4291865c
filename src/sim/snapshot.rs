//! Read-only, draw-ready view of the game state
//!
//! Renderers and UIs consume a [`Snapshot`] instead of reaching into the
//! simulation. Bar ratios are pre-clamped.

use glam::Vec2;
use serde::Serialize;

use super::clock::DayPhase;
use super::enemy::EnemyKind;
use super::events::DamageKind;
use super::particle::{OrbKind, Particle};
use super::projectile::Owner;
use super::state::{GamePhase, GameState, RunStats};
use super::upgrades::{Rarity, UpgradeId};
use crate::bar_ratio;

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub hp_ratio: f32,
    pub exp_ratio: f32,
    pub invincible: bool,
    /// Shield is up and will absorb the next hit
    pub barrier_ready: bool,
    pub focus: f32,
    pub wisp: Option<Vec2>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub hp_ratio: f32,
    pub slowed: bool,
    pub bleeding: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileView {
    pub id: u32,
    pub owner: Owner,
    pub pos: Vec2,
    pub size: f32,
    pub crit: bool,
    pub explosive: bool,
}

#[derive(Debug, Clone, Serialize)]
pub enum ParticleView {
    Spark { pos: Vec2, size: f32, color: u32, alpha: f32 },
    Lightning { path: Vec<Vec2>, alpha: f32 },
    Orb { pos: Vec2, size: f32, kind: OrbKind, alpha: f32 },
}

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorView {
    pub amount: u32,
    pub pos: Vec2,
    pub kind: DamageKind,
    pub alpha: f32,
}

/// One offered upgrade, as the choice UI shows it
#[derive(Debug, Clone, Serialize)]
pub struct UpgradeChoiceView {
    pub id: UpgradeId,
    pub name: &'static str,
    pub description: &'static str,
    pub rarity: Rarity,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub phase: GamePhase,
    pub day_phase: DayPhase,
    /// 1 = full day, 0 = full night
    pub day_factor: f32,
    pub star_visibility: f32,
    pub terrain: Vec<f32>,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub particles: Vec<ParticleView>,
    pub indicators: Vec<IndicatorView>,
    pub choices: Vec<UpgradeChoiceView>,
    pub stats: RunStats,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        let player = &state.player;
        Self {
            tick: state.time_ticks,
            phase: state.phase,
            day_phase: state.clock.phase(),
            day_factor: state.clock.day_factor(),
            star_visibility: state.clock.star_visibility(),
            terrain: state.terrain.heights().to_vec(),
            player: PlayerView {
                pos: player.pos,
                width: player.width * player.upgrades.shrink,
                height: player.height * player.upgrades.shrink,
                hp: player.hp.max(0.0),
                max_hp: player.stats.max_hp,
                hp_ratio: bar_ratio(player.hp, player.stats.max_hp),
                exp_ratio: bar_ratio(player.progress.exp, player.progress.exp_to_next as f32),
                invincible: player.is_invincible(),
                barrier_ready: player.upgrades.barrier && player.passives.barrier_ready,
                focus: player.passives.focus_bonus,
                wisp: player.companion.as_ref().map(|w| w.pos),
            },
            enemies: state
                .enemies
                .iter()
                .map(|e| EnemyView {
                    id: e.id,
                    kind: e.kind,
                    pos: e.pos,
                    width: e.width,
                    height: e.height,
                    hp_ratio: bar_ratio(e.hp, e.max_hp),
                    slowed: e.slow_factor < 1.0,
                    bleeding: e.bleed_stacks > 0,
                })
                .collect(),
            projectiles: state
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    id: p.id,
                    owner: p.owner,
                    pos: p.pos,
                    size: p.size,
                    crit: p.crit,
                    explosive: p.explosive,
                })
                .collect(),
            particles: state.particles.iter().map(particle_view).collect(),
            indicators: state
                .indicators
                .iter()
                .map(|d| IndicatorView {
                    amount: d.amount,
                    pos: d.pos,
                    kind: d.kind,
                    alpha: d.alpha(),
                })
                .collect(),
            choices: state
                .upgrade_choices()
                .iter()
                .map(|id| {
                    let def = id.def();
                    UpgradeChoiceView {
                        id: *id,
                        name: def.name,
                        description: def.description,
                        rarity: def.rarity,
                    }
                })
                .collect(),
            stats: state.stats(),
        }
    }
}

fn particle_view(particle: &Particle) -> ParticleView {
    match particle {
        Particle::Spark(body) => ParticleView::Spark {
            pos: body.pos,
            size: body.size,
            color: body.color,
            alpha: body.alpha(),
        },
        Particle::Lightning(bolt) => ParticleView::Lightning {
            path: bolt.points.clone(),
            alpha: bolt.body.alpha(),
        },
        Particle::Orb(orb) => ParticleView::Orb {
            pos: orb.body.pos,
            size: orb.body.size,
            kind: orb.kind,
            alpha: orb.body.alpha(),
        },
    }
}
