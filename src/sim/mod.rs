//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod clock;
pub mod collision;
pub mod enemy;
pub mod events;
pub mod particle;
pub mod player;
pub mod projectile;
pub mod snapshot;
pub mod state;
pub mod terrain;
pub mod tick;
pub mod upgrades;
pub mod wave;
pub mod wisp;

pub use clock::{Clock, DayPhase};
pub use collision::{Aabb, Collidable, check_collision};
pub use enemy::{Enemy, EnemyKind};
pub use events::{DamageIndicator, DamageKind, GameEvent};
pub use particle::{Lightning, Orb, OrbKind, Particle};
pub use player::{DamageOutcome, Player};
pub use projectile::{Owner, Projectile};
pub use snapshot::Snapshot;
pub use state::{GamePhase, GameState, RunStats};
pub use terrain::Terrain;
pub use tick::{TickInput, tick};
pub use upgrades::{Rarity, Upgrade, UpgradeId};
pub use wave::{WaveConfig, WaveDirector, WaveState};
pub use wisp::Wisp;
