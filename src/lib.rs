//! Pixel Survivor - a side-view arcade survival shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, waves, upgrades, collisions)
//! - `audio`: Sound cue vocabulary and the playback seam
//! - `persistence`: Cross-run progression, shop and points ledger
//! - `settings`: User preferences (volumes, accessibility)
//! - `highscores`: Best-runs leaderboard

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use persistence::Progression;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Arena dimensions (world units, y grows downward)
    pub const ARENA_WIDTH: f32 = 1152.0;
    pub const ARENA_HEIGHT: f32 = 648.0;
    /// Grid unit most sizes are expressed in
    pub const TILE_SIZE: f32 = ARENA_WIDTH / 96.0;

    /// Downward acceleration per reference frame
    pub const GRAVITY: f32 = 0.6;
    /// Velocities are tuned per 1/60 s frame; multiply by `dt * FRAME_SCALE`
    pub const FRAME_SCALE: f32 = 60.0;
    /// Largest delta time a single tick will integrate
    pub const MAX_DT: f32 = 0.1;

    /// Nominal host frame step, used by tests and the headless runner
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Day/night cycle length (seconds)
    pub const CYCLE_SECONDS: f32 = 180.0;

    /// Projectiles this far outside the arena are dropped
    pub const OFFSCREEN_MARGIN: f32 = TILE_SIZE * 2.0;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Sine ease-in-out over [0, 1]
#[inline]
pub fn ease_in_out_sine(t: f32) -> f32 {
    -((std::f32::consts::PI * t).cos() - 1.0) / 2.0
}

/// Ratio for bar rendering, never negative and never above 1
#[inline]
pub fn bar_ratio(value: f32, max: f32) -> f32 {
    if max <= 0.0 {
        return 0.0;
    }
    (value.max(0.0) / max).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_endpoints() {
        assert!(ease_in_out_sine(0.0).abs() < 1e-6);
        assert!((ease_in_out_sine(1.0) - 1.0).abs() < 1e-6);
        assert!((ease_in_out_sine(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_bar_ratio_clamps() {
        assert_eq!(bar_ratio(-5.0, 100.0), 0.0);
        assert_eq!(bar_ratio(150.0, 100.0), 1.0);
        assert_eq!(bar_ratio(10.0, 0.0), 0.0);
        assert!((bar_ratio(25.0, 100.0) - 0.25).abs() < 1e-6);
    }
}
