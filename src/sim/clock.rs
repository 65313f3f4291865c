//! Run clock and the day/night cycle derived from it

use serde::{Deserialize, Serialize};

use crate::consts::CYCLE_SECONDS;
use crate::{ease_in_out_sine, lerp};

/// End of each phase as a fraction of the cycle
pub const DAY_END: f32 = 1.0 / 3.0;
pub const DUSK_END: f32 = DAY_END + 1.0 / 6.0;
pub const NIGHT_END: f32 = DUSK_END + 1.0 / 6.0;

/// Phase of the day/night cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayPhase {
    Day,
    Dusk,
    Night,
    Dawn,
}

/// Elapsed run time plus the cycle helpers that read it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clock {
    /// Seconds, including any wave-clear bonus skips
    pub elapsed: f32,
}

impl Default for Clock {
    fn default() -> Self {
        Self::run_start()
    }
}

impl Clock {
    pub fn new(elapsed: f32) -> Self {
        Self { elapsed }
    }

    /// A fresh run begins as dusk ends, so the first wave fights at night
    pub fn run_start() -> Self {
        Self::new(DUSK_END * CYCLE_SECONDS)
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    /// Skip ahead a third of the cycle (wave-clear reward)
    pub fn skip_for_clear(&mut self) {
        self.elapsed += CYCLE_SECONDS / 3.0;
    }

    /// Position within the current cycle, in [0, 1)
    pub fn cycle_position(&self) -> f32 {
        self.elapsed.rem_euclid(CYCLE_SECONDS) / CYCLE_SECONDS
    }

    pub fn phase(&self) -> DayPhase {
        let t = self.cycle_position();
        if t < DAY_END {
            DayPhase::Day
        } else if t < DUSK_END {
            DayPhase::Dusk
        } else if t < NIGHT_END {
            DayPhase::Night
        } else {
            DayPhase::Dawn
        }
    }

    /// 1 in full day, 0 in full night, eased through dusk and dawn
    pub fn day_factor(&self) -> f32 {
        let t = self.cycle_position();
        match self.phase() {
            DayPhase::Day => 1.0,
            DayPhase::Dusk => {
                let progress = (t - DAY_END) / (DUSK_END - DAY_END);
                1.0 - ease_in_out_sine(progress)
            }
            DayPhase::Night => 0.0,
            DayPhase::Dawn => {
                let progress = (t - NIGHT_END) / (1.0 - NIGHT_END);
                ease_in_out_sine(progress)
            }
        }
    }

    /// Inverse of the day factor
    pub fn star_visibility(&self) -> f32 {
        lerp(1.0, 0.0, self.day_factor())
    }
}
