//! Ground heightmap
//!
//! One ground height per integer x column across the arena. Lookups outside
//! the map (or on non-finite x) resolve to the arena floor.

use serde::{Deserialize, Serialize};

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH, TILE_SIZE};

/// Stepped ground profile: (start tile, end tile, height in tiles above the bottom edge)
const STEPS: &[(f32, f32, f32)] = &[
    (15.0, 25.0, 5.0),
    (25.0, 35.0, 4.0),
    (35.0, 58.0, 2.0),
    (58.0, 62.0, 3.0),
    (62.0, 66.0, 4.0),
    (66.0, 78.0, 2.0),
    (78.0, 82.0, 3.0),
    (82.0, 86.0, 4.0),
    (86.0, 90.0, 5.0),
    (90.0, f32::INFINITY, 6.0),
];

/// Default ground height, in tiles above the bottom edge
const BASE_TILES: f32 = 2.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terrain {
    heights: Vec<f32>,
}

impl Default for Terrain {
    fn default() -> Self {
        Self::generate()
    }
}

impl Terrain {
    /// Build the standard arena profile
    pub fn generate() -> Self {
        let columns = ARENA_WIDTH as usize;
        let heights = (0..columns)
            .map(|i| {
                let x = i as f32;
                let tiles = STEPS
                    .iter()
                    .find(|(start, end, _)| {
                        // The first step starts strictly after its boundary
                        let after_start = if *start == STEPS[0].0 {
                            x > start * TILE_SIZE
                        } else {
                            x >= start * TILE_SIZE
                        };
                        after_start && x < end * TILE_SIZE
                    })
                    .map(|(_, _, h)| *h)
                    .unwrap_or(BASE_TILES);
                ARENA_HEIGHT - TILE_SIZE * tiles
            })
            .collect();
        Self { heights }
    }

    /// Flat ground at a fixed height (tests and custom arenas)
    pub fn flat(height: f32) -> Self {
        Self {
            heights: vec![height; ARENA_WIDTH as usize],
        }
    }

    /// Ground y under the given x
    pub fn ground_at(&self, x: f32) -> f32 {
        if !x.is_finite() || x < 0.0 {
            return ARENA_HEIGHT;
        }
        self.heights
            .get(x.floor() as usize)
            .copied()
            .unwrap_or(ARENA_HEIGHT)
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_steps() {
        let t = Terrain::generate();
        assert_eq!(t.heights().len(), 1152);
        assert_eq!(t.ground_at(0.0), ARENA_HEIGHT - TILE_SIZE * 2.0);
        assert_eq!(t.ground_at(TILE_SIZE * 15.0), ARENA_HEIGHT - TILE_SIZE * 2.0);
        assert_eq!(t.ground_at(TILE_SIZE * 20.0), ARENA_HEIGHT - TILE_SIZE * 5.0);
        assert_eq!(t.ground_at(TILE_SIZE * 30.0), ARENA_HEIGHT - TILE_SIZE * 4.0);
        assert_eq!(t.ground_at(TILE_SIZE * 95.0), ARENA_HEIGHT - TILE_SIZE * 6.0);
    }

    #[test]
    fn test_out_of_range_falls_back_to_floor() {
        let t = Terrain::generate();
        assert_eq!(t.ground_at(-3.0), ARENA_HEIGHT);
        assert_eq!(t.ground_at(5000.0), ARENA_HEIGHT);
        assert_eq!(t.ground_at(f32::NAN), ARENA_HEIGHT);
    }
}
