//! High score leaderboard system
//!
//! Tracks the top 10 finished runs in a JSON file next to the save.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::persistence::write_json_atomic;
use crate::sim::state::RunStats;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Final score of the run
    pub score: u64,
    /// Wave reached
    pub wave: u32,
    /// Player level at the end of the run
    pub level: u32,
    pub kills: u32,
}

impl HighScoreEntry {
    pub fn from_stats(score: u64, stats: &RunStats) -> Self {
        Self {
            score,
            wave: stats.wave,
            level: stats.level,
            kills: stats.kills,
        }
    }
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert an entry if it qualifies. Returns the rank achieved (1-indexed).
    /// Ties rank below the existing entry.
    pub fn add(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from a JSON file. A missing file yields an empty board.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No high scores found, starting fresh");
            return Ok(Self::new());
        }
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read high scores {}", path.display()))?;
        let mut scores: HighScores = serde_json::from_str(&json)
            .with_context(|| format!("high scores {} is not valid JSON", path.display()))?;
        // Hand-edited files may be unsorted or oversized
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: u64) -> HighScoreEntry {
        HighScoreEntry {
            score,
            wave: 1,
            level: 1,
            kills: 0,
        }
    }

    #[test]
    fn test_ranks_descending() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add(entry(100)), Some(1));
        assert_eq!(scores.add(entry(300)), Some(1));
        assert_eq!(scores.add(entry(200)), Some(2));
        assert_eq!(scores.add(entry(200)), Some(3));
        assert_eq!(scores.top_score(), Some(300));
        let order: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(order, vec![300, 200, 200, 100]);
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add(entry(0)), None);
        assert!(scores.is_empty());
    }

    #[test]
    fn test_full_board() {
        let mut scores = HighScores::new();
        for i in 1..=MAX_HIGH_SCORES as u64 {
            scores.add(entry(i * 10));
        }
        assert!(!scores.qualifies(10));
        assert_eq!(scores.potential_rank(55), Some(6));
        assert_eq!(scores.add(entry(1000)), Some(1));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(20));
    }

    #[test]
    fn test_load_sorts_and_truncates() {
        let dir = std::env::temp_dir().join(format!("pixel-survivor-scores-{}", std::process::id()));
        let path = dir.join("scores.json");
        let mut raw = HighScores::new();
        raw.entries = (1..=12).map(|i| entry(i * 5)).collect();
        raw.save(&path).unwrap();

        let loaded = HighScores::load(&path).unwrap();
        assert_eq!(loaded.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(loaded.top_score(), Some(60));
        assert_eq!(loaded.entries.last().map(|e| e.score), Some(15));
        fs::remove_dir_all(&dir).unwrap();
    }
}
