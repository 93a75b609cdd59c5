//! Rule options for a game session.

use crate::board::SpawnRule;
use crate::progress::STARTING_GEMS;

/// Gems taken by a shuffle.
pub const SHUFFLE_COST: u64 = 50;

/// Options that change how a session plays (spawn rule, match cap, selection strictness).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub starting_gems: u64,
    /// Spawn values above 4 on later levels.
    pub level_scaled_tiles: bool,
    /// Force game over after this many merges. `None` = unlimited.
    pub match_cap: Option<u32>,
    /// Accept any adjacent tile while building and fall back to the longest
    /// valid prefix on commit.
    pub relaxed_selection: bool,
}

impl GameConfig {
    pub fn spawn_rule(&self, level: u32) -> SpawnRule {
        SpawnRule {
            level,
            level_scaled: self.level_scaled_tiles,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_gems: STARTING_GEMS,
            level_scaled_tiles: false,
            match_cap: None,
            relaxed_selection: false,
        }
    }
}
