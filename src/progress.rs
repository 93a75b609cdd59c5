//! Score, gems and level/goal progression.

use crate::board::{TileValue, is_tile_value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Goal tile for level 1; doubles every level.
pub const STARTING_GOAL: TileValue = 32;
/// Gems granted when a level is completed.
pub const LEVEL_BONUS_GEMS: u64 = 50;
/// One gem per this many points merged.
pub const POINTS_PER_GEM: u64 = 8;
/// Default starting purse.
pub const STARTING_GEMS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("level must be 1 or more, got {0}")]
    InvalidLevel(u32),
    #[error("goal {0} is not a power of two >= 2")]
    InvalidGoal(TileValue),
    #[error("goal {0} cannot be doubled")]
    GoalOverflow(TileValue),
}

/// Loaded progress is checked the same way a loaded board is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ProgressFields")]
pub struct Progress {
    pub score: u64,
    pub best_score: u64,
    pub level: u32,
    pub goal: TileValue,
    pub gems: u64,
    /// Merges resolved in the current game.
    #[serde(default)]
    pub matches: u32,
    #[serde(default)]
    pub game_won: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressFields {
    score: u64,
    best_score: u64,
    level: u32,
    goal: TileValue,
    gems: u64,
    #[serde(default)]
    matches: u32,
    #[serde(default)]
    game_won: bool,
}

impl TryFrom<ProgressFields> for Progress {
    type Error = ProgressError;

    fn try_from(f: ProgressFields) -> Result<Self, Self::Error> {
        let progress = Self {
            score: f.score,
            best_score: f.best_score,
            level: f.level,
            goal: f.goal,
            gems: f.gems,
            matches: f.matches,
            game_won: f.game_won,
        };
        progress.validate()?;
        Ok(progress)
    }
}

impl Progress {
    pub fn new(starting_gems: u64) -> Self {
        Self {
            score: 0,
            best_score: 0,
            level: 1,
            goal: STARTING_GOAL,
            gems: starting_gems,
            matches: 0,
            game_won: false,
        }
    }

    /// Books a resolved merge. Returns the gems it earned.
    pub fn record_merge(&mut self, points: TileValue) -> u64 {
        let points = u64::from(points);
        self.score = self.score.saturating_add(points);
        self.best_score = self.best_score.max(self.score);
        self.matches = self.matches.saturating_add(1);
        let earned = points / POINTS_PER_GEM;
        self.gems = self.gems.saturating_add(earned);
        earned
    }

    /// Level is at least 1 and the goal is a reachable tile value.
    pub fn validate(&self) -> Result<(), ProgressError> {
        if self.level == 0 {
            return Err(ProgressError::InvalidLevel(self.level));
        }
        if !is_tile_value(self.goal) {
            return Err(ProgressError::InvalidGoal(self.goal));
        }
        Ok(())
    }

    /// Next level: goal doubles, level bonus paid, win flag cleared.
    /// Nothing changes when the goal is already the largest tile value.
    pub fn advance_level(&mut self) -> Result<(), ProgressError> {
        let goal = self
            .goal
            .checked_mul(2)
            .ok_or(ProgressError::GoalOverflow(self.goal))?;
        self.level = self.level.saturating_add(1);
        self.goal = goal;
        self.gems = self.gems.saturating_add(LEVEL_BONUS_GEMS);
        self.game_won = false;
        Ok(())
    }

    /// Back to level 1 for a new game. Best score and gems carry over.
    pub fn reset_game(&mut self) {
        self.score = 0;
        self.level = 1;
        self.goal = STARTING_GOAL;
        self.matches = 0;
        self.game_won = false;
    }

    /// Spends up to `cost` gems, never going below zero. Returns what was taken.
    pub fn spend_gems(&mut self, cost: u64) -> u64 {
        let taken = cost.min(self.gems);
        self.gems -= taken;
        taken
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(STARTING_GEMS)
    }
}
