//! Game session: board, selection, progress and status, driven by the input layer.

use crate::board::{Board, Position, TileValue};
use crate::config::{GameConfig, SHUFFLE_COST};
use crate::persistence::SaveRecord;
use crate::progress::{Progress, ProgressError};
use crate::resolver::{self, Resolution, ResolveError};
use crate::rng::TileSource;
use crate::selection::{AppendError, SelectedTile, SelectionChain};
use crate::terminal::{has_any_legal_move, is_won};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    /// No two adjacent tiles share a value.
    NoMoves,
    /// The configured merge limit was reached.
    MatchCap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Playing,
    /// Goal tile reached; waiting for [`Game::next_level`].
    Won,
    GameOver(GameOverReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Append(#[from] AppendError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error("no moves accepted while the game is {0:?}")]
    NotPlaying(Status),
    #[error("level {level} is not complete yet")]
    LevelNotComplete { level: u32 },
    #[error("cannot swap {0} with {1}")]
    InvalidSwap(Position, Position),
}

/// Everything the front end needs after a committed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub resolution: Resolution,
    /// Length of the chain as released, before any prefix fallback.
    pub submitted: usize,
    pub gems_earned: u64,
    pub highest: TileValue,
    pub status: Status,
}

impl MoveReport {
    pub fn used_prefix(&self) -> bool {
        self.resolution.used_prefix(self.submitted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub level: u32,
    pub goal: TileValue,
    pub bonus_gems: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShuffleReport {
    pub gems_spent: u64,
    pub status: Status,
}

/// Win takes precedence over game over.
fn assess(board: &Board, progress: &Progress, match_cap: Option<u32>) -> Status {
    if is_won(board, progress.goal) {
        Status::Won
    } else if match_cap.is_some_and(|cap| progress.matches >= cap) {
        Status::GameOver(GameOverReason::MatchCap)
    } else if !has_any_legal_move(board) {
        Status::GameOver(GameOverReason::NoMoves)
    } else {
        Status::Playing
    }
}

/// One player's game. Owns the board, the chain being built and the random source.
#[derive(Debug)]
pub struct Game<S> {
    config: GameConfig,
    source: S,
    board: Board,
    progress: Progress,
    chain: SelectionChain,
    status: Status,
}

impl<S: TileSource> Game<S> {
    pub fn new(config: GameConfig, mut source: S) -> Self {
        let progress = Progress::new(config.starting_gems);
        let board = Board::generate(&mut source, config.spawn_rule(progress.level));
        let status = assess(&board, &progress, config.match_cap);
        Self {
            config,
            source,
            board,
            progress,
            chain: SelectionChain::new(),
            status,
        }
    }

    /// Continues from a saved record; the saved board is used as is.
    pub fn restore(config: GameConfig, source: S, record: SaveRecord) -> Self {
        let SaveRecord { board, progress, .. } = record;
        let mut game = Self {
            config,
            source,
            board,
            progress,
            chain: SelectionChain::new(),
            status: Status::Playing,
        };
        game.refresh_status();
        game
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn chain(&self) -> &SelectionChain {
        &self.chain
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn snapshot(&self) -> SaveRecord {
        SaveRecord::new(self.board, self.progress.clone())
    }

    fn ensure_playing(&self) -> Result<(), SessionError> {
        match self.status {
            Status::Playing => Ok(()),
            other => Err(SessionError::NotPlaying(other)),
        }
    }

    fn refresh_status(&mut self) {
        self.status = assess(&self.board, &self.progress, self.config.match_cap);
        self.progress.game_won = self.status == Status::Won;
    }

    /// Starts a new chain at `position`, dropping any chain in progress.
    pub fn begin(&mut self, position: Position) -> Result<(), SessionError> {
        self.chain.clear();
        self.extend(position)
    }

    /// Appends `position` to the chain. A rejected append leaves the chain as it was.
    pub fn extend(&mut self, position: Position) -> Result<(), SessionError> {
        self.ensure_playing()?;
        let tile = SelectedTile::at(&self.board, position)
            .ok_or(AppendError::OutOfBounds(position))?;
        let pushed = if self.config.relaxed_selection {
            self.chain.try_push_relaxed(tile)
        } else {
            self.chain.try_push(tile)
        };
        if let Err(e) = pushed {
            debug!(%position, error = %e, "append rejected");
            return Err(e.into());
        }
        Ok(())
    }

    pub fn cancel(&mut self) {
        if !self.chain.is_empty() {
            debug!(len = self.chain.len(), "chain cancelled");
        }
        self.chain.clear();
    }

    /// Releases the chain. The chain is cleared whatever the outcome.
    pub fn commit(&mut self) -> Result<MoveReport, SessionError> {
        let chain = std::mem::take(&mut self.chain);
        self.ensure_playing()?;
        let rule = self.config.spawn_rule(self.progress.level);
        let resolved = resolver::commit(&self.board, chain.tiles(), &mut self.source, rule);
        let resolution = match resolved {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "commit was a no-op");
                return Err(e.into());
            }
        };

        self.board = resolution.board;
        let gems_earned = self.progress.record_merge(resolution.points);
        self.refresh_status();
        let highest = self.board.max_value();

        info!(
            at = %resolution.merged.position,
            value = resolution.merged.value,
            points = resolution.points,
            score = self.progress.score,
            "merged chain"
        );
        match self.status {
            Status::Won => {
                info!(level = self.progress.level, goal = self.progress.goal, "level complete");
            }
            Status::GameOver(reason) => info!(?reason, score = self.progress.score, "game over"),
            Status::Playing => {}
        }

        Ok(MoveReport {
            resolution,
            submitted: chain.len(),
            gems_earned,
            highest,
            status: self.status,
        })
    }

    /// Moves on after a win. The board is kept.
    pub fn next_level(&mut self) -> Result<LevelUp, SessionError> {
        if self.status != Status::Won {
            return Err(SessionError::LevelNotComplete {
                level: self.progress.level,
            });
        }
        let before = self.progress.gems;
        self.progress.advance_level()?;
        self.chain.clear();
        self.refresh_status();
        let up = LevelUp {
            level: self.progress.level,
            goal: self.progress.goal,
            bonus_gems: self.progress.gems - before,
        };
        info!(level = up.level, goal = up.goal, "advanced level");
        Ok(up)
    }

    /// Fresh board at level 1. Best score and gems carry over.
    pub fn new_game(&mut self) {
        self.progress.reset_game();
        let rule = self.config.spawn_rule(self.progress.level);
        self.board = Board::generate(&mut self.source, rule);
        self.chain.clear();
        self.refresh_status();
        info!(best = self.progress.best_score, gems = self.progress.gems, "new game");
    }

    fn ensure_board_editable(&self) -> Result<(), SessionError> {
        match self.status {
            Status::Won => Err(SessionError::NotPlaying(self.status)),
            _ => Ok(()),
        }
    }

    /// Rearranges the tiles for [`SHUFFLE_COST`] gems (fewer if the purse is short).
    pub fn shuffle(&mut self) -> Result<ShuffleReport, SessionError> {
        self.ensure_board_editable()?;
        let gems_spent = self.progress.spend_gems(SHUFFLE_COST);
        self.board = self.board.shuffled(&mut self.source);
        self.chain.clear();
        self.refresh_status();
        info!(gems_spent, gems = self.progress.gems, "board shuffled");
        Ok(ShuffleReport {
            gems_spent,
            status: self.status,
        })
    }

    /// Exchanges two tiles anywhere on the board.
    pub fn swap(&mut self, a: Position, b: Position) -> Result<Status, SessionError> {
        self.ensure_board_editable()?;
        if a == b {
            return Err(SessionError::InvalidSwap(a, b));
        }
        self.board = self.board.swapped(a, b).ok_or(SessionError::InvalidSwap(a, b))?;
        self.chain.clear();
        self.refresh_status();
        info!(%a, %b, "tiles swapped");
        Ok(self.status)
    }
}
