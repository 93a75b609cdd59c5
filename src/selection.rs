//! Selection chains and the run-then-double grammar.
//!
//! A chain splits into maximal runs of equal values. It is a legal merge when
//! it holds at least two tiles and every run after the first is exactly double
//! the previous run, with that previous run at least two tiles long.

use crate::board::{Board, Position, TileValue};
use thiserror::Error;

/// A position together with the value it held when it was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedTile {
    pub position: Position,
    pub value: TileValue,
}

impl SelectedTile {
    pub const fn new(position: Position, value: TileValue) -> Self {
        Self { position, value }
    }

    /// Snapshot of `position` on `board`, if it is on the board.
    pub fn at(board: &Board, position: Position) -> Option<Self> {
        board.get(position).map(|value| Self { position, value })
    }
}

/// Why an append was refused. The chain is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppendError {
    #[error("position {0} is outside the board")]
    OutOfBounds(Position),
    #[error("position {0} is already in the chain")]
    DuplicatePosition(Position),
    #[error("position {0} is not adjacent to the end of the chain")]
    NonAdjacentAppend(Position),
    #[error("cannot follow a run of {run_len} x {run_value} with {value}")]
    IllegalValueTransition {
        run_value: TileValue,
        run_len: usize,
        value: TileValue,
    },
}

/// One maximal group of equal consecutive values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub value: TileValue,
    pub len: usize,
}

/// Splits a chain into maximal runs of equal values.
pub fn runs(tiles: &[SelectedTile]) -> Vec<Run> {
    let mut out: Vec<Run> = Vec::new();
    for t in tiles {
        match out.last_mut() {
            Some(run) if run.value == t.value => run.len += 1,
            _ => out.push(Run { value: t.value, len: 1 }),
        }
    }
    out
}

/// Whether `next` may follow a chain whose last run is `last`.
fn may_follow(last: Run, next: TileValue) -> bool {
    next == last.value || (last.len >= 2 && last.value.checked_mul(2) == Some(next))
}

/// Grammar check over values only. Chains shorter than two tiles are never valid.
pub fn is_valid_chain(tiles: &[SelectedTile]) -> bool {
    if tiles.len() < 2 {
        return false;
    }
    let runs = runs(tiles);
    runs.windows(2)
        .all(|w| w[0].len >= 2 && w[0].value.checked_mul(2) == Some(w[1].value))
}

/// Shape check over positions only: every tile on the board, no cell twice,
/// each tile adjacent to the one before it.
pub fn is_well_formed(tiles: &[SelectedTile]) -> bool {
    tiles.iter().enumerate().all(|(i, t)| {
        t.position.in_bounds() && !tiles[..i].iter().any(|s| s.position == t.position)
    }) && tiles
        .windows(2)
        .all(|w| w[0].position.is_adjacent(w[1].position))
}

/// Length of the longest prefix (from index 0) that is a valid chain, or 0.
pub fn longest_valid_prefix(tiles: &[SelectedTile]) -> usize {
    (2..=tiles.len())
        .rev()
        .find(|&end| is_valid_chain(&tiles[..end]))
        .unwrap_or(0)
}

/// Ordered selection being built by the input layer.
///
/// Appends always enforce bounds, uniqueness and adjacency. The value grammar
/// is enforced by [`try_push`](Self::try_push) and skipped by
/// [`try_push_relaxed`](Self::try_push_relaxed), in which case a commit falls
/// back to the longest valid prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionChain {
    tiles: Vec<SelectedTile>,
}

impl SelectionChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tiles(&self) -> &[SelectedTile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn last(&self) -> Option<&SelectedTile> {
        self.tiles.last()
    }

    pub fn contains(&self, position: Position) -> bool {
        self.tiles.iter().any(|t| t.position == position)
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    /// The run the chain currently ends in.
    pub fn current_run(&self) -> Option<Run> {
        let last = self.tiles.last()?;
        let len = self
            .tiles
            .iter()
            .rev()
            .take_while(|t| t.value == last.value)
            .count();
        Some(Run { value: last.value, len })
    }

    pub fn is_valid(&self) -> bool {
        is_valid_chain(&self.tiles)
    }

    /// Appends `tile` if it keeps the chain on track to a legal merge.
    pub fn try_push(&mut self, tile: SelectedTile) -> Result<(), AppendError> {
        self.check_structure(tile.position)?;
        if let Some(run) = self.current_run() {
            if !may_follow(run, tile.value) {
                return Err(AppendError::IllegalValueTransition {
                    run_value: run.value,
                    run_len: run.len,
                    value: tile.value,
                });
            }
        }
        self.tiles.push(tile);
        Ok(())
    }

    /// Appends `tile` checking only bounds, uniqueness and adjacency.
    pub fn try_push_relaxed(&mut self, tile: SelectedTile) -> Result<(), AppendError> {
        self.check_structure(tile.position)?;
        self.tiles.push(tile);
        Ok(())
    }

    fn check_structure(&self, position: Position) -> Result<(), AppendError> {
        if !position.in_bounds() {
            return Err(AppendError::OutOfBounds(position));
        }
        if self.contains(position) {
            return Err(AppendError::DuplicatePosition(position));
        }
        match self.tiles.last() {
            Some(last) if !last.position.is_adjacent(position) => {
                Err(AppendError::NonAdjacentAppend(position))
            }
            _ => Ok(()),
        }
    }
}
