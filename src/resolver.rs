//! Move resolution: turn a confirmed chain into a new board and a score delta.

use crate::board::{Board, EMPTY, PlacedTile, Position, SpawnRule, TileValue};
use crate::rng::TileSource;
use crate::selection::{SelectedTile, is_valid_chain, is_well_formed, longest_valid_prefix};
use thiserror::Error;

/// Commit was a no-op. The caller clears its chain either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("chain of {0} tile(s) is too short to merge")]
    UnderlengthChain(usize),
    #[error("chain of {0} tiles has no valid prefix of two or more tiles")]
    InvalidFullChain(usize),
    #[error("a {0} tile cannot be doubled")]
    ValueOverflow(TileValue),
}

/// Merge target after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedTile {
    pub position: Position,
    pub value: TileValue,
}

/// Outcome of a resolved move, with enough of a diff to animate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub board: Board,
    /// Value of the merge target before doubling.
    pub points: TileValue,
    /// Chain cells emptied by the merge, in chain order.
    pub cleared: Vec<Position>,
    pub merged: MergedTile,
    /// Cells refilled afterwards, row-major.
    pub filled: Vec<PlacedTile>,
    /// Tiles of the submitted chain that took part (less than its length when a
    /// prefix was used).
    pub consumed: usize,
}

impl Resolution {
    pub fn used_prefix(&self, submitted: usize) -> bool {
        self.consumed < submitted
    }
}

/// Applies an already-valid chain.
///
/// Every tile but the last is cleared, the last becomes twice its selected
/// value, and all emptied cells are refilled from `source`. The grammar is not
/// re-checked here; use [`commit`] for chains that may be invalid.
pub fn resolve<S: TileSource + ?Sized>(
    board: &Board,
    chain: &[SelectedTile],
    source: &mut S,
    rule: SpawnRule,
) -> Result<Resolution, ResolveError> {
    let Some((target, rest)) = chain.split_last().filter(|(_, rest)| !rest.is_empty()) else {
        return Err(ResolveError::UnderlengthChain(chain.len()));
    };
    let doubled = target
        .value
        .checked_mul(2)
        .ok_or(ResolveError::ValueOverflow(target.value))?;

    let mut next = *board;
    let cleared: Vec<Position> = rest.iter().map(|t| t.position).collect();
    for &p in &cleared {
        next.set(p, EMPTY);
    }
    let merged = MergedTile {
        position: target.position,
        value: doubled,
    };
    next.set(merged.position, merged.value);
    let filled = next.fill_empty(source, rule);

    Ok(Resolution {
        board: next,
        points: target.value,
        cleared,
        merged,
        filled,
        consumed: chain.len(),
    })
}

/// Resolves a released chain, falling back to its longest valid prefix.
///
/// A chain that skips a cell, leaves the board or repeats a position is
/// refused outright.
pub fn commit<S: TileSource + ?Sized>(
    board: &Board,
    chain: &[SelectedTile],
    source: &mut S,
    rule: SpawnRule,
) -> Result<Resolution, ResolveError> {
    if chain.len() < 2 {
        return Err(ResolveError::UnderlengthChain(chain.len()));
    }
    if !is_well_formed(chain) {
        return Err(ResolveError::InvalidFullChain(chain.len()));
    }
    let end = if is_valid_chain(chain) {
        chain.len()
    } else {
        longest_valid_prefix(chain)
    };
    if end < 2 {
        return Err(ResolveError::InvalidFullChain(chain.len()));
    }
    resolve(board, &chain[..end], source, rule)
}
