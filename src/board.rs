//! Board model: the tile grid, positions, adjacency and tile generation.

use crate::rng::TileSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Side length of the square board.
pub const BOARD_SIZE: usize = 5;

/// Tile values are powers of two; 0 marks an empty cell mid-resolution.
pub type TileValue = u32;

/// Empty-cell sentinel. Never present on a stable board.
pub const EMPTY: TileValue = 0;

/// Chance that a freshly generated tile is a 2.
const TWO_PROBABILITY: f64 = 0.8;

/// Highest exponent a level-scaled spawn may reach (2^30 still fits in u32).
const MAX_SPAWN_EXPONENT: u32 = 30;

/// Grid coordinate, 0-indexed. `row` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    #[inline]
    pub const fn in_bounds(self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    /// Chebyshev distance of exactly 1: horizontal, vertical or diagonal neighbour.
    #[inline]
    pub fn is_adjacent(self, other: Self) -> bool {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col)) == 1
    }

    /// Neighbour at signed offset, if it lies on the board.
    pub fn offset(self, dr: isize, dc: isize) -> Option<Self> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        let p = Self::new(row, col);
        p.in_bounds().then_some(p)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// Free-function form of [`Position::is_adjacent`].
pub fn are_adjacent(a: Position, b: Position) -> bool {
    a.is_adjacent(b)
}

/// A tile written into a previously empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedTile {
    pub position: Position,
    pub value: TileValue,
}

/// How new tiles are drawn.
///
/// Baseline is 2 with probability 0.8, otherwise 4. With `level_scaled` the
/// non-2 band is split evenly over 4, 8, .., 2^(level+1), which is the
/// baseline again at level 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnRule {
    pub level: u32,
    pub level_scaled: bool,
}

impl SpawnRule {
    pub const fn baseline() -> Self {
        Self {
            level: 1,
            level_scaled: false,
        }
    }

    pub fn draw<S: TileSource + ?Sized>(&self, source: &mut S) -> TileValue {
        let u = source.next_f64();
        if u < TWO_PROBABILITY {
            return 2;
        }
        if !self.level_scaled {
            return 4;
        }
        // Exponents 2..=level+1.
        let choices = self.level.clamp(1, MAX_SPAWN_EXPONENT - 1);
        let band = (u - TWO_PROBABILITY) / (1.0 - TWO_PROBABILITY);
        let idx = ((band * f64::from(choices)) as u32).min(choices - 1);
        4 << idx
    }
}

impl Default for SpawnRule {
    fn default() -> Self {
        Self::baseline()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("tile at {row},{col} holds {value}, expected a power of two >= 2")]
    InvalidTile { row: usize, col: usize, value: TileValue },
}

type Cells = [[TileValue; BOARD_SIZE]; BOARD_SIZE];

/// Square grid of tiles. `cells[row][col]`, row 0 is the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Cells", into = "Cells")]
pub struct Board {
    cells: Cells,
}

impl Board {
    /// Fresh board for a new game or level reset.
    pub fn generate<S: TileSource + ?Sized>(source: &mut S, rule: SpawnRule) -> Self {
        let mut board = Self {
            cells: [[EMPTY; BOARD_SIZE]; BOARD_SIZE],
        };
        board.fill_empty(source, rule);
        board
    }

    /// Board from explicit rows. Every cell must be a power of two >= 2.
    pub fn from_rows(rows: Cells) -> Result<Self, BoardError> {
        for (row, cols) in rows.iter().enumerate() {
            for (col, &value) in cols.iter().enumerate() {
                if !is_tile_value(value) {
                    return Err(BoardError::InvalidTile { row, col, value });
                }
            }
        }
        Ok(Self { cells: rows })
    }

    pub fn rows(&self) -> &Cells {
        &self.cells
    }

    #[inline]
    pub fn get(&self, pos: Position) -> Option<TileValue> {
        self.cells.get(pos.row).and_then(|r| r.get(pos.col)).copied()
    }

    #[inline]
    pub(crate) fn set(&mut self, pos: Position, value: TileValue) {
        if pos.in_bounds() {
            self.cells[pos.row][pos.col] = value;
        }
    }

    /// All positions in row-major order.
    pub fn positions() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Position::new(row, col)))
    }

    /// True when no cell holds the empty sentinel.
    pub fn is_stable(&self) -> bool {
        self.cells.iter().flatten().all(|&v| v != EMPTY)
    }

    pub fn max_value(&self) -> TileValue {
        self.cells.iter().flatten().copied().max().unwrap_or(EMPTY)
    }

    /// Copy of this board with every empty cell replaced by a new tile.
    pub fn refill_empty<S: TileSource + ?Sized>(&self, source: &mut S, rule: SpawnRule) -> Self {
        let mut next = *self;
        next.fill_empty(source, rule);
        next
    }

    /// Fills empty cells in row-major order, returning what was placed.
    pub fn fill_empty<S: TileSource + ?Sized>(
        &mut self,
        source: &mut S,
        rule: SpawnRule,
    ) -> Vec<PlacedTile> {
        let mut placed = Vec::new();
        for position in Self::positions() {
            if self.cells[position.row][position.col] == EMPTY {
                let value = rule.draw(source);
                self.cells[position.row][position.col] = value;
                placed.push(PlacedTile { position, value });
            }
        }
        placed
    }

    /// Same multiset of tiles, Fisher–Yates shuffled and laid back row-major.
    pub fn shuffled<S: TileSource + ?Sized>(&self, source: &mut S) -> Self {
        let mut values: Vec<TileValue> = self.cells.iter().flatten().copied().collect();
        for i in (1..values.len()).rev() {
            let j = ((source.next_f64() * (i + 1) as f64) as usize).min(i);
            values.swap(i, j);
        }
        let mut next = *self;
        for (position, value) in Self::positions().zip(values) {
            next.set(position, value);
        }
        next
    }

    /// Copy with the values at `a` and `b` exchanged. `None` if either is off the board.
    pub fn swapped(&self, a: Position, b: Position) -> Option<Self> {
        let va = self.get(a)?;
        let vb = self.get(b)?;
        let mut next = *self;
        next.set(a, vb);
        next.set(b, va);
        Some(next)
    }
}

impl TryFrom<Cells> for Board {
    type Error = BoardError;

    fn try_from(rows: Cells) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<Board> for Cells {
    fn from(board: Board) -> Self {
        board.cells
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.max_value().to_string().len().max(2);
        for row in &self.cells {
            let line: Vec<String> = row
                .iter()
                .map(|&v| {
                    if v == EMPTY {
                        format!("{:>width$}", ".")
                    } else {
                        format!("{v:>width$}")
                    }
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

#[inline]
pub(crate) fn is_tile_value(v: TileValue) -> bool {
    v >= 2 && v.is_power_of_two()
}
