//! Powermerge — chain-merging power-of-two tile puzzle.
//!
//! Connect runs of equal tiles, optionally followed by runs of double value, to
//! merge them into a single tile of twice the last tile's value. The modules
//! here are the rule engine; `app` and `script` form the terminal front end.

pub mod app;
pub mod board;
pub mod config;
pub mod persistence;
pub mod progress;
pub mod resolver;
pub mod rng;
pub mod script;
pub mod selection;
pub mod session;
pub mod terminal;

pub use board::{BOARD_SIZE, Board, BoardError, Position, TileValue, are_adjacent};
pub use config::GameConfig;
pub use progress::{Progress, ProgressError};
pub use resolver::{Resolution, ResolveError, commit, resolve};
pub use rng::{ScriptedSource, SeededSource, TileSource};
pub use selection::{
    AppendError, SelectedTile, SelectionChain, is_valid_chain, is_well_formed, longest_valid_prefix,
};
pub use session::{Game, GameOverReason, MoveReport, SessionError, Status};
pub use terminal::{has_any_legal_move, is_won};
