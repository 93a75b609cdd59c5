//! Text commands: one line per gesture or action.

use crate::board::Position;
use thiserror::Error;

/// Action parsed from an input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Select these cells in order, then release.
    Chain(Vec<Position>),
    Cancel,
    Shuffle,
    Swap(Position, Position),
    NextLevel,
    NewGame,
    Show,
    Quit,
    /// Blank line or comment.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected row,col but got {0:?}")]
    BadPosition(String),
    #[error("swap takes exactly two positions")]
    SwapArity,
    #[error("unknown command {0:?}")]
    Unknown(String),
}

fn parse_position(token: &str) -> Result<Position, ParseError> {
    let bad = || ParseError::BadPosition(token.to_string());
    let (r, c) = token.split_once(',').ok_or_else(bad)?;
    let row = r.trim().parse().map_err(|_| bad())?;
    let col = c.trim().parse().map_err(|_| bad())?;
    Ok(Position::new(row, col))
}

/// Map a line to a command. Supports both words and one-letter shortcuts.
pub fn parse_line(line: &str) -> Result<Command, ParseError> {
    let line = line.split('#').next().unwrap_or("").trim();
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Command::None);
    };
    match head.to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => Ok(Command::Quit),
        "c" | "cancel" => Ok(Command::Cancel),
        "s" | "shuffle" => Ok(Command::Shuffle),
        "n" | "next" => Ok(Command::NextLevel),
        "new" => Ok(Command::NewGame),
        "show" | "board" => Ok(Command::Show),
        "w" | "swap" => {
            let positions = words.map(parse_position).collect::<Result<Vec<_>, _>>()?;
            match positions.as_slice() {
                [a, b] => Ok(Command::Swap(*a, *b)),
                _ => Err(ParseError::SwapArity),
            }
        }
        _ if head.contains(',') => {
            let positions = std::iter::once(head)
                .chain(words)
                .map(parse_position)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Command::Chain(positions))
        }
        other => Err(ParseError::Unknown(other.to_string())),
    }
}
