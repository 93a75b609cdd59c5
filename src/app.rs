//! App: reads commands, drives the session, prints the board and saves.

use crate::board::Position;
use crate::persistence::SaveStore;
use crate::rng::TileSource;
use crate::script::{Command, parse_line};
use crate::session::{Game, GameOverReason, MoveReport, SessionError, Status};
use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

pub struct App<S> {
    game: Game<S>,
    store: Option<SaveStore>,
    /// Echo each command before its output (useful when replaying a script).
    echo: bool,
}

impl<S: TileSource> App<S> {
    pub fn new(game: Game<S>, store: Option<SaveStore>) -> Self {
        Self {
            game,
            store,
            echo: false,
        }
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn game(&self) -> &Game<S> {
        &self.game
    }

    /// Runs until `quit` or end of input, then saves.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> Result<()> {
        self.print_board(&mut out)?;
        for line in input.lines() {
            let line = line?;
            if self.echo && !line.trim().is_empty() {
                writeln!(out, "> {}", line.trim())?;
            }
            let command = match parse_line(&line) {
                Ok(c) => c,
                Err(e) => {
                    writeln!(out, "? {e}")?;
                    continue;
                }
            };
            if command == Command::Quit {
                break;
            }
            if self.apply(command, &mut out)? {
                self.save();
            }
        }
        self.save();
        Ok(())
    }

    /// Returns true when the game state changed.
    fn apply<W: Write>(&mut self, command: Command, out: &mut W) -> Result<bool> {
        match command {
            Command::None | Command::Quit => Ok(false),
            Command::Show => {
                self.print_board(out)?;
                Ok(false)
            }
            Command::Cancel => {
                self.game.cancel();
                Ok(false)
            }
            Command::Chain(positions) => self.play_chain(&positions, out),
            Command::Shuffle => match self.game.shuffle() {
                Ok(r) => {
                    writeln!(out, "shuffled (-{} gems)", r.gems_spent)?;
                    self.print_board(out)?;
                    Ok(true)
                }
                Err(e) => Self::refuse(out, &e),
            },
            Command::Swap(a, b) => match self.game.swap(a, b) {
                Ok(_) => {
                    writeln!(out, "swapped {a} and {b}")?;
                    self.print_board(out)?;
                    Ok(true)
                }
                Err(e) => Self::refuse(out, &e),
            },
            Command::NextLevel => match self.game.next_level() {
                Ok(up) => {
                    writeln!(
                        out,
                        "level {} - reach {} (+{} gems)",
                        up.level, up.goal, up.bonus_gems
                    )?;
                    self.print_board(out)?;
                    Ok(true)
                }
                Err(e) => Self::refuse(out, &e),
            },
            Command::NewGame => {
                self.game.new_game();
                writeln!(out, "new game")?;
                self.print_board(out)?;
                Ok(true)
            }
        }
    }

    /// Feeds a whole gesture: first cell starts the chain, the rest extend it,
    /// then it is released. A rejected cell ends the gesture there.
    fn play_chain<W: Write>(&mut self, positions: &[Position], out: &mut W) -> Result<bool> {
        let mut cells = positions.iter().copied();
        let Some(first) = cells.next() else {
            return Ok(false);
        };
        if let Err(e) = self.game.begin(first) {
            self.game.cancel();
            return Self::refuse(out, &e);
        }
        for p in cells {
            if let Err(e) = self.game.extend(p) {
                writeln!(out, "? {e}")?;
                break;
            }
        }
        match self.game.commit() {
            Ok(report) => {
                self.print_report(&report, out)?;
                Ok(true)
            }
            Err(e) => Self::refuse(out, &e),
        }
    }

    fn refuse<W: Write>(out: &mut W, e: &SessionError) -> Result<bool> {
        debug!(error = %e, "command refused");
        writeln!(out, "? {e}")?;
        Ok(false)
    }

    fn print_report<W: Write>(&self, report: &MoveReport, out: &mut W) -> Result<()> {
        let merged = report.resolution.merged;
        write!(
            out,
            "merged into {} at {} (+{} points, +{} gems)",
            merged.value, merged.position, report.resolution.points, report.gems_earned
        )?;
        if report.used_prefix() {
            write!(
                out,
                " using {} of {} tiles",
                report.resolution.consumed, report.submitted
            )?;
        }
        writeln!(out)?;
        self.print_board(out)
    }

    fn print_board<W: Write>(&self, out: &mut W) -> Result<()> {
        let p = self.game.progress();
        write!(out, "{}", self.game.board())?;
        writeln!(
            out,
            "score {}  best {}  level {}  goal {}  gems {}",
            p.score, p.best_score, p.level, p.goal, p.gems
        )?;
        match self.game.status() {
            Status::Playing => {}
            Status::Won => writeln!(out, "goal reached! `next` to continue")?,
            Status::GameOver(GameOverReason::NoMoves) => {
                writeln!(out, "no moves left - `shuffle`, `swap` or `new`")?;
            }
            Status::GameOver(GameOverReason::MatchCap) => {
                writeln!(out, "match limit reached - `new` to play again")?;
            }
        }
        Ok(())
    }

    /// Failures are logged; the game in memory carries on regardless.
    fn save(&self) {
        let Some(store) = &self.store else { return };
        if let Err(e) = store.save(&self.game.snapshot()) {
            warn!(path = %store.path().display(), error = %e, "could not save game");
        }
    }
}
