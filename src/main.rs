//! Powermerge — chain-merging tile puzzle played from the terminal.

use anyhow::{Context, Result};
use clap::Parser;
use powermerge::app::App;
use powermerge::persistence::{self, SaveStore};
use powermerge::{Game, GameConfig, SeededSource};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = GameConfig {
        starting_gems: args.starting_gems,
        level_scaled_tiles: args.level_scaled_tiles,
        match_cap: args.match_cap,
        relaxed_selection: args.relaxed_selection,
    };
    let source = args.seed.map(SeededSource::new).unwrap_or_else(SeededSource::from_entropy);
    info!(seed = source.seed(), "tile source ready");

    let store = (!args.no_save)
        .then(|| SaveStore::new(args.save.clone().unwrap_or_else(persistence::default_path)));
    let game = open_game(config, source, store.as_ref(), args.fresh);

    let mut app = App::new(game, store).with_echo(args.script.is_some());
    let stdout = io::stdout().lock();
    match &args.script {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            app.run(BufReader::new(file), stdout)?;
        }
        None => app.run(io::stdin().lock(), stdout)?,
    }
    Ok(())
}

/// Resume the saved game unless `fresh`; a broken save starts a new game.
fn open_game(
    config: GameConfig,
    source: SeededSource,
    store: Option<&SaveStore>,
    fresh: bool,
) -> Game<SeededSource> {
    let saved = match store {
        Some(store) if !fresh => match store.load() {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable save");
                None
            }
        },
        _ => None,
    };
    match saved {
        Some(record) => {
            let progress = &record.progress;
            info!(level = progress.level, score = progress.score, "resuming saved game");
            Game::restore(config, source, record)
        }
        None => Game::new(config, source),
    }
}

/// Logs go to stderr so stdout stays the game transcript. `RUST_LOG` overrides the level.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_writer(io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Chain-merging power-of-two tile puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "powermerge",
    version,
    about = "Chain-merging tile puzzle. Link equal tiles (then tiles of double value) to merge them.",
    long_about = "Powermerge is a 5x5 merge puzzle played one command per line.\n\n\
        Link two or more adjacent equal tiles (diagonals count) to merge them into the last one, \
        which doubles. A run of at least two equal tiles may continue into tiles of double value: \
        2,2,4 merges into an 8. Reach the goal tile to finish the level.\n\n\
        COMMANDS:\n  r,c r,c ...  Select a chain and merge it     cancel      Drop the chain\n  \
        shuffle      Shuffle the board (50 gems)      swap r,c r,c  Swap two tiles\n  \
        next         Go to the next level after a win  new          New game\n  \
        show         Print the board                   quit         Save and exit"
)]
pub struct Args {
    /// Seed for tile generation. Random if not set; the seed is logged so a game can be replayed.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Read commands from this file instead of stdin.
    #[arg(long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Save file. Defaults to $XDG_CONFIG_HOME/powermerge/save.json.
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,

    /// Do not read or write a save file.
    #[arg(long)]
    pub no_save: bool,

    /// Ignore the saved game and start a new one.
    #[arg(long)]
    pub fresh: bool,

    /// Gems in the purse for a first game.
    #[arg(long, default_value = "100", value_name = "N")]
    pub starting_gems: u64,

    /// Spawn tiles above 4 on later levels (up to 2^(level+1)).
    #[arg(long)]
    pub level_scaled_tiles: bool,

    /// End the game after this many merges.
    #[arg(long, value_name = "N")]
    pub match_cap: Option<u32>,

    /// Accept any adjacent tile while selecting; on release the longest valid prefix is merged.
    #[arg(long)]
    pub relaxed_selection: bool,
}
