//! End-to-end session scenarios: scoring, winning, levelling and save/restore.

use powermerge::persistence::{SaveRecord, SaveStore};
use powermerge::{
    BOARD_SIZE, Board, Game, GameConfig, GameOverReason, Position, Progress, ScriptedSource,
    SeededSource, SessionError, Status, TileValue,
};

type Rows = [[TileValue; BOARD_SIZE]; BOARD_SIZE];

fn p(row: usize, col: usize) -> Position {
    Position::new(row, col)
}

fn game_on(rows: Rows) -> Game<ScriptedSource> {
    let record = SaveRecord::new(Board::from_rows(rows).unwrap(), Progress::default());
    Game::restore(GameConfig::default(), ScriptedSource::constant(0.0), record)
}

fn play(game: &mut Game<ScriptedSource>, cells: &[(usize, usize)]) -> Result<(), SessionError> {
    let (first, rest) = cells.split_first().unwrap();
    game.begin(p(first.0, first.1))?;
    for &(r, c) in rest {
        game.extend(p(r, c))?;
    }
    game.commit().map(|_| ())
}

#[test]
fn reaching_the_goal_wins_and_next_level_doubles_it() {
    let rows = [
        [16, 16, 2, 4, 2],
        [4, 8, 4, 8, 4],
        [2, 4, 2, 4, 2],
        [8, 16, 8, 16, 8],
        [2, 4, 2, 4, 2],
    ];
    let mut game = game_on(rows);
    assert_eq!(game.status(), Status::Playing);

    play(&mut game, &[(0, 0), (0, 1)]).unwrap();
    assert_eq!(game.board().get(p(0, 1)), Some(32));
    assert_eq!(game.status(), Status::Won);

    let up = game.next_level().unwrap();
    assert_eq!((up.level, up.goal), (2, 64));
    assert_eq!(game.progress().gems, 100 + 2 + 50);
}

#[test]
fn merging_the_last_pair_ends_the_game() {
    let rows = [
        [2, 2, 32, 2, 4],
        [8, 16, 8, 16, 8],
        [2, 4, 2, 4, 2],
        [8, 16, 8, 16, 8],
        [2, 4, 2, 4, 2],
    ];
    let progress = Progress {
        goal: 128,
        ..Progress::default()
    };
    let mut game = Game::restore(
        GameConfig::default(),
        ScriptedSource::constant(0.0),
        SaveRecord::new(Board::from_rows(rows).unwrap(), progress),
    );
    assert_eq!(game.status(), Status::Playing);

    play(&mut game, &[(0, 0), (0, 1)]).unwrap();
    assert_eq!(game.status(), Status::GameOver(GameOverReason::NoMoves));
    assert!(matches!(
        play(&mut game, &[(0, 0), (1, 0)]),
        Err(SessionError::NotPlaying(_))
    ));

    // a shuffle is still allowed and costs gems
    let report = game.shuffle().unwrap();
    assert_eq!(report.gems_spent, 50);
}

#[test]
fn save_and_restore_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = SaveStore::new(dir.path().join("nested").join("save.json"));

    let mut game = Game::new(GameConfig::default(), SeededSource::new(11));
    // play whatever pair the board offers
    let pair = Board::positions()
        .flat_map(|a| Board::positions().map(move |b| (a, b)))
        .find(|&(a, b)| a.is_adjacent(b) && game.board().get(a) == game.board().get(b));
    if let Some((a, b)) = pair {
        game.begin(a).unwrap();
        game.extend(b).unwrap();
        game.commit().unwrap();
    }

    let record = game.snapshot();
    store.save(&record).unwrap();
    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded, record);

    let resumed = Game::restore(GameConfig::default(), SeededSource::new(12), loaded);
    assert_eq!(resumed.board(), game.board());
    assert_eq!(resumed.progress(), game.progress());
    assert_eq!(resumed.status(), game.status());
}

#[test]
fn same_seed_replays_the_same_game() {
    let a = Game::new(GameConfig::default(), SeededSource::new(2024));
    let b = Game::new(GameConfig::default(), SeededSource::new(2024));
    assert_eq!(a.board(), b.board());
}
