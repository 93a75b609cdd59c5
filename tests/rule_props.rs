//! Property tests for the merge rules: chain grammar, resolution and move detection.
//!
//! Increase cases locally with: PROPTEST_CASES=1000 cargo test --test rule_props

use std::env;

use powermerge::board::{PlacedTile, SpawnRule};
use powermerge::selection::runs;
use powermerge::{
    BOARD_SIZE, Board, Position, ScriptedSource, SeededSource, SelectedTile, SelectionChain,
    TileValue, are_adjacent, commit, has_any_legal_move, is_valid_chain, longest_valid_prefix,
    resolve,
};
use proptest::prelude::*;

fn proptest_config() -> ProptestConfig {
    let cases = env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(128);

    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}

fn position() -> impl Strategy<Value = Position> {
    (0..BOARD_SIZE, 0..BOARD_SIZE).prop_map(|(r, c)| Position::new(r, c))
}

fn tile_value() -> impl Strategy<Value = TileValue> {
    (1u32..=6).prop_map(|e| 1 << e)
}

fn board() -> impl Strategy<Value = Board> {
    let rule = SpawnRule {
        level: 6,
        level_scaled: true,
    };
    any::<u64>().prop_map(move |seed| Board::generate(&mut SeededSource::new(seed), rule))
}

/// Row-major snake so consecutive cells are always adjacent.
fn snake(i: usize) -> Position {
    let row = i / BOARD_SIZE;
    let col = if row % 2 == 0 { i % BOARD_SIZE } else { BOARD_SIZE - 1 - i % BOARD_SIZE };
    Position::new(row, col)
}

fn along_snake(values: &[TileValue]) -> Vec<SelectedTile> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| SelectedTile::new(snake(i), v))
        .collect()
}

/// Independent oracle: walk the chain keeping (current value, run length).
fn oracle_valid(values: &[TileValue]) -> bool {
    if values.len() < 2 {
        return false;
    }
    let mut cur = values[0];
    let mut len = 1;
    for &v in &values[1..] {
        if v == cur {
            len += 1;
        } else if v == cur * 2 && len >= 2 {
            cur = v;
            len = 1;
        } else {
            return false;
        }
    }
    true
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn adjacency_is_symmetric(a in position(), b in position()) {
        prop_assert_eq!(are_adjacent(a, b), are_adjacent(b, a));
        prop_assert!(!are_adjacent(a, a));
    }

    #[test]
    fn equal_chains_are_valid(v in tile_value(), len in 2usize..=BOARD_SIZE * BOARD_SIZE) {
        let values = vec![v; len];
        prop_assert!(is_valid_chain(&along_snake(&values)));
    }

    #[test]
    fn grammar_matches_oracle(values in prop::collection::vec(tile_value(), 0..12)) {
        let chain = along_snake(&values);
        prop_assert_eq!(is_valid_chain(&chain), oracle_valid(&values));
    }

    #[test]
    fn runs_partition_the_chain(values in prop::collection::vec(tile_value(), 0..12)) {
        let rs = runs(&along_snake(&values));
        prop_assert_eq!(rs.iter().map(|r| r.len).sum::<usize>(), values.len());
        for w in rs.windows(2) {
            prop_assert_ne!(w[0].value, w[1].value);
        }
    }

    #[test]
    fn longest_prefix_is_valid_and_maximal(values in prop::collection::vec(tile_value(), 0..12)) {
        let chain = along_snake(&values);
        let end = longest_valid_prefix(&chain);
        if end > 0 {
            prop_assert!(is_valid_chain(&chain[..end]));
        }
        for longer in (end + 1).max(2)..=chain.len() {
            prop_assert!(!is_valid_chain(&chain[..longer]));
        }
    }

    #[test]
    fn incremental_chain_is_always_valid_once_two_long(values in prop::collection::vec(tile_value(), 1..12)) {
        let mut chain = SelectionChain::new();
        for t in along_snake(&values) {
            if chain.try_push(t).is_err() {
                break;
            }
        }
        if chain.len() >= 2 {
            prop_assert!(chain.is_valid());
        }
    }

    #[test]
    fn resolve_invariants(b in board(), start in 0usize..20, len in 2usize..6, seed in any::<u64>()) {
        // Equal-valued chain along the snake, using the value of its last cell.
        let cells: Vec<Position> = (start..start + len).map(snake).collect();
        let v = b.get(*cells.last().unwrap()).unwrap();
        let chain: Vec<SelectedTile> = cells.iter().map(|&p| SelectedTile::new(p, v)).collect();

        let r = resolve(&b, &chain, &mut SeededSource::new(seed), SpawnRule::baseline()).unwrap();
        let target = chain.last().unwrap();
        prop_assert_eq!(r.points, target.value);
        prop_assert_eq!(r.board.get(target.position), Some(target.value * 2));
        prop_assert!(r.board.is_stable());
        for t in &chain[..chain.len() - 1] {
            let now = r.board.get(t.position).unwrap();
            prop_assert!(now == 2 || now == 4);
        }
        let refilled: Vec<Position> = r.filled.iter().map(|f: &PlacedTile| f.position).collect();
        let mut cleared = r.cleared.clone();
        cleared.sort();
        prop_assert_eq!(refilled, cleared);
        // everything off the chain is untouched
        for p in Board::positions() {
            if !cells.contains(&p) {
                prop_assert_eq!(r.board.get(p), b.get(p));
            }
        }
    }

    #[test]
    fn commit_never_changes_board_on_rejection(b in board(), values in prop::collection::vec(tile_value(), 0..6)) {
        let chain = along_snake(&values);
        let mut src = ScriptedSource::constant(0.0);
        match commit(&b, &chain, &mut src, SpawnRule::baseline()) {
            Ok(r) => {
                prop_assert!(r.consumed >= 2);
                prop_assert_eq!(r.consumed, longest_valid_prefix(&chain));
            }
            Err(_) => {
                prop_assert_eq!(src.consumed(), 0);
                prop_assert!(longest_valid_prefix(&chain) < 2);
            }
        }
    }

    #[test]
    fn move_detection_is_pure_and_agrees_with_brute_force(b in board()) {
        let first = has_any_legal_move(&b);
        prop_assert_eq!(first, has_any_legal_move(&b));

        let brute = Board::positions().any(|p| {
            Board::positions().any(|q| p.is_adjacent(q) && b.get(p) == b.get(q))
        });
        prop_assert_eq!(first, brute);
    }
}
