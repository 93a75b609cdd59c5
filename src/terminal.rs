//! Terminal-state detection: is there any legal move left, and has the goal been reached.

use crate::board::{Board, Position, TileValue};

/// Forward neighbours: right, down, down-right, up-right. Together with their
/// mirror images these cover all eight directions, so each pair is seen once.
const FORWARD: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

/// First adjacent pair of equal tiles in row-major scan order.
pub fn find_equal_pair(board: &Board) -> Option<(Position, Position)> {
    let cells = board.rows();
    for p in Board::positions() {
        let v = cells[p.row][p.col];
        for (dr, dc) in FORWARD {
            if let Some(q) = p.offset(dr, dc) {
                if cells[q.row][q.col] == v {
                    return Some((p, q));
                }
            }
        }
    }
    None
}

/// True when at least one legal chain exists on `board`.
///
/// Every legal chain starts with two adjacent equal tiles, and such a pair is
/// itself a legal chain, so finding one equal adjacent pair is both necessary
/// and sufficient.
pub fn has_any_legal_move(board: &Board) -> bool {
    find_equal_pair(board).is_some()
}

/// True when some tile has reached `goal`.
pub fn is_won(board: &Board, goal: TileValue) -> bool {
    board.max_value() >= goal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BOARD_SIZE;

    fn board(rows: [[TileValue; BOARD_SIZE]; BOARD_SIZE]) -> Board {
        Board::from_rows(rows).unwrap()
    }

    /// Checkerboard-like layout where no two neighbours (diagonals included) match.
    fn stuck() -> Board {
        board([
            [2, 4, 2, 4, 2],
            [8, 16, 8, 16, 8],
            [2, 4, 2, 4, 2],
            [8, 16, 8, 16, 8],
            [2, 4, 2, 4, 2],
        ])
    }

    #[test]
    fn stuck_board_has_no_moves() {
        let b = stuck();
        assert!(!has_any_legal_move(&b));
        assert_eq!(find_equal_pair(&b), None);
    }

    #[test]
    fn detection_is_pure() {
        let b = stuck();
        assert_eq!(has_any_legal_move(&b), has_any_legal_move(&b));
        assert_eq!(b, stuck());
    }

    #[test]
    fn horizontal_pair_is_a_move() {
        let mut rows = *stuck().rows();
        rows[4][4] = 4;
        let b = board(rows);
        assert_eq!(
            find_equal_pair(&b),
            Some((Position::new(4, 3), Position::new(4, 4)))
        );
    }

    #[test]
    fn vertical_pair_is_a_move() {
        let mut rows = *stuck().rows();
        rows[1][0] = 2;
        assert!(has_any_legal_move(&board(rows)));
    }

    #[test]
    fn diagonal_pairs_are_moves_in_both_directions() {
        // down-right: (0,0) and (1,1)
        let mut rows = *stuck().rows();
        rows[1][1] = 2;
        assert!(has_any_legal_move(&board(rows)));

        // up-right: (4,0) and (3,1)
        let mut rows = *stuck().rows();
        rows[4][0] = 16;
        assert_eq!(
            find_equal_pair(&board(rows)),
            Some((Position::new(4, 0), Position::new(3, 1)))
        );
    }

    #[test]
    fn win_is_reached_at_goal() {
        let b = stuck();
        assert!(is_won(&b, 16));
        assert!(!is_won(&b, 32));
    }
}
