// Rule adjudication for a single board: move/drop legality and check/mate status.
//
// Bughouse checkmate is strictly narrower than chess checkmate: a king in chess checkmate
// might still be saved by dropping a piece between the king and the checking piece. All
// functions here are total: a malformed board (e.g. without a king) never produces a mate.

use crate::algebraic::strip_check_mark;
use crate::board::{Board, Turn, TurnDrop, TurnMove, attackers, squares_between};
use crate::coord::{Coord, SubjectiveRow};
use crate::piece::PieceKind;
use crate::rules::BughouseRules;


pub fn is_legal_move(board: &Board, mv: TurnMove) -> bool { board.try_move(mv).is_ok() }

pub fn is_legal_drop(board: &Board, drop: TurnDrop, rules: &BughouseRules) -> bool {
    board.try_turn(Turn::Drop(drop), rules).is_ok()
}

// Whether the active player can make any board move. Drops are not considered.
// Castling is not considered either: it never helps out of a check.
fn has_legal_move(board: &Board) -> bool {
    let force = board.active_force();
    let last_row = SubjectiveRow::last().to_row(force);
    board.grid().pieces().filter(|(_, piece)| piece.force == force).any(|(from, piece)| {
        Coord::all().any(|to| {
            let promote_to =
                (piece.kind == PieceKind::Pawn && to.row == last_row).then_some(PieceKind::Queen);
            is_legal_move(board, TurnMove { from, to, promote_to })
        })
    })
}

// Pieces giving check to the active player's king.
pub fn checking_pieces(board: &Board) -> Vec<Coord> {
    let force = board.active_force();
    match board.grid().find_king(force) {
        Some(king_pos) => attackers(board.grid(), king_pos, force.opponent()),
        None => Vec::new(),
    }
}

pub fn is_chess_mate(board: &Board) -> bool { board.is_check() && !has_legal_move(board) }

pub fn is_bughouse_mate(board: &Board) -> bool {
    if !is_chess_mate(board) {
        return false;
    }
    let Some(king_pos) = board.grid().find_king(board.active_force()) else {
        return false;
    };
    match checking_pieces(board).as_slice() {
        [] => false,
        [attacker_pos] => {
            let Some(attacker) = board.grid()[*attacker_pos] else {
                return false;
            };
            // A drop can interpose only between a sliding piece and the king.
            !attacker.kind.is_slider() || squares_between(*attacker_pos, king_pos).is_empty()
        }
        // Double check cannot be blocked by a single drop.
        _ => true,
    }
}

pub fn check_suffix(board: &Board) -> &'static str {
    if is_bughouse_mate(board) {
        "#"
    } else if board.is_check() {
        "+"
    } else {
        ""
    }
}

// Replaces the check mark of a turn that led to `board` with the one bughouse rules imply.
// Chess notation coming from outside may claim "#" for a mate that a drop can still prevent.
pub fn normalize_suffix(notation: &str, board: &Board) -> String {
    format!("{}{}", strip_check_mark(notation), check_suffix(board))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TurnError;
    use crate::fen::fen_to_board;
    use crate::piece::PieceKind;
    use crate::rules::DropAggression;

    // Black is double checked by a rook and a knight.
    const DOUBLE_CHECK_MATE: &str = "4R2k/5Npp/8/8/8/8/8/K7 b - - 0 1";
    // Back rank mate: f8 and g8 are empty, so a drop can block.
    const BACK_RANK_MATE: &str = "4R2k/6pp/8/8/8/8/8/K7 b - - 0 1";
    const SMOTHERED_MATE: &str = "6rk/5Npp/8/8/8/8/8/K7 b - - 0 1";
    // Protected queen right next to the king.
    const ADJACENT_QUEEN_MATE: &str = "6Qk/4N1pp/8/8/8/8/8/K7 b - - 0 1";
    // Pawn on g7 guarded by the king.
    const PAWN_MATE: &str = "7k/5KPp/8/8/8/8/8/8 b - - 0 1";
    // Long diagonal from a1 with empty squares in between.
    const DIAGONAL_MATE: &str = "6bk/7p/8/8/8/8/8/B6K b - - 0 1";
    const ESCAPABLE_CHECK: &str = "4R2k/6p1/8/8/8/8/8/K7 b - - 0 1";
    const NO_CHECK: &str = "7k/6pp/8/8/8/8/8/K3R3 b - - 0 1";
    const NO_BLACK_KING: &str = "4R3/6pp/8/8/8/8/8/K7 b - - 0 1";

    fn board(fen: &str) -> Board { fen_to_board(fen).unwrap() }

    #[test]
    fn double_check_is_bughouse_mate() {
        let b = board(DOUBLE_CHECK_MATE);
        assert_eq!(checking_pieces(&b).len(), 2);
        assert!(is_chess_mate(&b));
        assert!(is_bughouse_mate(&b));
        assert_eq!(check_suffix(&b), "#");
    }

    #[test]
    fn sliding_mate_with_gap_is_not_bughouse_mate() {
        let b = board(BACK_RANK_MATE);
        assert!(is_chess_mate(&b));
        assert!(!is_bughouse_mate(&b));
        assert_eq!(check_suffix(&b), "+");
        assert_eq!(normalize_suffix("Re8#", &b), "Re8+");
    }

    #[test]
    fn non_sliding_or_adjacent_mates() {
        assert!(is_bughouse_mate(&board(SMOTHERED_MATE)));
        assert!(is_bughouse_mate(&board(ADJACENT_QUEEN_MATE)));
        assert_eq!(normalize_suffix("Nf7+", &board(SMOTHERED_MATE)), "Nf7#");
        let b = board(PAWN_MATE);
        assert!(is_chess_mate(&b));
        assert!(is_bughouse_mate(&b));
    }

    #[test]
    fn diagonal_mate_with_gap_is_not_bughouse_mate() {
        let b = board(DIAGONAL_MATE);
        assert!(is_chess_mate(&b));
        assert!(!is_bughouse_mate(&b));
        assert_eq!(check_suffix(&b), "+");
    }

    #[test]
    fn no_mate() {
        let b = board(ESCAPABLE_CHECK);
        assert!(b.is_check());
        assert!(!is_chess_mate(&b));
        assert_eq!(check_suffix(&b), "+");

        let b = board(NO_CHECK);
        assert!(!b.is_check());
        assert!(!is_chess_mate(&b));
        assert_eq!(normalize_suffix("Re1", &b), "Re1");
    }

    #[test]
    fn missing_king_is_never_mate() {
        let b = board(NO_BLACK_KING);
        assert!(!b.is_check());
        assert!(!is_chess_mate(&b));
        assert!(!is_bughouse_mate(&b));
        assert!(checking_pieces(&b).is_empty());
    }

    #[test]
    fn bughouse_mate_implies_chess_mate() {
        for fen in [
            DOUBLE_CHECK_MATE,
            BACK_RANK_MATE,
            SMOTHERED_MATE,
            ADJACENT_QUEEN_MATE,
            PAWN_MATE,
            DIAGONAL_MATE,
            ESCAPABLE_CHECK,
            NO_CHECK,
            NO_BLACK_KING,
        ] {
            let b = board(fen);
            assert!(!is_bughouse_mate(&b) || is_chess_mate(&b), "{fen}");
        }
    }

    #[test]
    fn drop_aggression() {
        let b = board("6rk/6pp/8/8/8/8/8/K7[N] w - - 0 1");
        let drop = TurnDrop { piece_kind: PieceKind::Knight, to: Coord::F7 };
        let rules_with = |drop_aggression| BughouseRules {
            drop_aggression,
            ..BughouseRules::chess_com()
        };
        assert!(is_legal_drop(&b, drop, &rules_with(DropAggression::MateAllowed)));
        for aggression in [
            DropAggression::NoCheck,
            DropAggression::NoChessMate,
            DropAggression::NoBughouseMate,
        ] {
            assert_eq!(
                b.try_turn(Turn::Drop(drop), &rules_with(aggression)).unwrap_err(),
                TurnError::DropAggression
            );
        }
        // A quiet drop is fine under any rules.
        let quiet = TurnDrop { piece_kind: PieceKind::Knight, to: Coord::C3 };
        assert!(is_legal_drop(&b, quiet, &rules_with(DropAggression::NoCheck)));
    }

    #[test]
    fn legal_moves() {
        let b = Board::new();
        assert!(is_legal_move(&b, TurnMove { from: Coord::G1, to: Coord::F3, promote_to: None }));
        assert!(!is_legal_move(&b, TurnMove { from: Coord::G1, to: Coord::E2, promote_to: None }));
    }
}
