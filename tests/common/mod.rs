// Rust-upgrade (https://github.com/rust-lang/rust/issues/46379):
//   remove `#[allow(dead_code)]` before public functions.

use bughouse_review::board::Board;
use bughouse_review::coord::{Col, Coord, Row};
use bughouse_review::force::Force;
use bughouse_review::game::BughouseBoard;
use bughouse_review::grid::Grid;
use bughouse_review::merge::TurnRecord;
use bughouse_review::piece::{PieceOnBoard, PieceOrigin, piece_from_ascii};
use bughouse_review::util::as_single_char;
use enum_map::enum_map;
use itertools::Itertools;
use lazy_static::lazy_static;
use regex_lite::Regex;


#[allow(dead_code)]
pub fn init_logging() { let _ = env_logger::builder().is_test(true).try_init(); }

// Parses turn records for one board from a string like "e4@1000 e5@2000 Nf3@2500".
// White moves first, sides alternate.
#[allow(dead_code)]
pub fn records(board: BughouseBoard, log: &str) -> Vec<TurnRecord> {
    lazy_static! {
        static ref RECORD_RE: Regex = Regex::new(r"^(.+)@([0-9]+)$").unwrap();
    }
    log.split_whitespace()
        .enumerate()
        .map(|(idx, token)| {
            let captures = RECORD_RE.captures(token).unwrap();
            let ply_number = idx as u32 + 1;
            TurnRecord {
                board,
                side: if ply_number % 2 == 1 { Force::White } else { Force::Black },
                move_text: captures.get(1).unwrap().as_str().to_owned(),
                ply_number,
                timestamp_millis: captures.get(2).unwrap().as_str().parse().unwrap(),
            }
        })
        .collect()
}

// Parses a board drawn with one character per square, rank 8 first. Dots are empty squares.
// Castling is not available on such boards.
#[allow(dead_code)]
pub fn parse_board(board_str: &str, active_force: Force) -> Result<Board, String> {
    let rows = board_str
        .split('\n')
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.split_ascii_whitespace().collect_vec())
        .collect_vec();
    if rows.len() != 8 || rows.iter().any(|row| row.len() != 8) {
        return Err(format!("Expected an 8x8 board, got {:?}", rows));
    }
    let mut grid = Grid::new();
    for (row_idx, row) in rows.iter().rev().enumerate() {
        for (col_idx, piece_str) in row.iter().enumerate() {
            let piece_char =
                as_single_char(piece_str).ok_or_else(|| format!("Invalid piece: {}", piece_str))?;
            let coord = Coord::new(
                Row::from_zero_based(row_idx as i8),
                Col::from_zero_based(col_idx as i8),
            );
            grid[coord] = if piece_char == '.' {
                None
            } else {
                let (kind, force) = piece_from_ascii(piece_char)
                    .ok_or_else(|| format!("Invalid piece: {}", piece_char))?;
                Some(PieceOnBoard::new(kind, PieceOrigin::Innate, force))
            };
        }
    }
    let castling_rights = enum_map! { _ => enum_map! { _ => false } };
    Ok(Board::from_parts(grid, active_force, castling_rights, None, 1))
}


#[cfg(test)]
mod tests {
    use bughouse_review::piece::PieceKind;

    use super::*;

    #[test]
    fn parse_board_opening() {
        let board = parse_board(
            "
            r n b q k b n r
            p p p . p p p p
            . . . . . . . .
            . . . p . . . .
            . . . . P . . .
            . . . . . . . .
            P P P P . P P P
            R N B Q K B N R
            ",
            Force::White,
        )
        .unwrap();
        assert_eq!(board.grid()[Coord::E4].unwrap().kind, PieceKind::Pawn);
        assert_eq!(board.grid()[Coord::D5].unwrap().force, Force::Black);
        assert_eq!(board.grid()[Coord::E2], None);
    }

    #[test]
    fn parse_records() {
        let records = records(BughouseBoard::B, "e4@100 P@e5@250");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].side, Force::Black);
        assert_eq!(records[1].move_text, "P@e5");
        assert_eq!(records[1].timestamp_millis, 250);
    }
}
