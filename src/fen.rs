// Differences from classic FEN notation:
//   - A tilde is added after promoted pieces (BPGN standard).
//   - Halfmove clock is always set to 0 and ignored when reading: we don't use the fifty-move rule.
//   - If not empty, reserve is listed in square brackets after the position (like Fairy-Stockfish).

use enum_map::enum_map;
use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::board::{Board, CastlingRights};
use crate::coord::{Col, Coord, Row};
use crate::force::Force;
use crate::grid::Grid;
use crate::once_cell_regex;
use crate::piece::{
    CastleDirection, PieceKind, PieceOnBoard, PieceOrigin, piece_from_ascii, piece_to_ascii,
};
use crate::util::as_single_char;


fn force_to_fen(force: Force) -> char {
    match force {
        Force::White => 'w',
        Force::Black => 'b',
    }
}
fn force_from_fen(s: &str) -> Result<Force, String> {
    match as_single_char(s) {
        Some('w') => Ok(Force::White),
        Some('b') => Ok(Force::Black),
        _ => Err(format!("invalid force: {}", s)),
    }
}

fn castling_char(force: Force, dir: CastleDirection) -> char {
    let ch = match dir {
        CastleDirection::ASide => 'q',
        CastleDirection::HSide => 'k',
    };
    match force {
        Force::White => ch.to_ascii_uppercase(),
        Force::Black => ch,
    }
}

fn castling_rights_to_fen(castling_rights: &CastlingRights) -> String {
    // Standard order is "KQkq".
    let mut s = String::new();
    for force in Force::iter() {
        for dir in [CastleDirection::HSide, CastleDirection::ASide] {
            if castling_rights[force][dir] {
                s.push(castling_char(force, dir));
            }
        }
    }
    if s.is_empty() { "-".to_owned() } else { s }
}
fn castling_rights_from_fen(s: &str) -> Result<CastlingRights, String> {
    let mut castling_rights = enum_map! { _ => enum_map! { _ => false } };
    if s == "-" {
        return Ok(castling_rights);
    }
    for ch in s.chars() {
        let (force, dir) = Force::iter()
            .cartesian_product(CastleDirection::iter())
            .find(|&(force, dir)| castling_char(force, dir) == ch)
            .ok_or_else(|| format!("invalid castling rights: {}", s))?;
        castling_rights[force][dir] = true;
    }
    Ok(castling_rights)
}

fn en_passant_target_to_fen(en_passant_target: Option<Coord>) -> String {
    match en_passant_target {
        None => "-".to_owned(),
        Some(pos) => pos.to_algebraic(),
    }
}
fn en_passant_target_from_fen(s: &str) -> Result<Option<Coord>, String> {
    if s == "-" {
        Ok(None)
    } else {
        let pos =
            Coord::from_algebraic(s).ok_or_else(|| format!("invalid en passant target: {}", s))?;
        Ok(Some(pos))
    }
}

fn grid_to_fen(grid: &Grid) -> String {
    Row::all()
        .rev()
        .map(|row| {
            let mut row_notation = String::new();
            let mut empty_col_count: u8 = 0;
            for col in Col::all() {
                if let Some(piece) = grid[Coord::new(row, col)] {
                    if empty_col_count > 0 {
                        row_notation.push_str(&empty_col_count.to_string());
                        empty_col_count = 0;
                    }
                    row_notation.push(piece_to_ascii(piece.kind, piece.force));
                    if piece.origin == PieceOrigin::Promoted {
                        // https://bughousedb.com/Lieven_BPGN_Standard.txt, section 3.2.
                        row_notation.push('~');
                    }
                } else {
                    empty_col_count += 1;
                }
            }
            if empty_col_count > 0 {
                row_notation.push_str(&empty_col_count.to_string());
            }
            row_notation
        })
        .join("/")
}

fn grid_from_fen(s: &str) -> Result<Grid, String> {
    let rows = s.split('/').collect_vec();
    if rows.len() != Row::all().count() {
        return Err(format!("expected 8 rows, got {}", rows.len()));
    }
    let mut grid = Grid::new();
    for (row, row_notation) in Row::all().rev().zip(rows) {
        let mut cols = Col::all();
        let mut last_piece_pos = None;
        for ch in row_notation.chars() {
            if ch == '~' {
                let pos = last_piece_pos.ok_or_else(|| format!("misplaced '~' in {}", row_notation))?;
                let piece: &mut Option<PieceOnBoard> = &mut grid[pos];
                if let Some(piece) = piece {
                    piece.origin = PieceOrigin::Promoted;
                }
            } else if let Some(n) = ch.to_digit(10) {
                for _ in 0..n {
                    cols.next().ok_or_else(|| format!("row too long: {}", row_notation))?;
                }
                last_piece_pos = None;
            } else {
                let (kind, force) =
                    piece_from_ascii(ch).ok_or_else(|| format!("invalid piece: {}", ch))?;
                let col = cols.next().ok_or_else(|| format!("row too long: {}", row_notation))?;
                let pos = Coord::new(row, col);
                grid[pos] = Some(PieceOnBoard::new(kind, PieceOrigin::Innate, force));
                last_piece_pos = Some(pos);
            }
        }
        if cols.next().is_some() {
            return Err(format!("row too short: {}", row_notation));
        }
    }
    Ok(grid)
}

pub fn board_to_fen(board: &Board) -> String {
    let half_turn_clock = 0; // we don't use the fifty-move rule

    let mut reserve_notation = Force::iter()
        .map(|force| {
            board
                .reserve(force)
                .iter()
                .map(|(piece_kind, &count)| {
                    String::from(piece_to_ascii(piece_kind, force)).repeat(count.into())
                })
                .join("")
        })
        .join("");
    if !reserve_notation.is_empty() {
        reserve_notation = format!("[{}]", reserve_notation);
    }

    format!(
        "{}{} {} {} {} {} {}",
        grid_to_fen(board.grid()),
        reserve_notation,
        force_to_fen(board.active_force()),
        castling_rights_to_fen(board.castling_rights()),
        en_passant_target_to_fen(board.en_passant_target()),
        half_turn_clock,
        board.full_turn_index(),
    )
}

pub fn fen_to_board(fen: &str) -> Result<Board, String> {
    let reserve_re = once_cell_regex!(r"^(.*)\[(.*)\]$");
    let (position_notation, active_force, castling, en_passant, _half_turn_clock, full_turn_index) =
        fen.split_whitespace()
            .collect_tuple()
            .ok_or_else(|| format!("expected 6 FEN fields: {}", fen))?;
    let (grid_notation, reserve_notation) = match reserve_re.captures(position_notation) {
        Some(cap) => (cap.get(1).map_or("", |m| m.as_str()), cap.get(2).map_or("", |m| m.as_str())),
        None => (position_notation, ""),
    };
    let full_turn_index = full_turn_index
        .parse::<u32>()
        .map_err(|_| format!("invalid turn index: {}", full_turn_index))?;
    let mut board = Board::from_parts(
        grid_from_fen(grid_notation)?,
        force_from_fen(active_force)?,
        castling_rights_from_fen(castling)?,
        en_passant_target_from_fen(en_passant)?,
        full_turn_index,
    );
    for ch in reserve_notation.chars() {
        let (kind, force) = piece_from_ascii(ch)
            .filter(|(kind, _)| *kind != PieceKind::King)
            .ok_or_else(|| format!("invalid reserve piece: {}", ch))?;
        let count = &mut board.reserve_mut(force)[kind];
        *count = count.checked_add(1).ok_or_else(|| format!("too many reserve pieces: {}", ch))?;
    }
    Ok(board)
}
