// Improvement potential. Chess draws: stalemate, threefold repetition, fifty-move rule. Not needed
//   for reviewing finished games, but would be nice to display.

use enum_map::{EnumMap, enum_map};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::adjudication::{is_bughouse_mate, is_chess_mate};
use crate::algebraic::{AlgebraicDrop, AlgebraicMove, AlgebraicTurn};
use crate::coord::{Col, Coord, SubjectiveRow};
use crate::force::Force;
use crate::grid::Grid;
use crate::piece::{CastleDirection, PieceKind, PieceOnBoard, PieceOrigin};
use crate::rules::{BughouseRules, DropAggression};
use crate::util::sort_two;


pub type Reserve = EnumMap<PieceKind, u8>;
pub type CastlingRights = EnumMap<Force, EnumMap<CastleDirection, bool>>;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TurnMove {
    pub from: Coord,
    pub to: Coord,
    pub promote_to: Option<PieceKind>,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TurnDrop {
    pub piece_kind: PieceKind,
    pub to: Coord,
}

// Castling is represented as a king move by two files, e.g. "e1g1".
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Turn {
    Move(TurnMove),
    Drop(TurnDrop),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum TurnError {
    InvalidNotation,
    AmbiguousNotation,
    CaptureNotationRequiresCapture,
    PieceMissing,
    WrongTurnOrder,
    ImpossibleTrajectory,
    PathBlocked,
    UnprotectedKing,
    CastlingPieceHasMoved,
    BadPromotion,
    DropForbidden,
    DropPieceMissing,
    DropPosition,
    DropBlocked,
    DropAggression,
    GameOver,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Capture {
    pub piece_kind: PieceKind,
    pub force: Force, // force of the captured piece
}

#[derive(Clone, Debug)]
pub struct TurnOutcome {
    pub board: Board,
    pub capture: Option<Capture>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ProtoReachability {
    Ok,
    OkIfCapturing,
    OkIfNonCapturing,
    Blocked,
    Impossible,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Reachability {
    Ok,
    Blocked,
    Impossible,
}

impl Reachability {
    pub fn ok(self) -> bool { self == Reachability::Ok }
}

impl TurnError {
    pub fn description(self) -> &'static str {
        use TurnError::*;
        match self {
            InvalidNotation => "invalid notation",
            AmbiguousNotation => "ambiguous notation",
            CaptureNotationRequiresCapture => "capture notation requires capture",
            PieceMissing => "there is no piece on the starting square",
            WrongTurnOrder => "it is not this player's turn",
            ImpossibleTrajectory => "the piece cannot move this way",
            PathBlocked => "the path is blocked",
            UnprotectedKing => "the king would be left in check",
            CastlingPieceHasMoved => "king or rook has already moved",
            BadPromotion => "bad promotion",
            DropForbidden => "this piece cannot be dropped",
            DropPieceMissing => "the piece is not in reserve",
            DropPosition => "a pawn cannot be dropped on this rank",
            DropBlocked => "the square is occupied",
            DropAggression => "the drop is too aggressive for the current rules",
            GameOver => "the game is over",
        }
    }
}

// Squares strictly between `from` and `to` if they share a row, a column or a diagonal.
// Empty otherwise.
pub fn squares_between(from: Coord, to: Coord) -> Vec<Coord> {
    let (d_row, d_col) = to - from;
    let is_straight = d_row == 0 || d_col == 0;
    let is_diagonal = d_row.abs() == d_col.abs();
    if from == to || !(is_straight || is_diagonal) {
        return Vec::new();
    }
    let direction = (d_row.signum(), d_col.signum());
    let mut squares = Vec::new();
    let mut pos = from.offset(direction);
    while let Some(p) = pos {
        if p == to {
            break;
        }
        squares.push(p);
        pos = p.offset(direction);
    }
    squares
}

fn should_promote(force: Force, piece_kind: PieceKind, to: Coord) -> bool {
    piece_kind == PieceKind::Pawn && to.row == SubjectiveRow::last().to_row(force)
}

pub(crate) fn get_capture(
    grid: &Grid, from: Coord, to: Coord, en_passant_target: Option<Coord>,
) -> Option<Coord> {
    let piece = grid[from]?;
    if let Some(target_piece) = grid[to] {
        if target_piece.force == piece.force { None } else { Some(to) }
    } else if piece.kind == PieceKind::Pawn && Some(to) == en_passant_target {
        let captured_pos = Coord::new(from.row, to.col);
        match grid[captured_pos] {
            Some(captured) if captured.kind == PieceKind::Pawn && captured.force != piece.force => {
                Some(captured_pos)
            }
            _ => None,
        }
    } else {
        None
    }
}

pub(crate) fn reachability(grid: &Grid, from: Coord, to: Coord, capturing: bool) -> Reachability {
    use ProtoReachability::*;
    match proto_reachability(grid, from, to) {
        Ok => Reachability::Ok,
        OkIfCapturing => {
            if capturing { Reachability::Ok } else { Reachability::Blocked }
        }
        OkIfNonCapturing => {
            if !capturing { Reachability::Ok } else { Reachability::Blocked }
        }
        Blocked => Reachability::Blocked,
        Impossible => Reachability::Impossible,
    }
}

// Tests that the piece can move in such a way and that the path is free.
// Does not support castling.
fn proto_reachability(grid: &Grid, from: Coord, to: Coord) -> ProtoReachability {
    use ProtoReachability::*;
    let proto = proto_reachability_modulo_destination_square(grid, from, to);
    match proto {
        Blocked | Impossible => proto,
        Ok | OkIfCapturing | OkIfNonCapturing => {
            if let (Some(piece), Some(mover)) = (grid[to], grid[from]) {
                if piece.force == mover.force {
                    return Blocked;
                }
            }
            proto
        }
    }
}

fn proto_reachability_modulo_destination_square(
    grid: &Grid, from: Coord, to: Coord,
) -> ProtoReachability {
    use ProtoReachability::*;
    if to == from {
        return Impossible;
    }
    let Some(piece) = grid[from] else {
        return Impossible;
    };
    let force = piece.force;

    let (d_row, d_col) = to - from;
    let is_straight_move = d_row == 0 || d_col == 0;
    let is_diagonal_move = d_row.abs() == d_col.abs();
    // Tests that squares between `from` (exclusive) and `to` (exclusive) are free.
    let has_linear_passage = || squares_between(from, to).into_iter().all(|pos| grid[pos].is_none());
    let simple_linear_passage = || {
        if has_linear_passage() { Ok } else { Blocked }
    };

    match piece.kind {
        PieceKind::Pawn => {
            let dir_forward = force.direction_forward();
            let second_row = SubjectiveRow::from_one_based(2).to_row(force);
            let valid_capturing_move = d_col.abs() == 1 && d_row == dir_forward;
            let valid_non_capturing_move = d_col == 0
                && (d_row == dir_forward || (from.row == second_row && d_row == dir_forward * 2));
            if valid_capturing_move {
                OkIfCapturing
            } else if valid_non_capturing_move {
                if has_linear_passage() { OkIfNonCapturing } else { Blocked }
            } else {
                Impossible
            }
        }
        PieceKind::Knight => {
            if sort_two((d_row.abs(), d_col.abs())) == (1, 2) { Ok } else { Impossible }
        }
        PieceKind::Bishop => {
            if is_diagonal_move { simple_linear_passage() } else { Impossible }
        }
        PieceKind::Rook => {
            if is_straight_move { simple_linear_passage() } else { Impossible }
        }
        PieceKind::Queen => {
            if is_straight_move || is_diagonal_move { simple_linear_passage() } else { Impossible }
        }
        PieceKind::King => {
            if d_row.abs() <= 1 && d_col.abs() <= 1 { Ok } else { Impossible }
        }
    }
}

// All pieces of `attacker` force that attack the given square.
pub fn attackers(grid: &Grid, pos: Coord, attacker: Force) -> Vec<Coord> {
    grid.pieces()
        .filter(|(from, piece)| piece.force == attacker && reachability(grid, *from, pos, true).ok())
        .map(|(from, _)| from)
        .collect()
}

pub fn is_attacked(grid: &Grid, pos: Coord, attacker: Force) -> bool {
    grid.pieces()
        .any(|(from, piece)| piece.force == attacker && reachability(grid, from, pos, true).ok())
}

fn king_is_safe(grid: &Grid, force: Force) -> bool {
    match grid.find_king(force) {
        Some(king_pos) => !is_attacked(grid, king_pos, force.opponent()),
        // Malformed position: nothing to protect.
        None => true,
    }
}

fn castling_rook_col(dir: CastleDirection) -> Col {
    match dir {
        CastleDirection::ASide => Col::A,
        CastleDirection::HSide => Col::H,
    }
}

// Castling rights are lost as soon as anything moves from or to the king or rook home squares.
fn update_castling_rights(castling_rights: &mut CastlingRights, touched: Coord) {
    for force in Force::iter() {
        let row = SubjectiveRow::first().to_row(force);
        if touched == Coord::new(row, Col::E) {
            castling_rights[force] = enum_map! { _ => false };
        }
        for dir in CastleDirection::iter() {
            if touched == Coord::new(row, castling_rook_col(dir)) {
                castling_rights[force][dir] = false;
            }
        }
    }
}


// Position on a single board, plus pieces in reserve for the two players of this board.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Board {
    grid: Grid,
    active_force: Force,
    castling_rights: CastlingRights,
    en_passant_target: Option<Coord>,
    full_turn_index: u32,
    reserves: EnumMap<Force, Reserve>,
}

impl Board {
    pub fn new() -> Self {
        use PieceKind::*;
        let mut grid = Grid::new();
        let back_row = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        for force in Force::iter() {
            let first_row = SubjectiveRow::first().to_row(force);
            let pawn_row = SubjectiveRow::from_one_based(2).to_row(force);
            for (col, kind) in Col::all().zip(back_row) {
                grid[Coord::new(first_row, col)] =
                    Some(PieceOnBoard::new(kind, PieceOrigin::Innate, force));
                grid[Coord::new(pawn_row, col)] =
                    Some(PieceOnBoard::new(Pawn, PieceOrigin::Innate, force));
            }
        }
        Self::from_parts(grid, Force::White, enum_map! { _ => enum_map! { _ => true } }, None, 1)
    }

    pub fn from_parts(
        grid: Grid, active_force: Force, castling_rights: CastlingRights,
        en_passant_target: Option<Coord>, full_turn_index: u32,
    ) -> Self {
        Board {
            grid,
            active_force,
            castling_rights,
            en_passant_target,
            full_turn_index,
            reserves: enum_map! { _ => enum_map! { _ => 0 } },
        }
    }

    pub fn grid(&self) -> &Grid { &self.grid }
    pub fn active_force(&self) -> Force { self.active_force }
    pub fn castling_rights(&self) -> &CastlingRights { &self.castling_rights }
    pub fn en_passant_target(&self) -> Option<Coord> { self.en_passant_target }
    pub fn full_turn_index(&self) -> u32 { self.full_turn_index }
    pub fn reserve(&self, force: Force) -> &Reserve { &self.reserves[force] }
    pub fn reserve_mut(&mut self, force: Force) -> &mut Reserve { &mut self.reserves[force] }
    pub fn reserves(&self) -> &EnumMap<Force, Reserve> { &self.reserves }

    // Whether the active player's king is attacked.
    pub fn is_check(&self) -> bool { !king_is_safe(&self.grid, self.active_force) }

    pub fn receive_capture(&mut self, capture: &Capture) {
        self.reserves[capture.force][capture.piece_kind] += 1;
    }

    // Turn application is split into two phases:
    //   - First, check turn validity and determine the outcome (does not change the board,
    //     can fail if the turn is invalid).
    //   - Second, the caller commits the outcome (cannot fail).
    // `self` is never modified, so a failed turn leaves no trace.
    pub fn try_turn(&self, turn: Turn, rules: &BughouseRules) -> Result<TurnOutcome, TurnError> {
        match turn {
            Turn::Move(mv) => self.try_move(mv),
            Turn::Drop(drop) => self.try_drop(drop, rules),
        }
    }

    pub(crate) fn try_move(&self, mv: TurnMove) -> Result<TurnOutcome, TurnError> {
        let force = self.active_force;
        let piece = self.grid[mv.from].ok_or(TurnError::PieceMissing)?;
        if piece.force != force {
            return Err(TurnError::WrongTurnOrder);
        }
        if let Some(dir) = self.castling_direction(mv) {
            return self.try_castle(mv, dir);
        }

        let capture_pos = get_capture(&self.grid, mv.from, mv.to, self.en_passant_target);
        match reachability(&self.grid, mv.from, mv.to, capture_pos.is_some()) {
            Reachability::Ok => {}
            Reachability::Blocked => return Err(TurnError::PathBlocked),
            Reachability::Impossible => return Err(TurnError::ImpossibleTrajectory),
        }

        let mut new_grid = self.grid.clone();
        new_grid[mv.from] = None;
        let mut capture = None;
        if let Some(capture_pos) = capture_pos {
            if let Some(captured_piece) = new_grid[capture_pos].take() {
                capture = Some(Capture {
                    piece_kind: captured_piece.kind_in_reserve(),
                    force: captured_piece.force,
                });
            }
        }
        new_grid[mv.to] = Some(match (should_promote(force, piece.kind, mv.to), mv.promote_to) {
            (true, Some(promote_to)) if promote_to.can_promote_to() => {
                PieceOnBoard::new(promote_to, PieceOrigin::Promoted, force)
            }
            (false, None) => piece,
            _ => return Err(TurnError::BadPromotion),
        });
        if !king_is_safe(&new_grid, force) {
            return Err(TurnError::UnprotectedKing);
        }

        let mut castling_rights = self.castling_rights;
        update_castling_rights(&mut castling_rights, mv.from);
        update_castling_rights(&mut castling_rights, mv.to);
        let en_passant_target = if piece.kind == PieceKind::Pawn && (mv.to - mv.from).0.abs() == 2 {
            mv.from.offset((force.direction_forward(), 0))
        } else {
            None
        };
        let board = self.next_board(new_grid, castling_rights, en_passant_target, self.reserves);
        Ok(TurnOutcome { board, capture })
    }

    fn castling_direction(&self, mv: TurnMove) -> Option<CastleDirection> {
        let piece = self.grid[mv.from]?;
        let (d_row, d_col) = mv.to - mv.from;
        let home = Coord::new(SubjectiveRow::first().to_row(piece.force), Col::E);
        if piece.kind != PieceKind::King || mv.from != home || d_row != 0 || d_col.abs() != 2 {
            return None;
        }
        Some(if d_col < 0 { CastleDirection::ASide } else { CastleDirection::HSide })
    }

    fn try_castle(&self, mv: TurnMove, dir: CastleDirection) -> Result<TurnOutcome, TurnError> {
        let force = self.active_force;
        if mv.promote_to.is_some() {
            return Err(TurnError::BadPromotion);
        }
        if !self.castling_rights[force][dir] {
            return Err(TurnError::CastlingPieceHasMoved);
        }
        let row = mv.from.row;
        let rook_from = Coord::new(row, castling_rook_col(dir));
        let rook = match self.grid[rook_from] {
            Some(piece) if piece.kind == PieceKind::Rook && piece.force == force => piece,
            _ => return Err(TurnError::CastlingPieceHasMoved),
        };
        if squares_between(mv.from, rook_from).into_iter().any(|pos| self.grid[pos].is_some()) {
            return Err(TurnError::PathBlocked);
        }
        let Some(king) = self.grid[mv.from] else {
            return Err(TurnError::PieceMissing);
        };
        let rook_to = Coord::new(row, match dir {
            CastleDirection::ASide => Col::D,
            CastleDirection::HSide => Col::F,
        });
        // King cannot start in, pass through or end up in a checked square.
        let grid_without_king = self.grid.with(mv.from, None);
        for pos in [mv.from, rook_to, mv.to] {
            if is_attacked(&grid_without_king.with(pos, Some(king)), pos, force.opponent()) {
                return Err(TurnError::UnprotectedKing);
            }
        }

        let mut new_grid = self.grid.clone();
        new_grid[mv.from] = None;
        new_grid[rook_from] = None;
        new_grid[mv.to] = Some(king);
        new_grid[rook_to] = Some(rook);
        let mut castling_rights = self.castling_rights;
        castling_rights[force] = enum_map! { _ => false };
        let board = self.next_board(new_grid, castling_rights, None, self.reserves);
        Ok(TurnOutcome { board, capture: None })
    }

    fn try_drop(&self, drop: TurnDrop, rules: &BughouseRules) -> Result<TurnOutcome, TurnError> {
        let force = self.active_force;
        if !drop.piece_kind.can_be_dropped() {
            return Err(TurnError::DropForbidden);
        }
        let to_subjective_row = SubjectiveRow::from_row(drop.to.row, force);
        if drop.piece_kind == PieceKind::Pawn && !rules.pawn_drop_ranks.contains(to_subjective_row) {
            return Err(TurnError::DropPosition);
        }
        if self.reserves[force][drop.piece_kind] < 1 {
            return Err(TurnError::DropPieceMissing);
        }
        if self.grid[drop.to].is_some() {
            return Err(TurnError::DropBlocked);
        }
        let new_grid = self
            .grid
            .with(drop.to, Some(PieceOnBoard::new(drop.piece_kind, PieceOrigin::Dropped, force)));
        if !king_is_safe(&new_grid, force) {
            return Err(TurnError::UnprotectedKing);
        }

        let mut reserves = self.reserves;
        reserves[force][drop.piece_kind] -= 1;
        let board = self.next_board(new_grid, self.castling_rights, None, reserves);
        let drop_legal = match rules.drop_aggression {
            DropAggression::NoCheck => !board.is_check(),
            DropAggression::NoChessMate => !is_chess_mate(&board),
            DropAggression::NoBughouseMate => !is_bughouse_mate(&board),
            DropAggression::MateAllowed => true,
        };
        if !drop_legal {
            return Err(TurnError::DropAggression);
        }
        Ok(TurnOutcome { board, capture: None })
    }

    fn next_board(
        &self, grid: Grid, castling_rights: CastlingRights, en_passant_target: Option<Coord>,
        reserves: EnumMap<Force, Reserve>,
    ) -> Board {
        let full_turn_index = match self.active_force {
            Force::White => self.full_turn_index,
            Force::Black => self.full_turn_index + 1,
        };
        Board {
            grid,
            active_force: self.active_force.opponent(),
            castling_rights,
            en_passant_target,
            full_turn_index,
            reserves,
        }
    }

    pub fn algebraic_to_turn(&self, algebraic: &AlgebraicTurn) -> Result<Turn, TurnError> {
        let force = self.active_force;
        match algebraic {
            AlgebraicTurn::Move(mv) => self.algebraic_move_to_turn(mv),
            AlgebraicTurn::Drop(drop) => {
                Ok(Turn::Drop(TurnDrop { piece_kind: drop.piece_kind, to: drop.to }))
            }
            AlgebraicTurn::Castle(dir) => {
                let row = SubjectiveRow::first().to_row(force);
                let to_col = match dir {
                    CastleDirection::ASide => Col::C,
                    CastleDirection::HSide => Col::G,
                };
                Ok(Turn::Move(TurnMove {
                    from: Coord::new(row, Col::E),
                    to: Coord::new(row, to_col),
                    promote_to: None,
                }))
            }
        }
    }

    fn algebraic_move_to_turn(&self, mv: &AlgebraicMove) -> Result<Turn, TurnError> {
        let force = self.active_force;
        let fully_specified_from = match (mv.from_col, mv.from_row) {
            (Some(col), Some(row)) => Some(Coord::new(row, col)),
            _ => None,
        };
        // Long algebraic ("e2e4") omits the piece: take it from the board.
        let piece_kind = match (mv.piece_kind, fully_specified_from) {
            (Some(kind), _) => kind,
            (None, Some(from)) => self.grid[from].ok_or(TurnError::PieceMissing)?.kind,
            (None, None) => PieceKind::Pawn,
        };
        let mut candidates = Vec::new();
        let mut potentially_reachable = false;
        for (from, piece) in self.grid.pieces() {
            if piece.force != force
                || piece.kind != piece_kind
                || mv.from_row.is_some_and(|row| row != from.row)
                || mv.from_col.is_some_and(|col| col != from.col)
            {
                continue;
            }
            let turn_move = TurnMove { from, to: mv.to, promote_to: mv.promote_to };
            if self.castling_direction(turn_move).is_some() {
                candidates.push(turn_move);
                continue;
            }
            let capture = get_capture(&self.grid, from, mv.to, self.en_passant_target);
            match reachability(&self.grid, from, mv.to, capture.is_some()) {
                Reachability::Ok => {
                    if mv.capturing && capture.is_none() {
                        return Err(TurnError::CaptureNotationRequiresCapture);
                    }
                    candidates.push(turn_move);
                }
                Reachability::Blocked => potentially_reachable = true,
                Reachability::Impossible => {}
            }
        }
        if candidates.len() > 1 {
            // Pinned pieces do not count when resolving ambiguity.
            candidates.retain(|turn_move| self.try_move(*turn_move).is_ok());
        }
        match candidates.as_slice() {
            [turn_move] => Ok(Turn::Move(*turn_move)),
            [] if potentially_reachable => Err(TurnError::PathBlocked),
            [] => Err(TurnError::ImpossibleTrajectory),
            _ => Err(TurnError::AmbiguousNotation),
        }
    }

    // Converts a turn that is about to be made on this board into short algebraic notation
    // (without check marks: these depend on the resulting position).
    pub fn turn_to_algebraic(&self, turn: Turn) -> Result<AlgebraicTurn, TurnError> {
        match turn {
            Turn::Drop(drop) => {
                Ok(AlgebraicTurn::Drop(AlgebraicDrop { piece_kind: drop.piece_kind, to: drop.to }))
            }
            Turn::Move(mv) => {
                let piece = self.grid[mv.from].ok_or(TurnError::PieceMissing)?;
                if let Some(dir) = self.castling_direction(mv) {
                    return Ok(AlgebraicTurn::Castle(dir));
                }
                let capturing =
                    get_capture(&self.grid, mv.from, mv.to, self.en_passant_target).is_some();
                let (from_col, from_row) = if piece.kind == PieceKind::Pawn {
                    (capturing.then_some(mv.from.col), None)
                } else {
                    let rivals: Vec<Coord> = self
                        .grid
                        .pieces()
                        .filter(|(from, other)| {
                            *from != mv.from
                                && other.kind == piece.kind
                                && other.force == piece.force
                                && self.try_move(TurnMove { from: *from, ..mv }).is_ok()
                        })
                        .map(|(from, _)| from)
                        .collect();
                    if rivals.is_empty() {
                        (None, None)
                    } else if rivals.iter().all(|pos| pos.col != mv.from.col) {
                        (Some(mv.from.col), None)
                    } else if rivals.iter().all(|pos| pos.row != mv.from.row) {
                        (None, Some(mv.from.row))
                    } else {
                        (Some(mv.from.col), Some(mv.from.row))
                    }
                };
                Ok(AlgebraicTurn::Move(AlgebraicMove {
                    piece_kind: Some(piece.kind),
                    from_col,
                    from_row,
                    capturing,
                    to: mv.to,
                    promote_to: mv.promote_to,
                }))
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self { Self::new() }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::BughouseRules;

    fn mv(from: Coord, to: Coord) -> Turn { Turn::Move(TurnMove { from, to, promote_to: None }) }

    fn play(board: &Board, turns: &[Turn]) -> Board {
        let rules = BughouseRules::chess_com();
        turns.iter().fold(board.clone(), |board, turn| board.try_turn(*turn, &rules).unwrap().board)
    }

    #[test]
    fn starting_position() {
        let board = Board::new();
        assert_eq!(board.grid()[Coord::E1].unwrap().kind, PieceKind::King);
        assert_eq!(board.grid()[Coord::D8].unwrap().kind, PieceKind::Queen);
        assert_eq!(board.grid()[Coord::D8].unwrap().force, Force::Black);
        assert_eq!(board.active_force(), Force::White);
        assert!(!board.is_check());
    }

    #[test]
    fn turn_does_not_modify_original() {
        let board = Board::new();
        let outcome = board.try_turn(mv(Coord::E2, Coord::E4), &BughouseRules::chess_com()).unwrap();
        assert!(board.grid()[Coord::E2].is_some());
        assert!(outcome.board.grid()[Coord::E4].is_some());
        assert_eq!(outcome.board.active_force(), Force::Black);
        assert_eq!(outcome.board.en_passant_target(), Some(Coord::E3));
    }

    #[test]
    fn basic_errors() {
        let board = Board::new();
        let rules = BughouseRules::chess_com();
        assert_eq!(board.try_turn(mv(Coord::E3, Coord::E4), &rules).unwrap_err(), TurnError::PieceMissing);
        assert_eq!(board.try_turn(mv(Coord::E7, Coord::E5), &rules).unwrap_err(), TurnError::WrongTurnOrder);
        assert_eq!(board.try_turn(mv(Coord::A1, Coord::A3), &rules).unwrap_err(), TurnError::PathBlocked);
        assert_eq!(
            board.try_turn(mv(Coord::B1, Coord::B3), &rules).unwrap_err(),
            TurnError::ImpossibleTrajectory
        );
    }

    #[test]
    fn en_passant() {
        let board = play(&Board::new(), &[
            mv(Coord::E2, Coord::E4),
            mv(Coord::A7, Coord::A6),
            mv(Coord::E4, Coord::E5),
            mv(Coord::D7, Coord::D5),
        ]);
        let outcome = board.try_turn(mv(Coord::E5, Coord::D6), &BughouseRules::chess_com()).unwrap();
        assert_eq!(outcome.board.grid()[Coord::D5], None);
        assert_eq!(outcome.capture, Some(Capture { piece_kind: PieceKind::Pawn, force: Force::Black }));
    }

    #[test]
    fn castling() {
        let board = play(&Board::new(), &[
            mv(Coord::E2, Coord::E4),
            mv(Coord::E7, Coord::E5),
            mv(Coord::G1, Coord::F3),
            mv(Coord::B8, Coord::C6),
            mv(Coord::F1, Coord::C4),
            mv(Coord::G8, Coord::F6),
        ]);
        let castled = play(&board, &[mv(Coord::E1, Coord::G1)]);
        assert_eq!(castled.grid()[Coord::G1].unwrap().kind, PieceKind::King);
        assert_eq!(castled.grid()[Coord::F1].unwrap().kind, PieceKind::Rook);
        assert!(!castled.castling_rights()[Force::White][CastleDirection::ASide]);

        let rook_moved = play(&board, &[
            mv(Coord::H1, Coord::G1),
            mv(Coord::A7, Coord::A6),
            mv(Coord::G1, Coord::H1),
            mv(Coord::A6, Coord::A5),
        ]);
        assert_eq!(
            rook_moved.try_turn(mv(Coord::E1, Coord::G1), &BughouseRules::chess_com()).unwrap_err(),
            TurnError::CastlingPieceHasMoved
        );
    }

    #[test]
    fn squares_between_lines() {
        assert_eq!(squares_between(Coord::A1, Coord::D4), vec![Coord::B2, Coord::C3]);
        assert_eq!(squares_between(Coord::H8, Coord::H6), vec![Coord::H7]);
        assert_eq!(squares_between(Coord::E1, Coord::E2), vec![]);
        assert_eq!(squares_between(Coord::B1, Coord::C3), vec![]);
    }

    #[test]
    fn drops() {
        let rules = BughouseRules::chess_com();
        let mut board = play(&Board::new(), &[mv(Coord::E2, Coord::E4), mv(Coord::E7, Coord::E5)]);
        let knight_drop = Turn::Drop(TurnDrop { piece_kind: PieceKind::Knight, to: Coord::D4 });
        assert_eq!(board.try_turn(knight_drop, &rules).unwrap_err(), TurnError::DropPieceMissing);
        board.receive_capture(&Capture { piece_kind: PieceKind::Knight, force: Force::White });
        board.receive_capture(&Capture { piece_kind: PieceKind::Pawn, force: Force::White });
        let outcome = board.try_turn(knight_drop, &rules).unwrap();
        assert_eq!(outcome.board.reserve(Force::White)[PieceKind::Knight], 0);
        assert_eq!(outcome.board.grid()[Coord::D4].unwrap().origin, PieceOrigin::Dropped);
        // The original board still has the knight in reserve.
        assert_eq!(board.reserve(Force::White)[PieceKind::Knight], 1);

        let pawn_on_first_rank = Turn::Drop(TurnDrop { piece_kind: PieceKind::Pawn, to: Coord::D1 });
        assert_eq!(board.try_turn(pawn_on_first_rank, &rules).unwrap_err(), TurnError::DropPosition);
        let pawn_on_last_rank = Turn::Drop(TurnDrop { piece_kind: PieceKind::Pawn, to: Coord::E8 });
        assert_eq!(board.try_turn(pawn_on_last_rank, &rules).unwrap_err(), TurnError::DropPosition);
        let pawn_occupied = Turn::Drop(TurnDrop { piece_kind: PieceKind::Pawn, to: Coord::E4 });
        assert_eq!(board.try_turn(pawn_occupied, &rules).unwrap_err(), TurnError::DropBlocked);
    }
}
