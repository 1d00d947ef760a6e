use enum_map::{Enum, EnumMap, enum_map};
use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::adjudication::{check_suffix, is_bughouse_mate};
use crate::algebraic::{AlgebraicCharset, AlgebraicTurn};
use crate::board::{Board, Reserve, Turn, TurnError};
use crate::force::Force;
use crate::piece::PieceKind;
use crate::rules::Rules;


#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Enum, EnumIter, Serialize, Deserialize)]
pub enum BughouseBoard {
    A,
    B,
}

// Team::Red = {A-White, B-Black}, Team::Blue = {A-Black, B-White}.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Enum, EnumIter, Serialize, Deserialize)]
pub enum Team {
    Red,
    Blue,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum VictoryReason {
    Checkmate,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum BughouseGameStatus {
    Active,
    Victory(Team, VictoryReason),
}

impl BughouseBoard {
    pub fn other(self) -> Self {
        match self {
            BughouseBoard::A => BughouseBoard::B,
            BughouseBoard::B => BughouseBoard::A,
        }
    }
}

impl Team {
    pub fn opponent(self) -> Self {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }
}

pub fn get_bughouse_team(board_idx: BughouseBoard, force: Force) -> Team {
    match (board_idx, force) {
        (BughouseBoard::A, Force::White) | (BughouseBoard::B, Force::Black) => Team::Red,
        (BughouseBoard::B, Force::White) | (BughouseBoard::A, Force::Black) => Team::Blue,
    }
}
pub fn get_bughouse_force(team: Team, board_idx: BughouseBoard) -> Force {
    match (team, board_idx) {
        (Team::Red, BughouseBoard::A) | (Team::Blue, BughouseBoard::B) => Force::White,
        (Team::Blue, BughouseBoard::A) | (Team::Red, BughouseBoard::B) => Force::Black,
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct BughousePlayerId {
    pub board_idx: BughouseBoard,
    pub force: Force,
}

impl BughousePlayerId {
    pub fn team(self) -> Team { get_bughouse_team(self.board_idx, self.force) }
}

// A turn on one of the two boards. The side making it is always the active side of that board.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct BughouseTurn {
    pub board_idx: BughouseBoard,
    pub turn: Turn,
}

#[derive(Clone, Debug)]
pub struct TurnApplied {
    pub position: BughousePosition,
    pub turn: BughouseTurn,
    pub captured: Option<PieceKind>,
    // Short algebraic with a check mark that follows bughouse rules.
    pub notation: String,
}

// Both boards of a bughouse game plus the pieces in reserve.
//
// Reserves are stored per player: pieces captured on one board go to the partner of the
// capturing player, i.e. to the player of the same team on the other board. This is the only
// player who can drop them.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BughousePosition {
    boards: EnumMap<BughouseBoard, Board>,
    status: BughouseGameStatus,
}

impl BughousePosition {
    pub fn new() -> Self {
        Self::from_boards(enum_map! { _ => Board::new() })
    }

    pub fn from_boards(boards: EnumMap<BughouseBoard, Board>) -> Self {
        BughousePosition { boards, status: BughouseGameStatus::Active }
    }

    pub fn board(&self, idx: BughouseBoard) -> &Board { &self.boards[idx] }
    pub fn boards(&self) -> &EnumMap<BughouseBoard, Board> { &self.boards }
    pub fn status(&self) -> BughouseGameStatus { self.status }

    // Pieces that `team` can drop on the given board.
    pub fn reserve(&self, team: Team, board_idx: BughouseBoard) -> &Reserve {
        self.boards[board_idx].reserve(get_bughouse_force(team, board_idx))
    }

    pub fn active_player(&self, board_idx: BughouseBoard) -> BughousePlayerId {
        BughousePlayerId {
            board_idx,
            force: self.boards[board_idx].active_force(),
        }
    }

    // Validates the turn and computes the next position. `self` is never modified.
    pub fn try_turn(
        &self, board_idx: BughouseBoard, turn: Turn, rules: &Rules,
    ) -> Result<TurnApplied, TurnError> {
        if self.status != BughouseGameStatus::Active {
            // The game may have ended on the other board.
            return Err(TurnError::GameOver);
        }
        let board = &self.boards[board_idx];
        let mover = self.active_player(board_idx);
        let algebraic = board.turn_to_algebraic(turn)?;
        let outcome = board.try_turn(turn, &rules.bughouse_rules)?;

        let mut position = self.clone();
        if let Some(capture) = &outcome.capture {
            position.boards[board_idx.other()].receive_capture(capture);
        }
        let notation = format!(
            "{}{}",
            algebraic.format(AlgebraicCharset::Ascii),
            check_suffix(&outcome.board)
        );
        if is_bughouse_mate(&outcome.board) {
            position.status = BughouseGameStatus::Victory(mover.team(), VictoryReason::Checkmate);
        }
        position.boards[board_idx] = outcome.board;
        Ok(TurnApplied {
            position,
            turn: BughouseTurn { board_idx, turn },
            captured: outcome.capture.map(|capture| capture.piece_kind),
            notation,
        })
    }

    pub fn try_turn_algebraic(
        &self, board_idx: BughouseBoard, notation: &str, rules: &Rules,
    ) -> Result<TurnApplied, TurnError> {
        let turn = self.parse_turn(board_idx, notation)?;
        self.try_turn(board_idx, turn, rules)
    }

    pub fn parse_turn(&self, board_idx: BughouseBoard, notation: &str) -> Result<Turn, TurnError> {
        let algebraic = AlgebraicTurn::parse(notation).ok_or(TurnError::InvalidNotation)?;
        self.boards[board_idx].algebraic_to_turn(&algebraic)
    }
}

impl Default for BughousePosition {
    fn default() -> Self { Self::new() }
}
