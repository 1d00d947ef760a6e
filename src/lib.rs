// Legend for various fix-this comments:
//   * "TODO" - bug or missing crucial feature.
//   * "Improvement potential" - missing nice-to-have feature or an opportunity
//       to make code better or faster.

#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod adjudication;
pub mod algebraic;
pub mod analysis_tree;
pub mod board;
pub mod coord;
pub mod error;
pub mod fen;
pub mod force;
pub mod game;
pub mod grid;
pub mod merge;
pub mod piece;
pub mod rules;
pub mod util;

pub use adjudication::{
    check_suffix, checking_pieces, is_bughouse_mate, is_chess_mate, is_legal_drop, is_legal_move,
    normalize_suffix,
};
pub use analysis_tree::{AnalysisNode, AnalysisTree, NavForward, NodeId, NodeTurn};
pub use board::{Board, Turn, TurnDrop, TurnError, TurnMove};
pub use coord::{Col, Coord, Row, SubjectiveRow};
pub use error::{ApplyTurnError, LoadError, MergeError, TreeError};
pub use fen::{board_to_fen, fen_to_board};
pub use force::Force;
pub use game::{
    BughouseBoard, BughouseGameStatus, BughousePlayerId, BughousePosition, BughouseTurn, Team,
    VictoryReason,
};
pub use merge::{TurnRecord, merge_turn_streams};
pub use piece::{PieceKind, PieceOnBoard, PieceOrigin};
pub use rules::{BughouseRules, DropAggression, PawnDropRanks, Rules};
