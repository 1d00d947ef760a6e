use std::fmt;

use crate::analysis_tree::NodeId;
use crate::board::TurnError;
use crate::game::BughouseBoard;
use crate::merge::TurnRecord;


#[macro_export]
macro_rules! internal_error_message {
    () => {
        format!("Internal error at {}:{}.", file!(), line!())
    };
    ($($arg:tt)+) => {
        format!("Internal error at {}:{}: {}.", file!(), line!(), format!($($arg)*))
    };
}

// Structural problems with a tree operation. The tree is never modified when these are returned.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TreeError {
    UnknownNode(NodeId),
    RootNode,
    AlreadyMain(NodeId),
}

// The two per-board streams cannot be combined into a replayable sequence.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum MergeError {
    WrongBoard { stream: BughouseBoard, record: TurnRecord },
    PlyOrder { stream: BughouseBoard, record: TurnRecord },
    // No predecessor on the other board to swap with.
    IllegalTurn { index: usize, record: TurnRecord, error: TurnError },
    // Neither order of an adjacent pair is legal, or the pair needs a second swap.
    Conflict { index: usize, earlier: TurnRecord, later: TurnRecord, error: TurnError },
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LoadError {
    IllegalTurn { index: usize, record: TurnRecord, error: TurnError },
    Merge(MergeError),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ApplyTurnError {
    Tree(TreeError),
    Turn(TurnError),
}

impl From<TreeError> for ApplyTurnError {
    fn from(err: TreeError) -> Self { ApplyTurnError::Tree(err) }
}
impl From<TurnError> for ApplyTurnError {
    fn from(err: TurnError) -> Self { ApplyTurnError::Turn(err) }
}
impl From<MergeError> for LoadError {
    fn from(err: MergeError) -> Self { LoadError::Merge(err) }
}

fn describe_record(record: &TurnRecord) -> String {
    format!(
        "{:?}{} {} at {}ms",
        record.board, record.ply_number, record.move_text, record.timestamp_millis
    )
}

impl fmt::Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.description()) }
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::UnknownNode(id) => write!(f, "node {id} does not exist"),
            TreeError::RootNode => f.write_str("operation is not applicable to the root"),
            TreeError::AlreadyMain(id) => write!(f, "node {id} is already the main continuation"),
        }
    }
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::WrongBoard { stream, record } => write!(
                f,
                "stream for board {stream:?} contains a record for another board: {}",
                describe_record(record)
            ),
            MergeError::PlyOrder { stream, record } => write!(
                f,
                "ply numbers in stream for board {stream:?} are not increasing: {}",
                describe_record(record)
            ),
            MergeError::IllegalTurn { index, record, error } => {
                write!(f, "turn #{index} ({}) is illegal: {error}", describe_record(record))
            }
            MergeError::Conflict { index, earlier, later, error } => write!(
                f,
                "cannot order turns #{} ({}) and #{} ({}): {error}",
                index,
                describe_record(earlier),
                index + 1,
                describe_record(later)
            ),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::IllegalTurn { index, record, error } => {
                write!(f, "turn #{index} ({}) is illegal: {error}", describe_record(record))
            }
            LoadError::Merge(err) => write!(f, "cannot merge boards: {err}"),
        }
    }
}

impl fmt::Display for ApplyTurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyTurnError::Tree(err) => err.fmt(f),
            ApplyTurnError::Turn(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for TurnError {}
impl std::error::Error for TreeError {}
impl std::error::Error for MergeError {}
impl std::error::Error for LoadError {}
impl std::error::Error for ApplyTurnError {}
