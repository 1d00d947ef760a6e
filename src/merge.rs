// Combines the two per-board turn streams of a finished game into one sequence that can be
// replayed turn by turn.
//
// Timestamps come from the game service and are subject to jitter, so turns on different boards
// made within a few milliseconds of each other can be recorded out of order. Two shapes of
// conflicts are known:
//   - Checkmate race: a checkmate on one board is recorded slightly before a turn on the other
//     board that was already in flight. In timestamp order the later turn is made after the game
//     is over.
//   - Piece availability race: a drop on one board is recorded slightly before the capture on
//     the other board that provided the piece.
// Both are resolved by swapping two adjacent turns from different boards. Longer chains of
// conflicting turns are not resolved: a turn takes part in at most one swap.

use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::board::TurnError;
use crate::error::MergeError;
use crate::force::Force;
use crate::game::{BughouseBoard, BughouseGameStatus, BughousePosition, TurnApplied};
use crate::rules::Rules;


#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRecord {
    pub board: BughouseBoard,
    pub side: Force,
    pub move_text: String,
    pub ply_number: u32,
    pub timestamp_millis: u64,
}

// Applies a recorded turn. Fails if the record is illegal in the position, including when
// it was made by the wrong side.
pub fn apply_record(
    position: &BughousePosition, record: &TurnRecord, rules: &Rules,
) -> Result<TurnApplied, TurnError> {
    if position.status() != BughouseGameStatus::Active {
        return Err(TurnError::GameOver);
    }
    if position.board(record.board).active_force() != record.side {
        return Err(TurnError::WrongTurnOrder);
    }
    position.try_turn_algebraic(record.board, &record.move_text, rules)
}

fn validate_stream(stream_board: BughouseBoard, records: &[TurnRecord]) -> Result<(), MergeError> {
    if let Some(record) = records.iter().find(|r| r.board != stream_board) {
        return Err(MergeError::WrongBoard { stream: stream_board, record: record.clone() });
    }
    if let Some((_, record)) =
        records.iter().tuple_windows().find(|(prev, next)| prev.ply_number >= next.ply_number)
    {
        return Err(MergeError::PlyOrder { stream: stream_board, record: record.clone() });
    }
    Ok(())
}

// Stable merge by timestamp. Never reorders records from the same stream; on equal timestamps
// board A goes first.
fn merge_by_timestamp(a: &[TurnRecord], b: &[TurnRecord]) -> Vec<TurnRecord> {
    a.iter()
        .merge_by(b.iter(), |ra, rb| ra.timestamp_millis <= rb.timestamp_millis)
        .cloned()
        .collect()
}

struct Replay<'a> {
    rules: &'a Rules,
    records: Vec<TurnRecord>,
    swapped: Vec<bool>,
    // `positions[i]` is the position before `records[i]`.
    positions: Vec<BughousePosition>,
}

impl Replay<'_> {
    fn can_swap(&self, i: usize, j: usize) -> bool {
        j < self.records.len()
            && self.records[i].board != self.records[j].board
            && !self.swapped[i]
            && !self.swapped[j]
    }

    // Tries to make `records[i + 1]` before `records[i]`, starting from `positions[i]`.
    fn try_swap(&mut self, i: usize) -> Result<(), TurnError> {
        let first = apply_record(&self.positions[i], &self.records[i + 1], self.rules)?;
        let second = apply_record(&first.position, &self.records[i], self.rules)?;
        debug!(
            "Swapping {:?} {} ({}ms) and {:?} {} ({}ms)",
            self.records[i].board,
            self.records[i].move_text,
            self.records[i].timestamp_millis,
            self.records[i + 1].board,
            self.records[i + 1].move_text,
            self.records[i + 1].timestamp_millis,
        );
        self.records.swap(i, i + 1);
        self.swapped[i] = true;
        self.swapped[i + 1] = true;
        self.positions.truncate(i + 1);
        self.positions.push(first.position);
        self.positions.push(second.position);
        Ok(())
    }

    fn conflict(&self, i: usize, error: TurnError) -> MergeError {
        MergeError::Conflict {
            index: i,
            earlier: self.records[i].clone(),
            later: self.records[i + 1].clone(),
            error,
        }
    }

    fn run(mut self) -> Result<Vec<TurnRecord>, MergeError> {
        let mut i = 0;
        while i < self.records.len() {
            let error = match apply_record(&self.positions[i], &self.records[i], self.rules) {
                Ok(applied) => {
                    self.positions.push(applied.position);
                    i += 1;
                    continue;
                }
                Err(err) => err,
            };
            // Preferred: the turn was in flight while the previous turn on the other board was
            // made. Otherwise the next turn on the other board might have enabled it.
            let mut failure = None;
            if i > 0 && self.records[i - 1].board != self.records[i].board {
                if self.can_swap(i - 1, i) {
                    match self.try_swap(i - 1) {
                        Ok(()) => {
                            i += 1;
                            continue;
                        }
                        Err(err) => failure = Some((i - 1, err)),
                    }
                } else {
                    failure = Some((i - 1, error));
                }
            }
            if self.can_swap(i, i + 1) {
                match self.try_swap(i) {
                    Ok(()) => {
                        i += 2;
                        continue;
                    }
                    Err(err) => failure = failure.or(Some((i, err))),
                }
            }
            let err = match failure {
                Some((pair_start, err)) => self.conflict(pair_start, err),
                None => MergeError::IllegalTurn { index: i, record: self.records[i].clone(), error },
            };
            warn!("Cannot merge turn streams: {err}");
            return Err(err);
        }
        Ok(self.records)
    }
}

// Merges the turn streams of boards A and B into one sequence where every turn is legal.
// The result is unchanged when the timestamp order is already consistent.
pub fn merge_turn_streams(
    board_a: &[TurnRecord], board_b: &[TurnRecord], rules: &Rules,
) -> Result<Vec<TurnRecord>, MergeError> {
    validate_stream(BughouseBoard::A, board_a)?;
    validate_stream(BughouseBoard::B, board_b)?;
    let records = merge_by_timestamp(board_a, board_b);
    let replay = Replay {
        rules,
        swapped: vec![false; records.len()],
        records,
        positions: vec![BughousePosition::new()],
    };
    replay.run()
}

// Splits a combined sequence back into per-board streams.
pub fn split_by_board(records: &[TurnRecord]) -> (Vec<TurnRecord>, Vec<TurnRecord>) {
    records.iter().cloned().partition(|r| r.board == BughouseBoard::A)
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn record(
        board: BughouseBoard, ply_number: u32, move_text: &str, timestamp_millis: u64,
    ) -> TurnRecord {
        let side = if ply_number % 2 == 1 { Force::White } else { Force::Black };
        TurnRecord {
            board,
            side,
            move_text: move_text.to_owned(),
            ply_number,
            timestamp_millis,
        }
    }

    fn texts(records: &[TurnRecord]) -> Vec<String> {
        records.iter().map(|r| format!("{:?}.{}", r.board, r.move_text)).collect()
    }

    #[test]
    fn consistent_streams_are_merged_by_time() {
        use BughouseBoard::*;
        let a = vec![record(A, 1, "e4", 1000), record(A, 2, "e5", 3000)];
        let b = vec![record(B, 1, "d4", 1000), record(B, 2, "d5", 2000)];
        let merged = merge_turn_streams(&a, &b, &Rules::chess_com()).unwrap();
        assert_eq!(texts(&merged), vec!["A.e4", "B.d4", "B.d5", "A.e5"]);
    }

    #[test]
    fn piece_availability_race() {
        use BughouseBoard::*;
        let a = vec![
            record(A, 1, "e4", 1000),
            record(A, 2, "d5", 2000),
            record(A, 3, "exd5", 3000),
        ];
        let b = vec![record(B, 1, "Nf3", 1500), record(B, 2, "P@e5", 2995)];
        let merged = merge_turn_streams(&a, &b, &Rules::chess_com()).unwrap();
        assert_eq!(texts(&merged), vec!["A.e4", "B.Nf3", "A.d5", "A.exd5", "B.P@e5"]);
    }

    #[test]
    fn checkmate_race() {
        use BughouseBoard::*;
        let a = ["e4", "e5", "Qh5", "Nc6", "Bc4", "Nf6", "Qxf7#"]
            .iter()
            .enumerate()
            .map(|(i, text)| record(A, i as u32 + 1, text, 1000 * (i as u64 + 1)))
            .collect_vec();
        let b = vec![record(B, 1, "d4", 7003)];
        let merged = merge_turn_streams(&a, &b, &Rules::chess_com()).unwrap();
        assert_eq!(merged.len(), 8);
        assert_eq!(texts(&merged[6..]), vec!["B.d4", "A.Qxf7#"]);
    }

    #[test]
    fn merge_is_idempotent() {
        use BughouseBoard::*;
        let a = vec![
            record(A, 1, "e4", 1000),
            record(A, 2, "d5", 2000),
            record(A, 3, "exd5", 3000),
        ];
        let b = vec![record(B, 1, "Nf3", 1500), record(B, 2, "P@e5", 2995)];
        let merged = merge_turn_streams(&a, &b, &Rules::chess_com()).unwrap();
        let (a2, b2) = split_by_board(&merged);
        assert_eq!(a2, a);
        assert_eq!(b2, b);
        assert_eq!(merge_turn_streams(&a2, &b2, &Rules::chess_com()).unwrap(), merged);
    }

    #[test]
    fn unresolvable_conflict() {
        use BughouseBoard::*;
        let a = vec![record(A, 1, "e4", 1000), record(A, 2, "e5", 2000)];
        // Nothing was ever captured, so the drop cannot be made in any order.
        let b = vec![record(B, 1, "e4", 1500), record(B, 2, "N@e5", 2500)];
        let err = merge_turn_streams(&a, &b, &Rules::chess_com()).unwrap_err();
        match err {
            MergeError::Conflict { index, earlier, later, error } => {
                assert_eq!(index, 2);
                assert_eq!(earlier.move_text, "e5");
                assert_eq!(later.move_text, "N@e5");
                assert_eq!(error, TurnError::DropPieceMissing);
            }
            other => panic!("Expected a conflict, got {other:?}"),
        }
    }

    #[test]
    fn illegal_first_turn() {
        use BughouseBoard::*;
        let a = vec![record(A, 1, "e5", 1000)];
        let err = merge_turn_streams(&a, &[], &Rules::chess_com()).unwrap_err();
        assert!(matches!(err, MergeError::IllegalTurn { index: 0, .. }));
    }

    #[test]
    fn malformed_streams() {
        use BughouseBoard::*;
        let rules = Rules::chess_com();
        let a = vec![record(A, 1, "e4", 1000)];
        let b_wrong_board = vec![record(A, 1, "e4", 1500)];
        assert!(matches!(
            merge_turn_streams(&a, &b_wrong_board, &rules),
            Err(MergeError::WrongBoard { stream: B, .. })
        ));
        let a_bad_ply = vec![record(A, 2, "e4", 1000), record(A, 2, "e5", 2000)];
        assert!(matches!(
            merge_turn_streams(&a_bad_ply, &[], &rules),
            Err(MergeError::PlyOrder { stream: A, .. })
        ));
    }

    #[test]
    fn wrong_side() {
        use BughouseBoard::*;
        let mut bad = record(A, 1, "e4", 1000);
        bad.side = Force::Black;
        assert_eq!(
            apply_record(&BughousePosition::new(), &bad, &Rules::chess_com()).unwrap_err(),
            TurnError::WrongTurnOrder
        );
    }
}
