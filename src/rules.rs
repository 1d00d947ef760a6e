use serde::{Deserialize, Serialize};

use crate::coord::SubjectiveRow;


// Whether a drop is allowed to attack the opponent king right away.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum DropAggression {
    NoCheck,
    NoChessMate,
    NoBughouseMate,
    MateAllowed,
}

// Rows (from the dropping player's point of view) where pawns can be dropped, inclusive.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PawnDropRanks {
    pub min: SubjectiveRow,
    pub max: SubjectiveRow,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BughouseRules {
    pub pawn_drop_ranks: PawnDropRanks,
    pub drop_aggression: DropAggression,
}

// The whole rule set that the engine is parametrized by. Owned by each analysis tree, so
// trees with different rules can coexist.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Rules {
    pub bughouse_rules: BughouseRules,
}

impl PawnDropRanks {
    pub fn from_one_based(min: i8, max: i8) -> Self {
        Self {
            min: SubjectiveRow::from_one_based(min),
            max: SubjectiveRow::from_one_based(max),
        }
    }

    pub fn contains(self, row: SubjectiveRow) -> bool { self.min <= row && row <= self.max }
}

impl BughouseRules {
    pub fn chess_com() -> Self {
        Self {
            pawn_drop_ranks: PawnDropRanks::from_one_based(2, 7),
            drop_aggression: DropAggression::MateAllowed,
        }
    }

    // Pawns cannot be dropped on the back ranks and no drop may deliver a bughouse checkmate.
    pub fn strict() -> Self {
        Self {
            pawn_drop_ranks: PawnDropRanks::from_one_based(2, 7),
            drop_aggression: DropAggression::NoBughouseMate,
        }
    }
}

impl Rules {
    pub fn chess_com() -> Self { Self { bughouse_rules: BughouseRules::chess_com() } }
    pub fn strict() -> Self { Self { bughouse_rules: BughouseRules::strict() } }
}

impl Default for Rules {
    fn default() -> Self { Self::chess_com() }
}
