use derive_new::new;
use enum_map::Enum;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::force::Force;
use crate::util::as_single_char;


#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Enum, EnumIter, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum PieceOrigin {
    Innate,
    Promoted,
    Dropped,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, new, Serialize, Deserialize)]
pub struct PieceOnBoard {
    pub kind: PieceKind,
    pub origin: PieceOrigin,
    pub force: Force,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Enum, EnumIter, Serialize, Deserialize)]
pub enum CastleDirection {
    ASide,
    HSide,
}

impl PieceKind {
    // Should not be used to construct moves in algebraic notation, because it returns a
    // non-empty name for a pawn (use `to_algebraic_for_move` instead).
    pub fn to_full_algebraic(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    pub fn to_algebraic_for_move(self) -> &'static str {
        match self {
            PieceKind::Pawn => "",
            PieceKind::Knight => "N",
            PieceKind::Bishop => "B",
            PieceKind::Rook => "R",
            PieceKind::Queen => "Q",
            PieceKind::King => "K",
        }
    }

    pub fn from_algebraic_char(notation: char) -> Option<Self> {
        match notation {
            'P' => Some(PieceKind::Pawn),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }

    pub fn from_algebraic(notation: &str) -> Option<Self> {
        as_single_char(notation).and_then(Self::from_algebraic_char)
    }

    // Pieces that move any number of squares along a line. Only these can be blocked by
    // an interposed piece when giving check.
    pub fn is_slider(self) -> bool {
        match self {
            PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => true,
            PieceKind::Pawn | PieceKind::Knight | PieceKind::King => false,
        }
    }

    pub fn can_promote_to(self) -> bool {
        match self {
            PieceKind::Pawn | PieceKind::King => false,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => true,
        }
    }

    pub fn can_be_dropped(self) -> bool { self != PieceKind::King }
}

impl PieceOnBoard {
    // What goes to the reserve when this piece is captured.
    pub fn kind_in_reserve(self) -> PieceKind {
        match self.origin {
            PieceOrigin::Promoted => PieceKind::Pawn,
            PieceOrigin::Innate | PieceOrigin::Dropped => self.kind,
        }
    }
}

pub fn piece_to_ascii(kind: PieceKind, force: Force) -> char {
    let ch = kind.to_full_algebraic();
    match force {
        Force::White => ch.to_ascii_uppercase(),
        Force::Black => ch.to_ascii_lowercase(),
    }
}

pub fn piece_from_ascii(ch: char) -> Option<(PieceKind, Force)> {
    let force = if ch.is_ascii_uppercase() { Force::White } else { Force::Black };
    let kind = PieceKind::from_algebraic_char(ch.to_ascii_uppercase())?;
    Some((kind, force))
}

pub fn piece_to_pictogram(piece_kind: PieceKind, force: Force) -> char {
    use self::Force::*;
    use self::PieceKind::*;
    match (force, piece_kind) {
        (White, Pawn) => '♙',
        (White, Knight) => '♘',
        (White, Bishop) => '♗',
        (White, Rook) => '♖',
        (White, Queen) => '♕',
        (White, King) => '♔',
        (Black, Pawn) => '♟',
        (Black, Knight) => '♞',
        (Black, Bishop) => '♝',
        (Black, Rook) => '♜',
        (Black, Queen) => '♛',
        (Black, King) => '♚',
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii() {
        assert_eq!(piece_to_ascii(PieceKind::Knight, Force::Black), 'n');
        assert_eq!(piece_from_ascii('Q'), Some((PieceKind::Queen, Force::White)));
        assert_eq!(piece_from_ascii('x'), None);
    }

    #[test]
    fn promoted_piece_returns_to_reserve_as_pawn() {
        let queen = PieceOnBoard::new(PieceKind::Queen, PieceOrigin::Promoted, Force::White);
        assert_eq!(queen.kind_in_reserve(), PieceKind::Pawn);
        let knight = PieceOnBoard::new(PieceKind::Knight, PieceOrigin::Dropped, Force::White);
        assert_eq!(knight.kind_in_reserve(), PieceKind::Knight);
    }
}
