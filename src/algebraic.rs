use crate::coord::{Col, Coord, Row};
use crate::once_cell_regex;
use crate::piece::{CastleDirection, PieceKind};
use crate::util::as_single_char;


#[derive(Clone, Copy, Debug)]
pub enum AlgebraicCharset {
    Ascii,
    AuxiliaryUnicode,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AlgebraicMove {
    // `None` means no piece letter: a pawn in short notation, any piece in long notation.
    pub piece_kind: Option<PieceKind>,
    pub from_col: Option<Col>,
    pub from_row: Option<Row>,
    pub capturing: bool,
    pub to: Coord,
    pub promote_to: Option<PieceKind>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AlgebraicDrop {
    pub piece_kind: PieceKind,
    pub to: Coord,
}

// Parsed algebraic notation. Conversion between `AlgebraicTurn` and string can be done
// without a board. Conversion between `AlgebraicTurn` and `Turn` requires a board.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum AlgebraicTurn {
    Move(AlgebraicMove),
    Drop(AlgebraicDrop),
    Castle(CastleDirection),
}

// Check/mate mark at the end of a turn, if any.
pub fn check_mark(notation: &str) -> &str {
    let notation = notation.trim();
    &notation[strip_check_mark(notation).len()..]
}

pub fn strip_check_mark(notation: &str) -> &str {
    notation.trim().trim_end_matches(['+', '#', '†', '‡'])
}

impl AlgebraicTurn {
    pub fn parse(notation: &str) -> Option<Self> {
        let notation = notation.trim();
        let move_re = once_cell_regex!(
            r"^([NBRQK])?([a-h])?([1-8])?([x×:])?([a-h][1-8])(?:[=/]?([NBRQnbrq]))?([+†#‡]*)$"
        );
        let drop_re = once_cell_regex!(r"^([PNBRQ])@([a-h][1-8])([+†#‡]*)$");
        let a_castling_re = once_cell_regex!(r"^(0-0-0|O-O-O)([+†#‡]*)$");
        let h_castling_re = once_cell_regex!(r"^(0-0|O-O)([+†#‡]*)$");
        if let Some(cap) = move_re.captures(notation) {
            let piece_kind = match cap.get(1) {
                None => None,
                Some(m) => Some(PieceKind::from_algebraic(m.as_str())?),
            };
            let from_col = match cap.get(2) {
                None => None,
                Some(m) => Some(Col::from_algebraic(as_single_char(m.as_str())?)?),
            };
            let from_row = match cap.get(3) {
                None => None,
                Some(m) => Some(Row::from_algebraic(as_single_char(m.as_str())?)?),
            };
            let capturing = cap.get(4).is_some();
            let to = Coord::from_algebraic(cap.get(5)?.as_str())?;
            let promote_to = match cap.get(6) {
                None => None,
                Some(m) => Some(PieceKind::from_algebraic(&m.as_str().to_ascii_uppercase())?),
            };
            Some(AlgebraicTurn::Move(AlgebraicMove {
                piece_kind,
                from_col,
                from_row,
                capturing,
                to,
                promote_to,
            }))
        } else if let Some(cap) = drop_re.captures(notation) {
            let piece_kind = PieceKind::from_algebraic(cap.get(1)?.as_str())?;
            let to = Coord::from_algebraic(cap.get(2)?.as_str())?;
            Some(AlgebraicTurn::Drop(AlgebraicDrop { piece_kind, to }))
        } else if a_castling_re.is_match(notation) {
            Some(AlgebraicTurn::Castle(CastleDirection::ASide))
        } else if h_castling_re.is_match(notation) {
            Some(AlgebraicTurn::Castle(CastleDirection::HSide))
        } else {
            None
        }
    }

    pub fn format(&self, charset: AlgebraicCharset) -> String {
        match self {
            AlgebraicTurn::Move(mv) => {
                let capture_notation = match charset {
                    AlgebraicCharset::Ascii => "x",
                    AlgebraicCharset::AuxiliaryUnicode => "×",
                };
                let mut from = String::new();
                if let Some(col) = mv.from_col {
                    from.push(col.to_algebraic())
                };
                if let Some(row) = mv.from_row {
                    from.push(row.to_algebraic())
                };
                let promotion = match mv.promote_to {
                    Some(piece_kind) => format!("={}", piece_kind.to_full_algebraic()),
                    None => String::new(),
                };
                format!(
                    "{}{}{}{}{}",
                    mv.piece_kind.map_or("", |kind| kind.to_algebraic_for_move()),
                    from,
                    if mv.capturing { capture_notation } else { "" },
                    mv.to.to_algebraic(),
                    promotion,
                )
            }
            AlgebraicTurn::Drop(drop) => {
                format!("{}@{}", drop.piece_kind.to_full_algebraic(), drop.to.to_algebraic())
            }
            AlgebraicTurn::Castle(dir) => match dir {
                CastleDirection::ASide => "O-O-O".to_owned(),
                CastleDirection::HSide => "O-O".to_owned(),
            },
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn parse_move(notation: &str) -> AlgebraicMove {
        match AlgebraicTurn::parse(notation) {
            Some(AlgebraicTurn::Move(mv)) => mv,
            other => panic!("Expected a move, got {other:?}"),
        }
    }

    #[test]
    fn parse_short() {
        let mv = parse_move("Nbxd7+");
        assert_eq!(mv.piece_kind, Some(PieceKind::Knight));
        assert_eq!(mv.from_col, Some(Col::B));
        assert_eq!(mv.from_row, None);
        assert!(mv.capturing);
        assert_eq!(mv.to, Coord::D7);

        let mv = parse_move("e8=Q#");
        assert_eq!(mv.piece_kind, None);
        assert_eq!(mv.promote_to, Some(PieceKind::Queen));
    }

    #[test]
    fn parse_long() {
        let mv = parse_move("e7e8q");
        assert_eq!(mv.from_col, Some(Col::E));
        assert_eq!(mv.from_row, Some(Row::_7));
        assert_eq!(mv.to, Coord::E8);
        assert_eq!(mv.promote_to, Some(PieceKind::Queen));
    }

    #[test]
    fn parse_drop_and_castle() {
        assert_eq!(
            AlgebraicTurn::parse("P@e4"),
            Some(AlgebraicTurn::Drop(AlgebraicDrop { piece_kind: PieceKind::Pawn, to: Coord::E4 }))
        );
        assert_eq!(AlgebraicTurn::parse("K@e4"), None);
        assert_eq!(AlgebraicTurn::parse("O-O-O+"), Some(AlgebraicTurn::Castle(CastleDirection::ASide)));
        assert_eq!(AlgebraicTurn::parse("0-0"), Some(AlgebraicTurn::Castle(CastleDirection::HSide)));
        assert_eq!(AlgebraicTurn::parse("Zz9"), None);
    }

    #[test]
    fn format() {
        for notation in ["Nbxd7", "e4", "exd5", "e8=Q", "Q@f7", "O-O", "R1a3"] {
            let turn = AlgebraicTurn::parse(notation).unwrap();
            assert_eq!(turn.format(AlgebraicCharset::Ascii), notation);
        }
        let turn = AlgebraicTurn::parse("exd5").unwrap();
        assert_eq!(turn.format(AlgebraicCharset::AuxiliaryUnicode), "e×d5");
    }

    #[test]
    fn check_marks() {
        assert_eq!(check_mark("Qxf7#"), "#");
        assert_eq!(check_mark("N@e6+"), "+");
        assert_eq!(check_mark("e4"), "");
        assert_eq!(strip_check_mark("Qxf7#"), "Qxf7");
    }
}
