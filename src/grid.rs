use std::{fmt, ops};

use ndarray::{Array, Array2};
use serde::{Deserialize, Serialize};

use crate::coord::{Coord, NUM_COLS, NUM_ROWS};
use crate::force::Force;
use crate::piece::{PieceKind, PieceOnBoard, PieceOrigin};


#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    data: Array2<Option<PieceOnBoard>>,
}

impl Grid {
    pub fn new() -> Self {
        Grid {
            data: Array::from_elem((NUM_ROWS as usize, NUM_COLS as usize), None),
        }
    }

    pub fn pieces(&self) -> impl Iterator<Item = (Coord, PieceOnBoard)> + '_ {
        Coord::all().filter_map(|pos| self[pos].map(|piece| (pos, piece)))
    }

    pub fn find_king(&self, force: Force) -> Option<Coord> {
        self.pieces()
            .find(|(_, piece)| piece.kind == PieceKind::King && piece.force == force)
            .map(|(pos, _)| pos)
    }

    // Returns a copy of the grid with one square changed. Used to try out positions without
    // touching the original.
    pub fn with(&self, pos: Coord, piece: Option<PieceOnBoard>) -> Self {
        let mut grid = self.clone();
        grid[pos] = piece;
        grid
    }
}

impl ops::Index<Coord> for Grid {
    type Output = Option<PieceOnBoard>;
    fn index(&self, pos: Coord) -> &Self::Output { &self.data[coord_to_index(pos)] }
}

impl ops::IndexMut<Coord> for Grid {
    fn index_mut(&mut self, pos: Coord) -> &mut Self::Output {
        &mut self.data[coord_to_index(pos)]
    }
}

fn coord_to_index(pos: Coord) -> [usize; 2] {
    [pos.row.to_zero_based() as usize, pos.col.to_zero_based() as usize]
}

fn debug_format_piece(piece: &PieceOnBoard) -> String {
    let mut s = format!("{:?}-{:?}", piece.force, piece.kind);
    if piece.origin != PieceOrigin::Innate {
        s.push_str(&format!("-{:?}", piece.origin));
    }
    s
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Grid ")?;
        f.debug_map()
            .entries(self.pieces().map(|(pos, piece)| (pos.to_algebraic(), debug_format_piece(&piece))))
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_leaves_original_intact() {
        let mut g = Grid::new();
        g[Coord::A1] = Some(PieceOnBoard::new(PieceKind::Queen, PieceOrigin::Innate, Force::White));
        g[Coord::B2] = Some(PieceOnBoard::new(PieceKind::King, PieceOrigin::Innate, Force::White));
        let changed = g
            .with(Coord::A1, None)
            .with(Coord::C3, Some(PieceOnBoard::new(PieceKind::Bishop, PieceOrigin::Dropped, Force::Black)));
        assert_eq!(changed[Coord::A1], None);
        assert_eq!(changed[Coord::C3].unwrap().kind, PieceKind::Bishop);
        assert_eq!(g[Coord::A1].unwrap().kind, PieceKind::Queen);
        assert_eq!(g[Coord::C3], None);
        assert_eq!(g.find_king(Force::White), Some(Coord::B2));
        assert_eq!(g.find_king(Force::Black), None);
    }
}
