use core::fmt;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Cost stored in [Cell::g] for cells the current search has not reached yet.
pub const UNREACHED: u64 = u64::MAX;

/// A 0-based (row, col) position on a [Grid](crate::grid::Grid).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Coord {
        Coord { row, col }
    }

    pub fn manhattan_distance(&self, other: &Coord) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// The von Neumann neighbourhood in the order up, down, left, right. Neighbours that would
    /// leave the `usize` range are left out; the grid bounds are checked by the grid.
    pub fn neumann_neighborhood(&self) -> SmallVec<[Coord; 4]> {
        let candidates = [
            self.row.checked_sub(1).map(|row| Coord::new(row, self.col)),
            self.row.checked_add(1).map(|row| Coord::new(row, self.col)),
            self.col.checked_sub(1).map(|col| Coord::new(self.row, col)),
            self.col.checked_add(1).map(|col| Coord::new(self.row, col)),
        ];
        candidates.into_iter().flatten().collect()
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Coord {
    fn from((row, col): (usize, usize)) -> Coord {
        Coord::new(row, col)
    }
}

/// One grid position. The layout flags (`is_obstacle`, `is_start`, `is_goal`, `weight`) persist
/// across searches and are only changed through [Grid](crate::grid::Grid) edits. The remaining
/// fields are search scratch and are cleared by
/// [reset_search_state](crate::grid::Grid::reset_search_state).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub is_obstacle: bool,
    pub is_start: bool,
    pub is_goal: bool,
    /// Cost of entering this cell from an orthogonal neighbour.
    pub weight: u32,
    pub g: u64,
    pub h: u64,
    pub f: u64,
    pub visited: bool,
    pub on_path: bool,
    pub came_from: Option<Coord>,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Cell {
        Cell {
            row,
            col,
            is_obstacle: false,
            is_start: false,
            is_goal: false,
            weight: 1,
            g: UNREACHED,
            h: 0,
            f: UNREACHED,
            visited: false,
            on_path: false,
            came_from: None,
        }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.row, self.col)
    }

    /// Start or goal.
    pub fn is_endpoint(&self) -> bool {
        self.is_start || self.is_goal
    }

    pub fn is_reached(&self) -> bool {
        self.g != UNREACHED
    }

    pub(crate) fn clear_search_state(&mut self) {
        self.g = UNREACHED;
        self.h = 0;
        self.f = UNREACHED;
        self.visited = false;
        self.on_path = false;
        self.came_from = None;
    }

    /// Glyph used by the ASCII rendering of the grid.
    pub fn glyph(&self) -> char {
        if self.is_start {
            'S'
        } else if self.is_goal {
            'G'
        } else if self.is_obstacle {
            '#'
        } else if self.on_path {
            '*'
        } else if self.visited {
            'o'
        } else {
            '.'
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighborhood_skips_underflow() {
        let corner = Coord::new(0, 0).neumann_neighborhood();
        assert_eq!(corner.as_slice(), &[Coord::new(1, 0), Coord::new(0, 1)]);
        let inner = Coord::new(2, 3).neumann_neighborhood();
        assert_eq!(
            inner.as_slice(),
            &[
                Coord::new(1, 3),
                Coord::new(3, 3),
                Coord::new(2, 2),
                Coord::new(2, 4)
            ]
        );
    }

    #[test]
    fn neighborhood_skips_overflow() {
        let edge = Coord::new(usize::MAX, usize::MAX).neumann_neighborhood();
        assert_eq!(
            edge.as_slice(),
            &[
                Coord::new(usize::MAX - 1, usize::MAX),
                Coord::new(usize::MAX, usize::MAX - 1)
            ]
        );
    }

    #[test]
    fn manhattan() {
        assert_eq!(Coord::new(0, 0).manhattan_distance(&Coord::new(4, 4)), 8);
        assert_eq!(Coord::new(3, 1).manhattan_distance(&Coord::new(1, 2)), 3);
    }

    #[test]
    fn clearing_scratch_keeps_layout() {
        let mut cell = Cell::new(1, 2);
        cell.is_obstacle = true;
        cell.weight = 3;
        cell.g = 4;
        cell.visited = true;
        cell.came_from = Some(Coord::new(1, 1));
        cell.clear_search_state();
        assert!(cell.is_obstacle);
        assert_eq!(cell.weight, 3);
        assert!(!cell.is_reached());
        assert!(!cell.visited);
        assert_eq!(cell.came_from, None);
    }
}
