use core::fmt;
use itertools::iproduct;
use log::{debug, info};
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;

use crate::cell::{Cell, Coord};
use crate::state::{GridState, ObstacleEntry, WeightEntry};
use crate::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Endpoint {
    Start,
    Goal,
}

/// [Grid] owns a row-major collection of [Cell]s together with the designated start and goal.
/// Every edit keeps the start, goal and obstacle roles mutually exclusive: placing an endpoint on
/// an obstacle clears the obstacle, and obstacles cannot be toggled on an endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    start: Coord,
    goal: Coord,
}

impl Grid {
    /// Creates a `rows` x `cols` grid without obstacles. The start is placed at the quarter point
    /// and the goal at the three-quarter point.
    pub fn new(rows: usize, cols: usize) -> Result<Grid> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidDimensions { rows, cols });
        }
        Ok(Grid::with_default_layout(rows, cols))
    }

    fn with_default_layout(rows: usize, cols: usize) -> Grid {
        let start = Coord::new(rows / 4, cols / 4);
        let goal = Coord::new(rows * 3 / 4, cols * 3 / 4);
        let mut grid = Grid {
            rows,
            cols,
            cells: iproduct!(0..rows, 0..cols)
                .map(|(row, col)| Cell::new(row, col))
                .collect(),
            start,
            goal,
        };
        grid.place_endpoints(start, goal);
        info!("Initialized {rows}x{cols} grid with start {start} and goal {goal}");
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn cols(&self) -> usize {
        self.cols
    }
    pub fn start(&self) -> Coord {
        self.start
    }
    pub fn goal(&self) -> Coord {
        self.goal
    }
    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    /// Flat index of an in-bounds coordinate.
    pub fn index(&self, coord: Coord) -> Option<usize> {
        self.in_bounds(coord).then(|| coord.row * self.cols + coord.col)
    }

    pub(crate) fn ix(&self, coord: Coord) -> usize {
        debug_assert!(self.in_bounds(coord));
        coord.row * self.cols + coord.col
    }

    pub(crate) fn coord_of(&self, ix: usize) -> Coord {
        Coord::new(ix / self.cols, ix % self.cols)
    }

    pub(crate) fn cell_ix(&self, ix: usize) -> &Cell {
        &self.cells[ix]
    }

    pub(crate) fn cell_ix_mut(&mut self, ix: usize) -> &mut Cell {
        &mut self.cells[ix]
    }

    pub fn get_cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cell(Coord::new(row, col))
    }

    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.index(coord).map(|ix| &self.cells[ix])
    }

    /// In-bounds orthogonal neighbours in the order up, down, left, right.
    pub fn neighbours(&self, coord: Coord) -> SmallVec<[Coord; 4]> {
        coord
            .neumann_neighborhood()
            .into_iter()
            .filter(|c| self.in_bounds(*c))
            .collect()
    }

    pub fn set_start(&mut self, row: usize, col: usize) -> Result<()> {
        self.move_endpoint(Coord::new(row, col), Endpoint::Start)
    }

    pub fn set_goal(&mut self, row: usize, col: usize) -> Result<()> {
        self.move_endpoint(Coord::new(row, col), Endpoint::Goal)
    }

    fn move_endpoint(&mut self, target: Coord, role: Endpoint) -> Result<()> {
        let Some(target_ix) = self.index(target) else {
            return Err(Error::OutOfBounds {
                row: target.row,
                col: target.col,
            });
        };
        let (current, other) = match role {
            Endpoint::Start => (self.start, self.goal),
            Endpoint::Goal => (self.goal, self.start),
        };
        if target == current {
            return Ok(());
        }
        if target == other {
            return Err(Error::EndpointConflict {
                row: target.row,
                col: target.col,
            });
        }
        let current_ix = self.ix(current);
        match role {
            Endpoint::Start => {
                self.cells[current_ix].is_start = false;
                self.cells[target_ix].is_start = true;
                self.start = target;
            }
            Endpoint::Goal => {
                self.cells[current_ix].is_goal = false;
                self.cells[target_ix].is_goal = true;
                self.goal = target;
            }
        }
        self.cells[target_ix].is_obstacle = false;
        debug!("Moved {role:?} from {current} to {target}");
        Ok(())
    }

    /// Clears the endpoint flags at the recorded positions and places both endpoints anew.
    fn place_endpoints(&mut self, start: Coord, goal: Coord) {
        let old_start = self.ix(self.start);
        let old_goal = self.ix(self.goal);
        self.cells[old_start].is_start = false;
        self.cells[old_goal].is_goal = false;

        let start_ix = self.ix(start);
        self.cells[start_ix].is_obstacle = false;
        self.cells[start_ix].is_start = true;
        let goal_ix = self.ix(goal);
        self.cells[goal_ix].is_obstacle = false;
        self.cells[goal_ix].is_goal = true;
        self.start = start;
        self.goal = goal;
    }

    /// Flips the obstacle flag. Endpoints and out-of-bounds positions are left alone; returns
    /// whether the grid changed.
    pub fn toggle_obstacle(&mut self, row: usize, col: usize) -> bool {
        match self.cell(Coord::new(row, col)) {
            Some(cell) => {
                let blocked = !cell.is_obstacle;
                self.set_obstacle(row, col, blocked)
            }
            None => false,
        }
    }

    /// Sets the obstacle flag with the same guards as [toggle_obstacle](Self::toggle_obstacle).
    pub fn set_obstacle(&mut self, row: usize, col: usize, blocked: bool) -> bool {
        let Some(ix) = self.index(Coord::new(row, col)) else {
            return false;
        };
        let cell = &mut self.cells[ix];
        if cell.is_endpoint() || cell.is_obstacle == blocked {
            return false;
        }
        cell.is_obstacle = blocked;
        true
    }

    /// Sets the cost of entering the cell at (row, col).
    pub fn set_weight(&mut self, row: usize, col: usize, weight: u32) -> Result<()> {
        let ix = self
            .index(Coord::new(row, col))
            .ok_or(Error::OutOfBounds { row, col })?;
        if weight == 0 {
            return Err(Error::InvalidWeight { row, col });
        }
        self.cells[ix].weight = weight;
        Ok(())
    }

    pub fn clear_obstacles(&mut self) {
        self.cells.iter_mut().for_each(|c| c.is_obstacle = false);
    }

    pub fn obstacle_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_obstacle).count()
    }

    /// Clears visited, path and cost bookkeeping on every cell. The layout is untouched.
    pub fn reset_search_state(&mut self) {
        self.cells.iter_mut().for_each(Cell::clear_search_state);
    }

    /// Reinitializes the grid with new dimensions. The previous layout is discarded.
    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<()> {
        *self = Grid::new(rows, cols)?;
        Ok(())
    }

    /// Reinitializes the grid at its current size.
    pub fn reset(&mut self) {
        *self = Grid::with_default_layout(self.rows, self.cols);
    }

    /// Sparse export of the layout: obstacles and weighted cells in row-major order.
    pub fn export_state(&self) -> GridState {
        let obstacles = self
            .cells
            .iter()
            .filter(|c| c.is_obstacle)
            .map(|c| ObstacleEntry {
                row: c.row,
                col: c.col,
                weight: (c.weight != 1).then_some(c.weight),
            })
            .collect();
        let weights = self
            .cells
            .iter()
            .filter(|c| !c.is_obstacle && c.weight != 1)
            .map(|c| WeightEntry {
                row: c.row,
                col: c.col,
                weight: c.weight,
            })
            .collect();
        GridState {
            rows: self.rows,
            cols: self.cols,
            obstacles,
            start: self.start,
            goal: self.goal,
            weights,
        }
    }

    /// Replaces the layout with `state`. The state is applied to a scratch grid which is only
    /// swapped in once everything validated, so a rejected state leaves the grid untouched.
    /// Obstacles listed on the start or goal are skipped.
    pub fn import_state(&mut self, state: &GridState) -> Result<()> {
        let mut scratch = Grid::new(state.rows, state.cols)?;
        let check = |coord: Coord| {
            if scratch.in_bounds(coord) {
                Ok(coord)
            } else {
                Err(Error::OutOfBounds {
                    row: coord.row,
                    col: coord.col,
                })
            }
        };
        let start = check(state.start)?;
        let goal = check(state.goal)?;
        if start == goal && scratch.cells.len() > 1 {
            return Err(Error::CoincidentEndpoints);
        }
        for o in &state.obstacles {
            check(Coord::new(o.row, o.col))?;
            if o.weight == Some(0) {
                return Err(Error::InvalidWeight {
                    row: o.row,
                    col: o.col,
                });
            }
        }
        for w in &state.weights {
            check(Coord::new(w.row, w.col))?;
            if w.weight == 0 {
                return Err(Error::InvalidWeight {
                    row: w.row,
                    col: w.col,
                });
            }
        }

        scratch.place_endpoints(start, goal);
        for o in &state.obstacles {
            let coord = Coord::new(o.row, o.col);
            if coord == start || coord == goal {
                debug!("Skipping imported obstacle on endpoint {coord}");
                continue;
            }
            let ix = scratch.ix(coord);
            scratch.cells[ix].is_obstacle = true;
            if let Some(weight) = o.weight {
                scratch.cells[ix].weight = weight;
            }
        }
        for w in &state.weights {
            let ix = scratch.ix(Coord::new(w.row, w.col));
            scratch.cells[ix].weight = w.weight;
        }
        debug!(
            "Imported {}x{} grid with {} obstacles",
            scratch.rows,
            scratch.cols,
            scratch.obstacle_count()
        );
        *self = scratch;
        Ok(())
    }

    pub fn export_json(&self) -> Result<String> {
        self.export_state().to_json()
    }

    /// Parses and imports a JSON [GridState]. Parse failures leave the grid untouched.
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let state = GridState::from_json(json)?;
        self.import_state(&state)
    }

    /// Generates a [UnionFind] structure linking up free orthogonal neighbours.
    pub fn components(&self) -> UnionFind<usize> {
        let mut components = UnionFind::new(self.cells.len());
        for (row, col) in iproduct!(0..self.rows, 0..self.cols) {
            let ix = self.ix(Coord::new(row, col));
            if self.cells[ix].is_obstacle {
                continue;
            }
            [Coord::new(row + 1, col), Coord::new(row, col + 1)]
                .into_iter()
                .filter_map(|n| self.index(n))
                .filter(|&n_ix| !self.cells[n_ix].is_obstacle)
                .for_each(|n_ix| {
                    components.union(ix, n_ix);
                });
        }
        components
    }

    /// Checks whether `to` can be reached from `from` through free cells, without searching.
    pub fn reachable(&self, from: Coord, to: Coord) -> bool {
        match (self.index(from), self.index(to)) {
            (Some(a), Some(b)) => {
                !self.cells[a].is_obstacle
                    && !self.cells[b].is_obstacle
                    && self.components().equiv(a, b)
            }
            _ => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            let line: String = row.iter().map(Cell::glyph).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
