use log::{debug, info, trace, warn};
use std::time::Instant;

use super::frontier::{Frontier, FrontierNode};
use super::{SearchController, SearchOutcome, SearchResult, SearchState, Step};
use crate::cell::{Coord, UNREACHED};
use crate::grid::Grid;

fn heuristic(from: Coord, to: Coord) -> u64 {
    u64::try_from(from.manhattan_distance(&to)).unwrap_or(UNREACHED)
}

enum Advance {
    Visited(Coord),
    Reached { path: Vec<Coord>, cost: u64 },
    Exhausted,
}

/// Open and closed sets of a run that has not reached the goal yet.
struct Exploration {
    frontier: Frontier,
    closed: Vec<bool>,
    /// Visited cell whose neighbours are expanded at the start of the next step.
    pending: Option<FrontierNode>,
    start: usize,
    goal: usize,
    goal_coord: Coord,
}

impl Exploration {
    fn advance(&mut self, grid: &mut Grid, visited: &mut Vec<Coord>) -> Advance {
        if let Some(node) = self.pending.take() {
            self.expand(grid, node);
        }
        while let Some(node) = self.frontier.pop(&self.closed) {
            if node.cell == self.goal {
                debug!(
                    "Goal reached at cost {} with {} cells discovered",
                    node.cost,
                    self.frontier.discovered()
                );
                let path = self
                    .frontier
                    .path_to(node.index)
                    .into_iter()
                    .map(|ix| grid.coord_of(ix))
                    .collect();
                return Advance::Reached {
                    path,
                    cost: node.cost,
                };
            }
            self.closed[node.cell] = true;
            if node.cell == self.start {
                self.expand(grid, node);
                continue;
            }
            let coord = grid.coord_of(node.cell);
            grid.cell_ix_mut(node.cell).visited = true;
            visited.push(coord);
            self.pending = Some(node);
            return Advance::Visited(coord);
        }
        Advance::Exhausted
    }

    fn expand(&mut self, grid: &mut Grid, node: FrontierNode) {
        let coord = grid.coord_of(node.cell);
        for neighbour in grid.neighbours(coord) {
            let ix = grid.ix(neighbour);
            let cell = grid.cell_ix(ix);
            if cell.is_obstacle || self.closed[ix] {
                continue;
            }
            let cost = node.cost.saturating_add(u64::from(cell.weight));
            let h = heuristic(neighbour, self.goal_coord);
            if self.frontier.relax(ix, node.index, cost, h) {
                let cell = grid.cell_ix_mut(ix);
                cell.g = cost;
                cell.h = h;
                cell.f = cost.saturating_add(h);
                cell.came_from = Some(coord);
                trace!("{neighbour} reached via {coord} at cost {cost}");
            }
        }
    }
}

/// Path found; interior cells still to be marked.
#[derive(Default)]
struct Reveal {
    path: Vec<Coord>,
    cost: u64,
    next: usize,
}

impl Reveal {
    fn advance(&mut self, grid: &mut Grid) -> Option<Coord> {
        if self.next + 1 >= self.path.len() {
            return None;
        }
        let coord = self.path[self.next];
        self.next += 1;
        let ix = grid.ix(coord);
        grid.cell_ix_mut(ix).on_path = true;
        Some(coord)
    }
}

enum Phase {
    Exploring(Exploration),
    Revealing(Reveal),
    Finished(SearchOutcome),
}

enum Verdict {
    Found { path: Vec<Coord>, cost: u64 },
    NotFound,
    Cancelled,
}

/// A single search execution, advanced one step at a time.
///
/// Each [step](Self::step) either finalizes one cell (marking it visited), marks one interior
/// path cell once the goal was reached, or reports the final [SearchOutcome]. Pausing between
/// steps is up to the driver. A stop request made through the [SearchController] is observed at
/// the beginning of the next step. The run borrows the grid mutably, so the layout cannot change
/// underneath it.
///
/// Dropping a run before it finished counts as cancelling it.
pub struct SearchRun<'g> {
    grid: &'g mut Grid,
    /// `None` for runs rejected before they started.
    controller: Option<SearchController>,
    phase: Phase,
    visited_order: Vec<Coord>,
    started: Instant,
}

impl<'g> SearchRun<'g> {
    pub(super) fn begin(grid: &'g mut Grid, controller: &SearchController) -> SearchRun<'g> {
        let (start, goal) = (grid.start(), grid.goal());
        let has_endpoints = grid.cell(start).is_some_and(|c| c.is_start)
            && grid.cell(goal).is_some_and(|c| c.is_goal);
        if !has_endpoints {
            warn!("Search rejected: grid has no usable start or goal");
            return SearchRun::rejected(grid, SearchOutcome::MissingEndpoint);
        }
        if !controller.try_begin() {
            warn!("Search rejected: a search is already running");
            return SearchRun::rejected(grid, SearchOutcome::AlreadyRunning);
        }

        grid.reset_search_state();
        let start_ix = grid.ix(start);
        let goal_ix = grid.ix(goal);
        let h = heuristic(start, goal);
        let cell = grid.cell_ix_mut(start_ix);
        cell.g = 0;
        cell.h = h;
        cell.f = h;

        let phase = if start == goal {
            Phase::Revealing(Reveal {
                path: vec![start],
                cost: 0,
                next: 1,
            })
        } else {
            Phase::Exploring(Exploration {
                frontier: Frontier::new(start_ix, h),
                closed: vec![false; grid.cells().len()],
                pending: None,
                start: start_ix,
                goal: goal_ix,
                goal_coord: goal,
            })
        };
        debug!("Searching from {start} to {goal}");
        SearchRun {
            grid,
            controller: Some(controller.clone()),
            phase,
            visited_order: Vec::new(),
            started: Instant::now(),
        }
    }

    fn rejected(grid: &'g mut Grid, outcome: SearchOutcome) -> SearchRun<'g> {
        SearchRun {
            grid,
            controller: None,
            phase: Phase::Finished(outcome),
            visited_order: Vec::new(),
            started: Instant::now(),
        }
    }

    /// The grid as of the last step, for rendering.
    pub fn grid(&self) -> &Grid {
        &*self.grid
    }

    pub fn visited_order(&self) -> &[Coord] {
        &self.visited_order
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished(_))
    }

    /// Advances the run by one step. Once finished, keeps returning the final outcome.
    pub fn step(&mut self) -> Step {
        if let Phase::Finished(outcome) = &self.phase {
            return Step::Done(outcome.clone());
        }
        if self
            .controller
            .as_ref()
            .is_some_and(SearchController::cancel_requested)
        {
            return self.finish(Verdict::Cancelled);
        }
        match &mut self.phase {
            Phase::Finished(outcome) => Step::Done(outcome.clone()),
            Phase::Revealing(reveal) => {
                let reveal = std::mem::take(reveal);
                self.reveal(reveal)
            }
            Phase::Exploring(exploration) => {
                match exploration.advance(self.grid, &mut self.visited_order) {
                    Advance::Visited(coord) => Step::Visited(coord),
                    Advance::Reached { path, cost } => self.reveal(Reveal {
                        path,
                        cost,
                        next: 1,
                    }),
                    Advance::Exhausted => self.finish(Verdict::NotFound),
                }
            }
        }
    }

    /// Steps until the run is finished.
    pub fn run_to_completion(mut self) -> SearchOutcome {
        loop {
            if let Step::Done(outcome) = self.step() {
                return outcome;
            }
        }
    }

    fn reveal(&mut self, mut reveal: Reveal) -> Step {
        match reveal.advance(self.grid) {
            Some(coord) => {
                self.phase = Phase::Revealing(reveal);
                Step::PathCell(coord)
            }
            None => self.finish(Verdict::Found {
                path: reveal.path,
                cost: reveal.cost,
            }),
        }
    }

    fn finish(&mut self, verdict: Verdict) -> Step {
        let visited_order = std::mem::take(&mut self.visited_order);
        let (state, found, path, cost) = match verdict {
            Verdict::Found { path, cost } => (SearchState::Found, true, path, cost),
            Verdict::NotFound => (SearchState::NotFound, false, Vec::new(), 0),
            Verdict::Cancelled => (SearchState::Cancelled, false, Vec::new(), 0),
        };
        let result = SearchResult {
            found,
            path,
            nodes_explored: visited_order.len(),
            visited_order,
            cost,
            elapsed: self.started.elapsed(),
        };
        info!(
            "Search {state:?}: {} cells explored, path length {}, {:?}",
            result.nodes_explored,
            result.path.len(),
            result.elapsed
        );
        let outcome = match state {
            SearchState::Found => SearchOutcome::Found(result),
            SearchState::NotFound => SearchOutcome::NotFound(result),
            _ => SearchOutcome::Cancelled(result),
        };
        if let Some(controller) = &self.controller {
            controller.finish(state);
        }
        self.phase = Phase::Finished(outcome.clone());
        Step::Done(outcome)
    }
}

impl Drop for SearchRun<'_> {
    fn drop(&mut self) {
        if self.is_finished() {
            return;
        }
        if let Some(controller) = &self.controller {
            debug!("Unfinished search dropped, marking it cancelled");
            controller.finish(SearchState::Cancelled);
        }
    }
}
