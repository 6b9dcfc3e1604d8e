use log::debug;
use std::time::Duration;

use crate::config::Config;
use crate::grid::Grid;
use crate::state::GridState;
use crate::search::{PathSearch, SearchController, SearchEvent, SearchOutcome, SearchResult};
use crate::{Error, Result};

/// Figures of the last completed run, for display next to the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchStats {
    pub found: bool,
    pub nodes_explored: usize,
    pub path_length: usize,
    pub path_cost: u64,
    pub elapsed: Duration,
}

impl From<&SearchResult> for SearchStats {
    fn from(result: &SearchResult) -> Self {
        SearchStats {
            found: result.found,
            nodes_explored: result.nodes_explored,
            path_length: result.path.len(),
            path_cost: result.cost,
            elapsed: result.elapsed,
        }
    }
}

/// Application state of a visualizer: one [Grid], one [PathSearch] and the statistics of the
/// last run. UI input events map onto its methods one to one. Every edit that succeeds clears
/// the painted search and the statistics, since they no longer describe the grid.
#[derive(Debug)]
pub struct Visualizer {
    config: Config,
    grid: Grid,
    search: PathSearch,
    stats: Option<SearchStats>,
}

impl Visualizer {
    pub fn new(config: Config) -> Result<Visualizer> {
        config.validate()?;
        let grid = Grid::new(config.grid.rows, config.grid.cols)?;
        let search = PathSearch::with_step_delay(config.search.step_delay());
        Ok(Visualizer {
            config,
            grid,
            search,
            stats: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn grid(&self) -> &Grid {
        &self.grid
    }
    pub fn stats(&self) -> Option<&SearchStats> {
        self.stats.as_ref()
    }
    pub fn controller(&self) -> SearchController {
        self.search.controller()
    }
    pub fn is_running(&self) -> bool {
        self.search.is_running()
    }

    pub fn set_step_delay(&self, delay: Duration) -> Duration {
        self.search.set_step_delay(delay)
    }

    pub fn stop(&self) {
        self.search.stop()
    }

    fn invalidate(&mut self) {
        self.grid.reset_search_state();
        self.stats = None;
    }

    fn edited(&mut self, changed: bool) -> bool {
        if changed {
            self.invalidate();
        }
        changed
    }

    pub fn toggle_obstacle(&mut self, row: usize, col: usize) -> bool {
        let changed = self.grid.toggle_obstacle(row, col);
        self.edited(changed)
    }

    pub fn set_start(&mut self, row: usize, col: usize) -> Result<()> {
        self.grid.set_start(row, col)?;
        self.invalidate();
        Ok(())
    }

    pub fn set_goal(&mut self, row: usize, col: usize) -> Result<()> {
        self.grid.set_goal(row, col)?;
        self.invalidate();
        Ok(())
    }

    pub fn set_weight(&mut self, row: usize, col: usize, weight: u32) -> Result<()> {
        self.grid.set_weight(row, col, weight)?;
        self.invalidate();
        Ok(())
    }

    pub fn clear_obstacles(&mut self) {
        self.grid.clear_obstacles();
        self.invalidate();
    }

    /// Resizes within the configured bounds. Discards the layout.
    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<()> {
        if !self.config.grid.size_allowed(rows, cols) {
            return Err(Error::InvalidDimensions { rows, cols });
        }
        self.grid.resize(rows, cols)?;
        self.invalidate();
        Ok(())
    }

    /// Back to an empty grid with default endpoints, at the current size.
    pub fn reset(&mut self) {
        self.grid.reset();
        self.stats = None;
    }

    pub fn export_json(&self) -> Result<String> {
        self.grid.export_json()
    }

    /// Loads a saved layout. Sizes outside the configured bounds are rejected like in
    /// [resize](Self::resize).
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let state = GridState::from_json(json)?;
        if !self.config.grid.size_allowed(state.rows, state.cols) {
            return Err(Error::InvalidDimensions {
                rows: state.rows,
                cols: state.cols,
            });
        }
        self.grid.import_state(&state)?;
        debug!("Loaded {}x{} layout", self.grid.rows(), self.grid.cols());
        self.invalidate();
        Ok(())
    }

    /// Keeps the stats in line with what the grid shows. A cancelled run has already repainted
    /// the grid, so the previous figures are dropped.
    fn record(&mut self, outcome: &SearchOutcome) {
        match outcome {
            SearchOutcome::Found(result) | SearchOutcome::NotFound(result) => {
                self.stats = Some(SearchStats::from(result));
            }
            SearchOutcome::Cancelled(_) => self.stats = None,
            SearchOutcome::AlreadyRunning | SearchOutcome::MissingEndpoint => {}
        }
    }

    /// Runs a search to completion and paints the result into the grid.
    pub fn run(&mut self) -> SearchOutcome {
        let outcome = self.search.find_path(&mut self.grid);
        self.record(&outcome);
        outcome
    }

    /// Runs a paced search; see [PathSearch::run_animated].
    pub async fn run_animated<F>(&mut self, on_event: F) -> SearchOutcome
    where
        F: FnMut(&Grid, &SearchEvent),
    {
        let outcome = self.search.run_animated(&mut self.grid, on_event).await;
        self.record(&outcome);
        outcome
    }
}
