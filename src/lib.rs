//! # grid_pathviz
//!
//! The model behind a shortest-path visualizer: a [Grid] of cells with obstacles, per-cell
//! weights and a designated start and goal, and an
//! [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) search over it using the
//! [Manhattan distance](https://en.wikipedia.org/wiki/Taxicab_geometry) as heuristic. Moves are
//! restricted to the four orthogonal directions.
//!
//! Searches can run to completion in one call ([PathSearch::find_path]) or step by step, either
//! driven manually through a [SearchRun] or paced by a timer with [PathSearch::run_animated],
//! which reports every finalized cell and every revealed path cell as a [SearchEvent]. Ties in
//! the open set are broken deterministically (lowest f, then lowest h, then earliest discovery),
//! so repeated runs over the same grid explore cells in the same order.
//!
//! [Visualizer] bundles one grid and one search with the configuration and the statistics of
//! the last run, and is the intended entry point for a UI layer.
pub mod cell;
pub mod config;
pub mod error;
pub mod grid;
pub mod search;
pub mod state;
pub mod visualizer;

pub use cell::{Cell, Coord};
pub use config::Config;
pub use error::{Error, Result};
pub use grid::Grid;
pub use search::{
    PathSearch, SearchController, SearchEvent, SearchOutcome, SearchResult, SearchRun,
    SearchState, Step,
};
pub use state::GridState;
pub use visualizer::{SearchStats, Visualizer};

/// Lower bound of the pause after each visited cell, in milliseconds.
pub const MIN_STEP_DELAY_MS: u64 = 1;
/// Upper bound of the pause after each visited cell, in milliseconds.
pub const MAX_STEP_DELAY_MS: u64 = 1000;
pub const DEFAULT_STEP_DELAY_MS: u64 = 50;
/// Revealing a path cell pauses this many times longer than visiting a cell.
pub const PATH_DELAY_FACTOR: u32 = 2;
