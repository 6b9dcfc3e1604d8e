//! A* search over a [Grid] with a resumable, animatable execution protocol.
//!
//! The algorithm itself lives in [SearchRun], an explicit state object advanced one
//! [step](SearchRun::step) at a time. [PathSearch::find_path] drives it to completion without
//! pausing, while [PathSearch::run_animated] sleeps between steps and reports every step as a
//! [SearchEvent]. Stop requests and speed changes go through a [SearchController], which can be
//! cloned and handed to other tasks.
mod animate;
mod frontier;
mod run;

pub use run::SearchRun;

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::cell::Coord;
use crate::grid::Grid;
use crate::{DEFAULT_STEP_DELAY_MS, MAX_STEP_DELAY_MS, MIN_STEP_DELAY_MS, PATH_DELAY_FACTOR};

/// Lifecycle of a [PathSearch] instance. `Idle` is the initial state; a new run can be started
/// from any state except `Running`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SearchState {
    Idle = 0,
    Running = 1,
    Found = 2,
    NotFound = 3,
    Cancelled = 4,
}

impl SearchState {
    fn from_u8(value: u8) -> SearchState {
        match value {
            1 => SearchState::Running,
            2 => SearchState::Found,
            3 => SearchState::NotFound,
            4 => SearchState::Cancelled,
            _ => SearchState::Idle,
        }
    }
}

/// Output of a completed (or cancelled) run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub found: bool,
    /// Start to goal, both inclusive. Empty unless `found`.
    pub path: Vec<Coord>,
    /// Cells in the order they were finalized, start and goal excluded.
    pub visited_order: Vec<Coord>,
    pub nodes_explored: usize,
    /// Summed weight of the cells entered along `path`.
    pub cost: u64,
    pub elapsed: Duration,
}

/// How a run ended. None of these are errors: an unreachable goal is an ordinary outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(SearchResult),
    NotFound(SearchResult),
    /// Stopped at a step boundary; carries the cells visited so far.
    Cancelled(SearchResult),
    /// Another run on the same [PathSearch] has not finished yet.
    AlreadyRunning,
    /// The grid has no usable start or goal.
    MissingEndpoint,
}

impl SearchOutcome {
    pub fn result(&self) -> Option<&SearchResult> {
        match self {
            SearchOutcome::Found(r) | SearchOutcome::NotFound(r) | SearchOutcome::Cancelled(r) => {
                Some(r)
            }
            SearchOutcome::AlreadyRunning | SearchOutcome::MissingEndpoint => None,
        }
    }

    pub fn into_result(self) -> Option<SearchResult> {
        match self {
            SearchOutcome::Found(r) | SearchOutcome::NotFound(r) | SearchOutcome::Cancelled(r) => {
                Some(r)
            }
            SearchOutcome::AlreadyRunning | SearchOutcome::MissingEndpoint => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }
}

/// Notifications of an animated run. The grid passed alongside reflects the step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchEvent {
    NodeVisited(Coord),
    PathCellRevealed(Coord),
    Finished(SearchResult),
    Cancelled(SearchResult),
}

/// What a single [SearchRun::step] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// A cell was finalized and marked visited.
    Visited(Coord),
    /// An interior path cell was marked on the path.
    PathCell(Coord),
    Done(SearchOutcome),
}

#[derive(Debug)]
struct Shared {
    state: AtomicU8,
    cancel: AtomicBool,
    step_delay_ms: AtomicU64,
}

/// Cloneable handle for stopping a run and adjusting its pace from outside the run.
#[derive(Clone, Debug)]
pub struct SearchController {
    shared: Arc<Shared>,
}

fn clamp_delay(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis())
        .unwrap_or(MAX_STEP_DELAY_MS)
        .clamp(MIN_STEP_DELAY_MS, MAX_STEP_DELAY_MS)
}

impl SearchController {
    fn new(step_delay: Duration) -> SearchController {
        SearchController {
            shared: Arc::new(Shared {
                state: AtomicU8::new(SearchState::Idle as u8),
                cancel: AtomicBool::new(false),
                step_delay_ms: AtomicU64::new(clamp_delay(step_delay)),
            }),
        }
    }

    /// Requests the running search to stop. Observed at the next step boundary.
    pub fn stop(&self) {
        self.shared.cancel.store(true, Ordering::SeqCst);
    }

    pub fn cancel_requested(&self) -> bool {
        self.shared.cancel.load(Ordering::SeqCst)
    }

    /// Sets the pause after each visited cell, clamped to
    /// [MIN_STEP_DELAY_MS]..=[MAX_STEP_DELAY_MS] milliseconds. Takes effect at the next pause.
    /// Returns the delay actually applied.
    pub fn set_step_delay(&self, delay: Duration) -> Duration {
        let ms = clamp_delay(delay);
        self.shared.step_delay_ms.store(ms, Ordering::SeqCst);
        Duration::from_millis(ms)
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.shared.step_delay_ms.load(Ordering::SeqCst))
    }

    /// Pause between revealed path cells.
    pub fn path_delay(&self) -> Duration {
        self.step_delay() * PATH_DELAY_FACTOR
    }

    pub fn state(&self) -> SearchState {
        SearchState::from_u8(self.shared.state.load(Ordering::SeqCst))
    }

    pub fn is_running(&self) -> bool {
        self.state() == SearchState::Running
    }

    /// Claims the instance for a new run. Fails if a run is in progress.
    fn try_begin(&self) -> bool {
        let began = self
            .shared
            .state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |s| {
                (s != SearchState::Running as u8).then_some(SearchState::Running as u8)
            })
            .is_ok();
        if began {
            self.shared.cancel.store(false, Ordering::SeqCst);
        }
        began
    }

    fn finish(&self, state: SearchState) {
        self.shared.state.store(state as u8, Ordering::SeqCst);
    }
}

/// A* search with Manhattan heuristic over 4-connected grids. One run at a time per instance.
#[derive(Clone, Debug)]
pub struct PathSearch {
    controller: SearchController,
}

impl Default for PathSearch {
    fn default() -> PathSearch {
        PathSearch::new()
    }
}

impl PathSearch {
    pub fn new() -> PathSearch {
        PathSearch::with_step_delay(Duration::from_millis(DEFAULT_STEP_DELAY_MS))
    }

    pub fn with_step_delay(step_delay: Duration) -> PathSearch {
        PathSearch {
            controller: SearchController::new(step_delay),
        }
    }

    pub fn controller(&self) -> SearchController {
        self.controller.clone()
    }

    pub fn state(&self) -> SearchState {
        self.controller.state()
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    pub fn stop(&self) {
        self.controller.stop()
    }

    pub fn set_step_delay(&self, delay: Duration) -> Duration {
        self.controller.set_step_delay(delay)
    }

    /// Begins a stepwise run over `grid`, resetting its search state first. If the instance is
    /// already running or the grid lacks an endpoint, the returned run is already finished with
    /// the matching outcome and the grid is left alone.
    pub fn start<'g>(&self, grid: &'g mut Grid) -> SearchRun<'g> {
        SearchRun::begin(grid, &self.controller)
    }

    /// Runs a search to completion without pausing.
    pub fn find_path(&self, grid: &mut Grid) -> SearchOutcome {
        self.start(grid).run_to_completion()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_delay_is_clamped() {
        let search = PathSearch::with_step_delay(Duration::from_secs(5));
        assert_eq!(search.controller().step_delay(), Duration::from_millis(1000));
        assert_eq!(
            search.set_step_delay(Duration::ZERO),
            Duration::from_millis(1)
        );
        search.set_step_delay(Duration::from_millis(40));
        let controller = search.controller();
        assert_eq!(controller.step_delay(), Duration::from_millis(40));
        assert_eq!(controller.path_delay(), Duration::from_millis(80));
    }

    #[test]
    fn begins_idle() {
        let search = PathSearch::new();
        assert_eq!(search.state(), SearchState::Idle);
        assert!(!search.is_running());
        assert_eq!(
            search.controller().step_delay(),
            Duration::from_millis(DEFAULT_STEP_DELAY_MS)
        );
    }

    #[test]
    fn outcome_accessors() {
        assert!(SearchOutcome::AlreadyRunning.result().is_none());
        assert!(SearchOutcome::MissingEndpoint.into_result().is_none());
        let result = SearchResult {
            found: false,
            path: Vec::new(),
            visited_order: vec![Coord::new(0, 1)],
            nodes_explored: 1,
            cost: 0,
            elapsed: Duration::ZERO,
        };
        let outcome = SearchOutcome::Cancelled(result.clone());
        assert!(!outcome.is_found());
        assert_eq!(outcome.result(), Some(&result));
    }
}
