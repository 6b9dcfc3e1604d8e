use tokio::time::sleep;

use super::{PathSearch, SearchEvent, SearchOutcome, Step};
use crate::grid::Grid;

impl PathSearch {
    /// Runs a search, pausing after every step so each one can be rendered.
    ///
    /// `on_event` receives the grid and a [SearchEvent::NodeVisited] after every finalized cell,
    /// followed by the step delay, and a [SearchEvent::PathCellRevealed] after every revealed path
    /// cell, followed by the path delay. The delay is read after the callback returns, so a speed
    /// change made from the callback already applies to that pause. The run ends with
    /// [SearchEvent::Finished] or [SearchEvent::Cancelled]; rejected runs emit nothing.
    pub async fn run_animated<F>(&self, grid: &mut Grid, mut on_event: F) -> SearchOutcome
    where
        F: FnMut(&Grid, &SearchEvent),
    {
        let mut run = self.start(grid);
        loop {
            let (event, reveal) = match run.step() {
                Step::Visited(coord) => (SearchEvent::NodeVisited(coord), false),
                Step::PathCell(coord) => (SearchEvent::PathCellRevealed(coord), true),
                Step::Done(outcome) => {
                    match &outcome {
                        SearchOutcome::Found(result) | SearchOutcome::NotFound(result) => {
                            on_event(run.grid(), &SearchEvent::Finished(result.clone()))
                        }
                        SearchOutcome::Cancelled(result) => {
                            on_event(run.grid(), &SearchEvent::Cancelled(result.clone()))
                        }
                        SearchOutcome::AlreadyRunning | SearchOutcome::MissingEndpoint => {}
                    }
                    return outcome;
                }
            };
            on_event(run.grid(), &event);
            let delay = if reveal {
                self.controller.path_delay()
            } else {
                self.controller.step_delay()
            };
            sleep(delay).await;
        }
    }
}
