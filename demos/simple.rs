use grid_pathviz::{Config, SearchEvent, SearchOutcome, Visualizer};
use std::time::Duration;

// A path is found around a wall on a grid with shape
// ..........
// ..S.......
// ..........
// ..........
// ##########   (open at the right end)
// ..........
// .......G..
// S marks the start, G the goal
#[tokio::main]
async fn main() -> grid_pathviz::Result<()> {
    let config = Config::from_toml_str("[grid]\nrows = 10\ncols = 10\n")?;
    let mut viz = Visualizer::new(config)?;
    for col in 0..9 {
        viz.toggle_obstacle(4, col);
    }
    viz.set_step_delay(Duration::from_millis(5));

    let outcome = viz
        .run_animated(|grid, event| match event {
            SearchEvent::NodeVisited(coord) => println!("visited {coord}"),
            SearchEvent::PathCellRevealed(coord) => println!("path {coord}"),
            SearchEvent::Finished(_) | SearchEvent::Cancelled(_) => print!("\n{grid}"),
        })
        .await;

    match outcome {
        SearchOutcome::Found(result) => println!(
            "Path of {} cells found after exploring {} cells",
            result.path.len(),
            result.nodes_explored
        ),
        other => println!("No path: {other:?}"),
    }
    Ok(())
}
