/// Fuzzes the search by checking on many random grids that a path is found exactly when the goal
/// is reachable, that its length matches a breadth-first search, and that repeated runs agree.
use grid_pathviz::{Coord, Grid, GridState, PathSearch, SearchOutcome};
use rand::prelude::*;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

fn random_grid(rows: usize, cols: usize, rng: &mut StdRng, density: f64) -> Grid {
    let mut grid = Grid::new(rows, cols).unwrap();
    grid.set_goal(rows - 1, cols - 1).unwrap();
    grid.set_start(0, 0).unwrap();
    for row in 0..rows {
        for col in 0..cols {
            if rng.gen_bool(density) {
                grid.set_obstacle(row, col, true);
            }
        }
    }
    grid
}

fn random_endpoints(grid: &mut Grid, rng: &mut StdRng) {
    let start = Coord::new(rng.gen_range(0..grid.rows()), rng.gen_range(0..grid.cols()));
    let goal = loop {
        let goal = Coord::new(rng.gen_range(0..grid.rows()), rng.gen_range(0..grid.cols()));
        if goal != start {
            break goal;
        }
    };
    // Going through the exchange format sidesteps the ordering constraints of set_start/set_goal.
    let mut state = grid.export_state();
    state.start = start;
    state.goal = goal;
    grid.import_state(&state).unwrap();
}

/// Length in cells of the shortest 4-connected path, both endpoints included.
fn bfs_path_len(grid: &Grid) -> Option<usize> {
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut dist = vec![usize::MAX; rows * cols];
    let start = grid.start();
    dist[start.row * cols + start.col] = 0;
    let mut queue = VecDeque::from([start]);
    while let Some(p) = queue.pop_front() {
        let d = dist[p.row * cols + p.col];
        if p == grid.goal() {
            return Some(d + 1);
        }
        for n in grid.neighbours(p) {
            let ix = n.row * cols + n.col;
            if dist[ix] == usize::MAX && !grid.cell(n).unwrap().is_obstacle {
                dist[ix] = d + 1;
                queue.push_back(n);
            }
        }
    }
    None
}

/// Cheapest cost from start to goal, where entering a cell costs its weight.
fn dijkstra_cost(grid: &Grid) -> Option<u64> {
    let cols = grid.cols();
    let mut dist = vec![u64::MAX; grid.rows() * cols];
    let start = grid.start();
    dist[start.row * cols + start.col] = 0;
    let mut heap = BinaryHeap::from([Reverse((0u64, start))]);
    while let Some(Reverse((d, p))) = heap.pop() {
        if p == grid.goal() {
            return Some(d);
        }
        if d > dist[p.row * cols + p.col] {
            continue;
        }
        for n in grid.neighbours(p) {
            let cell = grid.cell(n).unwrap();
            if cell.is_obstacle {
                continue;
            }
            let next = d + u64::from(cell.weight);
            let ix = n.row * cols + n.col;
            if next < dist[ix] {
                dist[ix] = next;
                heap.push(Reverse((next, n)));
            }
        }
    }
    None
}

fn visualize_grid(grid: &Grid) {
    print!("{grid}");
}

fn is_valid_path(grid: &Grid, path: &[Coord]) -> bool {
    path.first() == Some(&grid.start())
        && path.last() == Some(&grid.goal())
        && path.windows(2).all(|w| w[0].manhattan_distance(&w[1]) == 1)
        && path.iter().all(|c| !grid.cell(*c).unwrap().is_obstacle)
}

#[test]
fn fuzz() {
    const N_GRIDS: usize = 2000;
    let mut rng = StdRng::seed_from_u64(0);
    let search = PathSearch::new();
    for (rows, cols) in [(5, 5), (8, 12), (10, 10)] {
        for _ in 0..N_GRIDS {
            let mut grid = random_grid(rows, cols, &mut rng, 0.35);
            random_endpoints(&mut grid, &mut rng);
            let reachable = grid.reachable(grid.start(), grid.goal());
            let expected = bfs_path_len(&grid);
            let outcome = search.find_path(&mut grid);
            // Show the grid if the search disagrees with the oracles
            if outcome.is_found() != reachable || outcome.is_found() != expected.is_some() {
                visualize_grid(&grid);
            }
            assert_eq!(outcome.is_found(), reachable);
            let result = outcome.into_result().unwrap();
            assert_eq!(result.nodes_explored, result.visited_order.len());
            assert!(!result.visited_order.contains(&grid.start()));
            assert!(!result.visited_order.contains(&grid.goal()));
            match expected {
                Some(len) => {
                    if result.path.len() != len {
                        visualize_grid(&grid);
                    }
                    assert_eq!(result.path.len(), len);
                    assert_eq!(result.cost as usize, len - 1);
                    assert!(is_valid_path(&grid, &result.path));
                }
                None => assert!(result.path.is_empty()),
            }
        }
    }
}

#[test]
fn open_grids_follow_manhattan_distance() {
    let mut rng = StdRng::seed_from_u64(1);
    let search = PathSearch::new();
    for _ in 0..500 {
        let rows = rng.gen_range(2..20);
        let cols = rng.gen_range(2..20);
        let mut grid = Grid::new(rows, cols).unwrap();
        random_endpoints(&mut grid, &mut rng);
        let distance = grid.start().manhattan_distance(&grid.goal());
        let result = search.find_path(&mut grid).into_result().unwrap();
        assert!(result.found);
        assert_eq!(result.path.len(), distance + 1);
    }
}

#[test]
fn weighted_paths_are_optimal() {
    let mut rng = StdRng::seed_from_u64(2);
    let search = PathSearch::new();
    for _ in 0..500 {
        let mut grid = random_grid(8, 8, &mut rng, 0.2);
        random_endpoints(&mut grid, &mut rng);
        let Some(unit_len) = bfs_path_len(&grid) else {
            continue;
        };
        for row in 0..8 {
            for col in 0..8 {
                grid.set_weight(row, col, rng.gen_range(1..5)).unwrap();
            }
        }
        let expected = dijkstra_cost(&grid);
        let result = search.find_path(&mut grid).into_result().unwrap();
        assert!(result.found);
        assert!(result.path.len() >= unit_len);
        let summed: u64 = result.path[1..]
            .iter()
            .map(|c| u64::from(grid.cell(*c).unwrap().weight))
            .sum();
        assert_eq!(result.cost, summed);
        if Some(result.cost) != expected {
            visualize_grid(&grid);
        }
        assert_eq!(Some(result.cost), expected);
        assert!(is_valid_path(&grid, &result.path));
    }
}

#[test]
fn repeated_searches_are_deterministic() {
    let mut rng = StdRng::seed_from_u64(3);
    let search = PathSearch::new();
    for _ in 0..200 {
        let mut grid = random_grid(12, 12, &mut rng, 0.3);
        random_endpoints(&mut grid, &mut rng);
        let first = search.find_path(&mut grid);
        grid.reset_search_state();
        let second = search.find_path(&mut grid);
        let (first, second) = (first.into_result().unwrap(), second.into_result().unwrap());
        assert_eq!(first.path, second.path);
        assert_eq!(first.visited_order, second.visited_order);
    }
}

#[test]
fn export_import_round_trip() {
    let mut rng = StdRng::seed_from_u64(4);
    for _ in 0..200 {
        let rows = rng.gen_range(1..15);
        let cols = rng.gen_range(2..15);
        let mut grid = random_grid(rows, cols, &mut rng, 0.4);
        random_endpoints(&mut grid, &mut rng);
        grid.set_weight(0, 1, rng.gen_range(1..4)).unwrap();

        let json = grid.export_json().unwrap();
        let state = GridState::from_json(&json).unwrap();
        assert_eq!(state, grid.export_state());

        let mut restored = Grid::new(3, 3).unwrap();
        restored.import_json(&json).unwrap();
        assert_eq!(restored, grid);
    }
}

#[test]
fn scenario_outcomes() {
    // A: open 5x5 grid from corner to corner.
    let mut grid = Grid::new(5, 5).unwrap();
    grid.set_goal(4, 4).unwrap();
    grid.set_start(0, 0).unwrap();
    let search = PathSearch::new();
    let result = search.find_path(&mut grid).into_result().unwrap();
    assert_eq!(result.path.len(), 9);
    assert_eq!(result.nodes_explored, 7);

    // C: goal walled off.
    let mut grid = Grid::new(3, 3).unwrap();
    for (row, col) in [(0, 1), (1, 0), (1, 1), (1, 2), (2, 1)] {
        grid.toggle_obstacle(row, col);
    }
    assert!(matches!(
        search.find_path(&mut grid),
        SearchOutcome::NotFound(_)
    ));

    // D: the start moved onto an obstacle is exported as the start only.
    let mut grid = Grid::new(5, 5).unwrap();
    grid.toggle_obstacle(2, 3);
    grid.set_start(2, 3).unwrap();
    let state = grid.export_state();
    assert_eq!(state.start, Coord::new(2, 3));
    assert!(state.obstacles.is_empty());
}
