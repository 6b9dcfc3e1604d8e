//! Open set of the A* search.
//!
//! Discovered cells live in an insertion-ordered map from flat cell index to
//! `(parent discovery index, best cost)`, the same layout as the parents map of
//! [pathfinding's astar](https://docs.rs/pathfinding/latest/pathfinding/directed/astar/index.html).
//! The discovery index doubles as the stable tie-breaker of the heap.
use fxhash::FxBuildHasher;
use indexmap::map::Entry::{Occupied, Vacant};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

const NO_PARENT: usize = usize::MAX;

#[derive(Debug, PartialEq, Eq)]
struct SmallestCostHolder {
    estimated_cost: u64,
    heuristic: u64,
    cost: u64,
    index: usize,
}

impl PartialOrd for SmallestCostHolder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SmallestCostHolder {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: lowest f first, then lowest h, then earliest discovery.
        other
            .estimated_cost
            .cmp(&self.estimated_cost)
            .then_with(|| other.heuristic.cmp(&self.heuristic))
            .then_with(|| other.index.cmp(&self.index))
            .then_with(|| other.cost.cmp(&self.cost))
    }
}

/// A cell taken off the frontier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FrontierNode {
    /// Discovery index, used for path reconstruction.
    pub index: usize,
    /// Flat cell index.
    pub cell: usize,
    /// Cost from the start.
    pub cost: u64,
}

#[derive(Debug)]
pub(crate) struct Frontier {
    to_see: BinaryHeap<SmallestCostHolder>,
    parents: FxIndexMap<usize, (usize, u64)>,
}

impl Frontier {
    pub fn new(start: usize, heuristic: u64) -> Frontier {
        let mut parents = FxIndexMap::default();
        parents.insert(start, (NO_PARENT, 0));
        let mut to_see = BinaryHeap::new();
        to_see.push(SmallestCostHolder {
            estimated_cost: heuristic,
            heuristic,
            cost: 0,
            index: 0,
        });
        Frontier { to_see, parents }
    }

    /// Pops the best open cell, discarding closed cells and entries superseded by a cheaper route.
    pub fn pop(&mut self, closed: &[bool]) -> Option<FrontierNode> {
        while let Some(SmallestCostHolder { cost, index, .. }) = self.to_see.pop() {
            let Some((&cell, &(_, best))) = self.parents.get_index(index) else {
                continue;
            };
            if closed[cell] || cost > best {
                continue;
            }
            return Some(FrontierNode { index, cell, cost });
        }
        None
    }

    /// Offers `cell` at `cost` via the node at `parent`. Returns whether this improved on the
    /// best known cost, in which case the cell is (re)queued under its original discovery index.
    pub fn relax(&mut self, cell: usize, parent: usize, cost: u64, heuristic: u64) -> bool {
        let index = match self.parents.entry(cell) {
            Vacant(e) => {
                let n = e.index();
                e.insert((parent, cost));
                n
            }
            Occupied(mut e) => {
                if e.get().1 > cost {
                    e.insert((parent, cost));
                    e.index()
                } else {
                    return false;
                }
            }
        };
        self.to_see.push(SmallestCostHolder {
            estimated_cost: cost.saturating_add(heuristic),
            heuristic,
            cost,
            index,
        });
        true
    }

    /// Flat cell indices from the start to the node at `index`.
    pub fn path_to(&self, index: usize) -> Vec<usize> {
        let mut path: Vec<usize> = std::iter::successors(Some(index), |&i| {
            self.parents
                .get_index(i)
                .map(|(_, &(parent, _))| parent)
                .filter(|&p| p != NO_PARENT)
        })
        .filter_map(|i| self.parents.get_index(i).map(|(&cell, _)| cell))
        .collect();
        path.reverse();
        path
    }

    /// Number of cells discovered so far, closed ones included.
    pub fn discovered(&self) -> usize {
        self.parents.len()
    }
}
