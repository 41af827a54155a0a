//! Uniform-cost shortest path on a 4-connected grid.
//!
//! # Algorithm
//!
//! Dijkstra's algorithm with a binary min-heap. Every move costs 1, so the
//! expansion order matches breadth-first search; the search stops as soon as
//! the target is popped. Predecessor links are kept in a dense array indexed
//! like the grid and walked back from the target to rebuild the path.
//!
//! # Complexity
//!
//! O(W·H · log(W·H)) per query in the worst case.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::models::{Cost, Grid, Position};

/// A shortest path between two cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPath {
    /// Visited cells, first is the start and last is the target.
    pub cells: Vec<Position>,
    /// Number of steps (`cells.len() - 1`).
    pub cost: Cost,
}

/// Computes the shortest path from `start` to `target`.
///
/// Shelf cells are impassable; worker markers are walkable. Returns `None`
/// when either endpoint is out of bounds, the target is a shelf, or no open
/// path connects the two cells.
///
/// # Examples
///
/// ```
/// use u_picking::models::{Cell, Grid, Position};
/// use u_picking::pathfinding::shortest_path;
///
/// let mut grid = Grid::new(3, 3);
/// grid.set(Position::new(1, 0), Cell::Shelf(1)).unwrap();
///
/// let path = shortest_path(&grid, Position::new(0, 0), Position::new(2, 0)).unwrap();
/// assert_eq!(path.cost, 4);
/// assert_eq!(path.cells.first(), Some(&Position::new(0, 0)));
/// assert_eq!(path.cells.last(), Some(&Position::new(2, 0)));
/// ```
pub fn shortest_path(grid: &Grid, start: Position, target: Position) -> Option<GridPath> {
    let start_idx = grid.index_of(start)?;
    let target_idx = grid.index_of(target)?;
    if !grid.is_passable(target) {
        return None;
    }
    if start_idx == target_idx {
        return Some(GridPath {
            cells: vec![start],
            cost: 0,
        });
    }

    let mut dist = vec![Cost::MAX; grid.len()];
    let mut prev: Vec<Option<usize>> = vec![None; grid.len()];
    let mut heap = BinaryHeap::new();

    dist[start_idx] = 0;
    heap.push(Reverse((0 as Cost, start_idx)));

    let mut found = false;
    while let Some(Reverse((cost, idx))) = heap.pop() {
        if idx == target_idx {
            found = true;
            break;
        }
        if cost > dist[idx] {
            continue;
        }

        let position = grid.position_of(idx);
        for neighbor in grid.open_neighbors(position) {
            // open_neighbors only yields in-bounds cells
            let Some(n_idx) = grid.index_of(neighbor) else {
                continue;
            };
            let next = cost + 1;
            if next < dist[n_idx] {
                dist[n_idx] = next;
                prev[n_idx] = Some(idx);
                heap.push(Reverse((next, n_idx)));
            }
        }
    }

    if !found {
        return None;
    }

    let mut cells = Vec::with_capacity(dist[target_idx] as usize + 1);
    let mut current = Some(target_idx);
    while let Some(idx) = current {
        cells.push(grid.position_of(idx));
        current = prev[idx];
    }
    cells.reverse();

    Some(GridPath {
        cells,
        cost: dist[target_idx],
    })
}
