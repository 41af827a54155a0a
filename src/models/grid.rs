//! Warehouse floor grid.

use serde::{Deserialize, Serialize};

use super::{ItemId, Position};
use crate::error::{PickingError, PickingResult};

/// State of a single floor cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    /// Walkable floor.
    Open,
    /// A shelf holding (at least) the given item. Impassable.
    Shelf(ItemId),
    /// Worker start marker. Walkable.
    WorkerStart,
    /// Worker end marker. Walkable.
    WorkerEnd,
    /// Wall or pillar without a product. Impassable.
    Wall,
}

impl Cell {
    /// Returns `true` if a worker may step onto this cell.
    pub fn is_passable(self) -> bool {
        !matches!(self, Cell::Shelf(_) | Cell::Wall)
    }
}

/// A dense `width × height` grid stored column-major (`x * height + y`).
///
/// # Examples
///
/// ```
/// use u_picking::models::{Cell, Grid, Position};
///
/// let mut grid = Grid::new(4, 3);
/// grid.set(Position::new(1, 1), Cell::Shelf(10)).unwrap();
/// assert!(!grid.is_passable(Position::new(1, 1)));
/// assert!(grid.is_passable(Position::new(0, 0)));
/// assert!(!grid.is_passable(Position::new(4, 0)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an all-open grid. Negative dimensions are clamped to zero.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![Cell::Open; cell_count(width, height)],
        }
    }

    /// Number of columns.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns `true` if `position` lies inside the grid.
    pub fn contains(&self, position: Position) -> bool {
        (0..self.width).contains(&position.x) && (0..self.height).contains(&position.y)
    }

    /// Dense index of an in-bounds position.
    pub fn index_of(&self, position: Position) -> Option<usize> {
        self.contains(position)
            .then(|| position.x as usize * self.height as usize + position.y as usize)
    }

    /// Position stored at a dense index.
    pub fn position_of(&self, index: usize) -> Position {
        let h = self.height as usize;
        Position::new((index / h) as i32, (index % h) as i32)
    }

    /// Cell at `position`, or `None` when out of bounds.
    pub fn get(&self, position: Position) -> Option<Cell> {
        self.index_of(position).map(|i| self.cells[i])
    }

    /// Overwrites the cell at `position`.
    pub fn set(&mut self, position: Position, cell: Cell) -> PickingResult<()> {
        let index = self.index_of(position).ok_or(PickingError::OutOfBounds {
            position,
            width: self.width,
            height: self.height,
        })?;
        self.cells[index] = cell;
        Ok(())
    }

    /// Returns `true` if `position` is in bounds and not a shelf.
    pub fn is_passable(&self, position: Position) -> bool {
        self.get(position).is_some_and(Cell::is_passable)
    }

    /// In-bounds passable cardinal neighbors of `position`.
    pub fn open_neighbors(&self, position: Position) -> impl Iterator<Item = Position> + '_ {
        super::Direction::ALL
            .into_iter()
            .map(move |d| position.step(d))
            .filter(move |&p| self.is_passable(p))
    }
}

fn cell_count(width: i32, height: i32) -> usize {
    width.max(0) as usize * height.max(0) as usize
}
