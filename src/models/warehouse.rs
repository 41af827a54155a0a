//! Warehouse layout: floor grid, worker markers and the product catalog.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Cell, Grid, ItemId, Position};
use crate::error::{PickingError, PickingResult};

/// A warehouse floor with shelves, a worker start and a worker end.
///
/// Several products may share one shelf cell; the cell keeps the id of the
/// first product placed on it.
///
/// # Examples
///
/// ```
/// use u_picking::models::{Position, Warehouse};
///
/// let mut wh = Warehouse::new(10, 5, Position::new(0, 0), Position::new(9, 0)).unwrap();
/// wh.add_product(101, Position::new(3, 2)).unwrap();
/// wh.add_product(102, Position::new(3, 2)).unwrap();
/// assert_eq!(wh.product_position(102), Some(Position::new(3, 2)));
/// assert_eq!(wh.num_products(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    grid: Grid,
    start: Position,
    end: Position,
    catalog: BTreeMap<ItemId, Position>,
}

impl Warehouse {
    /// Creates an empty warehouse. Start and end may coincide.
    pub fn new(width: i32, height: i32, start: Position, end: Position) -> PickingResult<Self> {
        let mut grid = Grid::new(width, height);
        grid.set(end, Cell::WorkerEnd)?;
        grid.set(start, Cell::WorkerStart)?;
        Ok(Self {
            grid,
            start,
            end,
            catalog: BTreeMap::new(),
        })
    }

    /// Generates a warehouse with `item_count` products (ids `1..=item_count`)
    /// on distinct random open cells.
    ///
    /// Fewer products are placed if the floor runs out of free cells.
    pub fn random<R: Rng + ?Sized>(
        width: i32,
        height: i32,
        item_count: usize,
        start: Position,
        end: Position,
        rng: &mut R,
    ) -> PickingResult<Self> {
        let mut warehouse = Self::new(width, height, start, end)?;

        let mut free: Vec<Position> = (0..warehouse.grid.len())
            .map(|i| warehouse.grid.position_of(i))
            .filter(|&p| p != start && p != end)
            .collect();
        free.shuffle(rng);

        for (id, position) in (1..=item_count as ItemId).zip(free) {
            warehouse.add_product(id, position)?;
        }
        Ok(warehouse)
    }

    /// Places a product on a shelf at `position`.
    ///
    /// Fails if the position is out of bounds, is the worker start or end,
    /// or the id is already in the catalog.
    pub fn add_product(&mut self, id: ItemId, position: Position) -> PickingResult<()> {
        if self.catalog.contains_key(&id) {
            return Err(PickingError::DuplicateItem(id));
        }
        match self.grid.get(position) {
            None => {
                return Err(PickingError::OutOfBounds {
                    position,
                    width: self.grid.width(),
                    height: self.grid.height(),
                })
            }
            Some(Cell::WorkerStart | Cell::WorkerEnd | Cell::Wall) => {
                return Err(PickingError::OccupiedCell(position))
            }
            Some(Cell::Open) => self.grid.set(position, Cell::Shelf(id))?,
            Some(Cell::Shelf(_)) => {}
        }
        self.catalog.insert(id, position);
        Ok(())
    }

    /// Blocks a cell without listing a product on it (walls, pillars).
    pub fn add_obstacle(&mut self, position: Position) -> PickingResult<()> {
        match self.grid.get(position) {
            Some(Cell::Open) => self.grid.set(position, Cell::Wall),
            Some(_) => Err(PickingError::OccupiedCell(position)),
            None => Err(PickingError::OutOfBounds {
                position,
                width: self.grid.width(),
                height: self.grid.height(),
            }),
        }
    }

    /// The floor grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Worker start position.
    pub fn start(&self) -> Position {
        self.start
    }

    /// Worker end position.
    pub fn end(&self) -> Position {
        self.end
    }

    /// Shelf position of a product.
    pub fn product_position(&self, id: ItemId) -> Option<Position> {
        self.catalog.get(&id).copied()
    }

    /// All catalog entries in id order.
    pub fn products(&self) -> impl Iterator<Item = (ItemId, Position)> + '_ {
        self.catalog.iter().map(|(&id, &p)| (id, p))
    }

    /// Number of catalog entries.
    pub fn num_products(&self) -> usize {
        self.catalog.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_markers_on_grid() {
        let wh = Warehouse::new(4, 4, Position::new(0, 0), Position::new(3, 3)).expect("valid");
        assert_eq!(wh.grid().get(Position::new(0, 0)), Some(Cell::WorkerStart));
        assert_eq!(wh.grid().get(Position::new(3, 3)), Some(Cell::WorkerEnd));
    }

    #[test]
    fn test_start_out_of_bounds() {
        let err = Warehouse::new(4, 4, Position::new(4, 0), Position::new(0, 0)).unwrap_err();
        assert!(matches!(err, PickingError::OutOfBounds { .. }));
    }

    #[test]
    fn test_product_on_marker_rejected() {
        let mut wh = Warehouse::new(4, 4, Position::new(0, 0), Position::new(3, 3)).expect("valid");
        let err = wh.add_product(1, Position::new(3, 3)).unwrap_err();
        assert!(matches!(err, PickingError::OccupiedCell(_)));
    }

    #[test]
    fn test_shared_shelf_keeps_first_id() {
        let mut wh = Warehouse::new(4, 4, Position::new(0, 0), Position::new(0, 0)).expect("valid");
        wh.add_product(7, Position::new(2, 2)).expect("free");
        wh.add_product(8, Position::new(2, 2)).expect("shared");
        assert_eq!(wh.grid().get(Position::new(2, 2)), Some(Cell::Shelf(7)));
        assert_eq!(wh.num_products(), 2);
    }

    #[test]
    fn test_duplicate_product_id_rejected() {
        let mut wh = Warehouse::new(4, 4, Position::new(0, 0), Position::new(0, 0)).expect("valid");
        wh.add_product(7, Position::new(2, 2)).expect("free");
        assert!(wh.add_product(7, Position::new(1, 2)).is_err());
    }

    #[test]
    fn test_obstacle_blocks_cell() {
        let mut wh = Warehouse::new(4, 4, Position::new(0, 0), Position::new(0, 0)).expect("valid");
        wh.add_obstacle(Position::new(1, 1)).expect("free");
        assert!(!wh.grid().is_passable(Position::new(1, 1)));
        assert_eq!(wh.grid().get(Position::new(1, 1)), Some(Cell::Wall));
        assert_eq!(wh.num_products(), 0);
    }

    #[test]
    fn test_largest_item_id_is_not_a_wall() {
        let mut wh = Warehouse::new(4, 4, Position::new(0, 0), Position::new(0, 0)).expect("valid");
        wh.add_obstacle(Position::new(1, 1)).expect("free");
        wh.add_product(ItemId::MAX, Position::new(2, 2)).expect("free");
        assert_eq!(wh.grid().get(Position::new(2, 2)), Some(Cell::Shelf(ItemId::MAX)));

        let err = wh.add_product(5, Position::new(1, 1)).unwrap_err();
        assert!(matches!(err, PickingError::OccupiedCell(_)));
        assert_eq!(wh.product_position(ItemId::MAX), Some(Position::new(2, 2)));
    }

    #[test]
    fn test_random_layout() {
        let mut rng = StdRng::seed_from_u64(42);
        let wh = Warehouse::random(10, 8, 12, Position::new(0, 0), Position::new(9, 7), &mut rng)
            .expect("valid");
        assert_eq!(wh.num_products(), 12);
        for (_, p) in wh.products() {
            assert_ne!(p, wh.start());
            assert_ne!(p, wh.end());
            assert!(!wh.grid().is_passable(p));
        }
    }

    #[test]
    fn test_random_layout_caps_at_free_cells() {
        let mut rng = StdRng::seed_from_u64(1);
        let wh = Warehouse::random(2, 2, 10, Position::new(0, 0), Position::new(1, 1), &mut rng)
            .expect("valid");
        assert_eq!(wh.num_products(), 2);
    }
}
