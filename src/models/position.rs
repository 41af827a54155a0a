//! Grid positions and cardinal directions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell coordinate on the warehouse floor.
///
/// `x` grows to the right (east), `y` grows upwards (north).
///
/// # Examples
///
/// ```
/// use u_picking::models::{Direction, Position};
///
/// let p = Position::new(2, 3);
/// assert_eq!(p.step(Direction::North), Position::new(2, 4));
/// assert_eq!(p.manhattan(Position::new(0, 0)), 5);
/// assert_eq!(p.to_string(), "(2, 3)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Column index.
    pub x: i32,
    /// Row index.
    pub y: i32,
}

impl Position {
    /// Creates a new position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the neighboring position one step in `direction`.
    ///
    /// The result may lie outside any grid; bounds are checked by the grid.
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance to `other`.
    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Returns `true` if `other` is one of the four cardinal neighbors.
    pub fn is_adjacent(self, other: Position) -> bool {
        self.manhattan(other) == 1
    }

    /// Direction of a single straight move from `self` to `other`.
    ///
    /// Returns `None` for identical positions or diagonal offsets.
    pub fn direction_to(self, other: Position) -> Option<Direction> {
        match (other.x - self.x, other.y - self.y) {
            (0, dy) if dy > 0 => Some(Direction::North),
            (0, dy) if dy < 0 => Some(Direction::South),
            (dx, 0) if dx > 0 => Some(Direction::East),
            (dx, 0) if dx < 0 => Some(Direction::West),
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// A cardinal direction, used both for movement and for the side of a
/// shelf a worker approaches it from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All directions in tie-break order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Unit `(dx, dy)` offset of this direction.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// Position of this direction in [`Direction::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::East => 2,
            Direction::West => 3,
        }
    }

    /// Word used in worker instructions.
    pub const fn movement_word(self) -> &'static str {
        match self {
            Direction::North => "up",
            Direction::South => "down",
            Direction::East => "right",
            Direction::West => "left",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::North => "N",
            Direction::South => "S",
            Direction::East => "E",
            Direction::West => "W",
        };
        f.write_str(s)
    }
}
