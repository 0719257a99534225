//! Edge endpoints that feed values into the grid or collect them from it.

use std::collections::VecDeque;
use std::fmt;

use crate::emu::instruction::Direction;

/// Grid coordinate.
///
/// Links sit just outside the grid, so coordinates may be negative or past
/// the last column/row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub col: i32,
    pub row: i32,
}

impl Position {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Neighbouring coordinate in `direction`. Row 0 is the top.
    pub fn step(self, direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::new(self.col, self.row - 1),
            Direction::Right => Self::new(self.col + 1, self.row),
            Direction::Down => Self::new(self.col, self.row + 1),
            Direction::Left => Self::new(self.col - 1, self.row),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.col, self.row)
    }
}

/// An input or output queue attached to the grid edge.
///
/// Used for both roles; which one depends on the board map it is stored in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub(crate) id: usize,
    /// Direction pointing from the link into the grid.
    pub(crate) direction: Direction,
    pub(crate) values: VecDeque<i32>,
}

impl Link {
    pub fn new(id: usize, direction: Direction, values: impl IntoIterator<Item = i32>) -> Self {
        Self {
            id,
            direction,
            values: values.into_iter().collect(),
        }
    }

    /// Registration order within its map.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Queued values, oldest first.
    pub fn values(&self) -> &VecDeque<i32> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_step() {
        let origin = Position::new(0, 0);
        assert_eq!(origin.step(Direction::Up), Position::new(0, -1));
        assert_eq!(origin.step(Direction::Right), Position::new(1, 0));
        assert_eq!(origin.step(Direction::Down), Position::new(0, 1));
        assert_eq!(origin.step(Direction::Left), Position::new(-1, 0));

        for d in Direction::ALL {
            assert_eq!(origin.step(d).step(d.invert()), origin);
        }
    }

    #[test]
    fn test_link_queue() {
        let link = Link::new(2, Direction::Down, [1, 2, 3]);
        assert_eq!(link.id(), 2);
        assert_eq!(link.direction(), Direction::Down);
        assert_eq!(link.len(), 3);
        assert_eq!(link.values().front(), Some(&1));

        let empty = Link::new(0, Direction::Up, Vec::<i32>::new());
        assert!(empty.is_empty());
    }
}
