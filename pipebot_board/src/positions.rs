use itertools::Itertools;
use std::cmp::Ordering;
use std::fmt;

use crate::collision::{self, SlidePath};
use crate::trajectory::TrajectoryTable;
use crate::{Direction, Robot, DIRECTIONS, ROBOTS, ROBOT_COUNT};

/// The type a single coordinate of a position is encoded as.
///
/// A u16 is more than enough for every board this crate supports, see
/// [`MAX_SIDE_LENGTH`](crate::MAX_SIDE_LENGTH).
pub type PositionEncoding = u16;

/// A cell on the board.
///
/// Columns grow to the right and rows grow downwards, so `(0, 0)` is the upper left corner.
/// Moving [`Up`](Direction::Up) decreases the row, moving [`Left`](Direction::Left) decreases
/// the column.
#[derive(Copy, Clone, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    column: PositionEncoding,
    row: PositionEncoding,
}

/// Positions of all robots on the board.
///
/// Every color has a fixed slot, so two configurations are equal exactly when every robot is on
/// the same cell in both. This makes `RobotPositions` usable as a hash key without any risk of
/// two different configurations sharing a key.
#[derive(Clone, Default, Hash, PartialEq, Eq)]
pub struct RobotPositions {
    robots: [Option<Position>; ROBOT_COUNT],
}

impl Position {
    /// Creates a new position.
    ///
    /// The caller has to make sure, that the given coordinates are within the bounds of the board.
    pub const fn new(column: PositionEncoding, row: PositionEncoding) -> Self {
        Position { column, row }
    }

    /// Creates the position with the linear `key` on a board with `side_length`.
    pub fn from_key(key: usize, side_length: PositionEncoding) -> Self {
        let side_length = side_length as usize;
        Position::new(
            (key % side_length) as PositionEncoding,
            (key / side_length) as PositionEncoding,
        )
    }

    /// Returns the column the position is in.
    #[inline(always)]
    pub fn column(&self) -> PositionEncoding {
        self.column
    }

    /// Returns the row the position is in.
    #[inline(always)]
    pub fn row(&self) -> PositionEncoding {
        self.row
    }

    /// Returns the linear key `row * side_length + column` of the position.
    #[inline(always)]
    pub fn key(&self, side_length: PositionEncoding) -> usize {
        self.row as usize * side_length as usize + self.column as usize
    }

    /// Checks if the position lies on a board with `side_length`.
    pub fn in_bounds(&self, side_length: PositionEncoding) -> bool {
        self.column < side_length && self.row < side_length
    }

    /// Moves the position one field to `direction`.
    ///
    /// Returns `None` if this would leave the board given by `side_length`.
    pub fn to_direction(self, direction: Direction, side_length: PositionEncoding) -> Option<Self> {
        let Position { column, row } = self;
        let moved = match direction {
            Direction::Up => Position::new(column, row.checked_sub(1)?),
            Direction::Down => Position::new(column, row + 1),
            Direction::Left => Position::new(column.checked_sub(1)?, row),
            Direction::Right => Position::new(column + 1, row),
        };
        Some(moved).filter(|pos| pos.in_bounds(side_length))
    }

    /// Moves the position one field against `direction`.
    ///
    /// Only used for positions that have been reached by moving in `direction`, so the result is
    /// always on the board.
    pub(crate) fn step_back(self, direction: Direction) -> Self {
        let Position { column, row } = self;
        match direction {
            Direction::Up => Position::new(column, row + 1),
            Direction::Down => Position::new(column, row - 1),
            Direction::Left => Position::new(column + 1, row),
            Direction::Right => Position::new(column - 1, row),
        }
    }

    /// Checks if `other` can be reached from `self` by moving along the axis of `direction`.
    ///
    /// For vertical directions both positions have to share their column, for horizontal
    /// directions their row.
    #[inline]
    pub fn is_aligned(&self, other: &Position, direction: Direction) -> bool {
        match direction {
            Direction::Up | Direction::Down => self.column == other.column,
            Direction::Left | Direction::Right => self.row == other.row,
        }
    }

    /// Orders two positions by the order in which a robot moving in `direction` would pass them.
    ///
    /// Only the coordinate that changes along `direction` is compared, so the result is only
    /// meaningful for [aligned](Position::is_aligned) positions.
    #[inline]
    pub fn cmp_along(&self, other: &Position, direction: Direction) -> Ordering {
        match direction {
            Direction::Up => other.row.cmp(&self.row),
            Direction::Down => self.row.cmp(&other.row),
            Direction::Left => other.column.cmp(&self.column),
            Direction::Right => self.column.cmp(&other.column),
        }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.column, self.row)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(&format!("({}, {})", self.column, self.row))
    }
}

impl From<Position> for (PositionEncoding, PositionEncoding) {
    fn from(pos: Position) -> Self {
        (pos.column(), pos.row())
    }
}

impl From<(PositionEncoding, PositionEncoding)> for Position {
    fn from((col, row): (PositionEncoding, PositionEncoding)) -> Self {
        Self::new(col, row)
    }
}

impl RobotPositions {
    /// Creates a configuration without any robots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration from pairs of robots and `(column, row)` tuples.
    ///
    /// If a robot appears more than once, the last position wins.
    pub fn from_tuples(positions: &[(Robot, (PositionEncoding, PositionEncoding))]) -> Self {
        let mut robots = Self::new();
        for &(robot, pos) in positions {
            robots.set_robot(robot, pos.into());
        }
        robots
    }

    /// Returns the position of `robot` if it is on the board.
    #[inline(always)]
    pub fn get(&self, robot: Robot) -> Option<Position> {
        self.robots[robot.index()]
    }

    /// Sets the `robot` to `new_position`.
    pub(crate) fn set_robot(&mut self, robot: Robot, new_position: Position) {
        self.robots[robot.index()] = Some(new_position);
    }

    /// Iterates over all robots on the board in color order.
    pub fn iter(&self) -> impl Iterator<Item = (Robot, Position)> + '_ {
        ROBOTS
            .iter()
            .zip(self.robots.iter())
            .filter_map(|(&robot, pos)| pos.map(|pos| (robot, pos)))
    }

    /// Returns the number of robots on the board.
    pub fn len(&self) -> usize {
        self.robots.iter().flatten().count()
    }

    /// Checks if there are no robots on the board.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks if `pos` has any robot on it.
    #[inline(always)]
    pub fn contains_any_robot(&self, pos: Position) -> bool {
        self.robots.contains(&Some(pos))
    }

    /// Checks if the `robot` is on `pos`.
    #[inline(always)]
    pub fn contains_colored_robot(&self, robot: Robot, pos: Position) -> bool {
        self.get(robot) == Some(pos)
    }

    /// Returns the field `robot` stops on when moved in `direction`.
    ///
    /// Returns `None` if the robot is not on the board or the move is not possible.
    pub fn slide(
        &self,
        table: &TrajectoryTable,
        robot: Robot,
        direction: Direction,
    ) -> Option<Position> {
        let skeleton = table.skeleton(self.get(robot)?, robot, direction)?;
        collision::resolve_end(skeleton, robot, self)
    }

    /// Like [`slide`](RobotPositions::slide), but returns the whole path the robot takes including
    /// every bounce.
    pub fn slide_path(
        &self,
        table: &TrajectoryTable,
        robot: Robot,
        direction: Direction,
    ) -> Option<SlidePath> {
        let skeleton = table.skeleton(self.get(robot)?, robot, direction)?;
        collision::resolve_path(skeleton, robot, self)
    }

    /// Moves `robot` in the given `direction` until it is stopped.
    ///
    /// Returns `None` if the move is not possible.
    pub fn move_in_direction(
        mut self,
        table: &TrajectoryTable,
        robot: Robot,
        direction: Direction,
    ) -> Option<Self> {
        let end = self.slide(table, robot, direction)?;
        self.set_robot(robot, end);
        Some(self)
    }

    /// Creates an Iterator over all positions reachable in one move that differ from `self`.
    ///
    /// Moves are generated robot by robot in color order, and for each robot in the order up,
    /// down, left, right.
    pub fn reachable_positions<'a>(
        &self,
        table: &'a TrajectoryTable,
    ) -> impl Iterator<Item = (RobotPositions, (Robot, Direction))> + 'a {
        let initial_pos = self.clone();
        ROBOTS
            .iter()
            .cartesian_product(DIRECTIONS.iter())
            .filter_map(move |(&robot, &direction)| {
                initial_pos
                    .clone()
                    .move_in_direction(table, robot, direction)
                    .filter(|pos| pos != &initial_pos)
                    .map(|pos| (pos, (robot, direction)))
            })
    }
}

impl fmt::Debug for RobotPositions {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let robots = self
            .robots
            .iter()
            .map(|pos| match pos {
                Some(pos) => format!("{:?}", pos),
                None => "-".to_string(),
            })
            .join(" | ");
        write!(fmt, "[{}]", robots)
    }
}

impl fmt::Display for RobotPositions {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let lines = self
            .iter()
            .map(|(robot, pos)| format!("{}: {}", robot, pos))
            .join("\n");
        write!(fmt, "{}", lines)
    }
}
