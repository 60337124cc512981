#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

//! Basic components to model a sliding robot puzzle with deflectors.
//!
//! The puzzle is played on a square board, usually 16x16, containing some walls, a handful of
//! colored robots, deflectors and a single target. A robot can be moved in all four directions
//! but only stops when it hits a wall, the edge of the board or another robot. This is counted as
//! one move. The goal is to move the robot of the target's color onto the target with as few
//! moves as possible.
//!
//! Deflectors, also called pipes, are diagonal pieces on a field which are owned by one color.
//! Robots of that color pass through them as if they weren't there. All other robots are turned by
//! 90 degrees, depending on the orientation of the deflector, and keep sliding in the new
//! direction. A robot never comes to rest on a deflector.
//!
//! The main components are the [`Board`](Board), which stores all static information of a puzzle
//! and is created with a [`BoardBuilder`](BoardBuilder), the [`TrajectoryTable`](TrajectoryTable)
//! which precomputes the path of every possible slide ignoring other robots, and the
//! [`Round`](Round) which combines the two. The robots themselves are stored in
//! [`RobotPositions`](RobotPositions), which also provides the functions to move them.

pub mod collision;
mod draw;
mod error;
pub mod generator;
mod positions;
pub mod trajectory;

use std::{fmt, str};

pub use crate::collision::SlidePath;
pub use crate::draw::draw_board;
pub use crate::error::{MalformedBoard, UnknownColor};
pub use crate::positions::{Position, PositionEncoding, RobotPositions};
pub use crate::trajectory::{Segment, Skeleton, TrajectoryTable};

/// The type used to store the walls on a board.
///
/// Indexed by column first, then by row.
pub type Walls = Vec<Vec<Field>>;

/// The side length of the standard board.
pub const STANDARD_SIDE_LENGTH: PositionEncoding = 16;

/// The largest supported side length.
pub const MAX_SIDE_LENGTH: PositionEncoding = 256;

/// All `Direction`s a robot can move in, in the order moves are generated.
pub const DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

/// The number of different robot colors.
pub const ROBOT_COUNT: usize = 5;

/// All robots defined by their color, in the order moves are generated.
pub const ROBOTS: [Robot; ROBOT_COUNT] = [
    Robot::Red,
    Robot::Yellow,
    Robot::Green,
    Robot::Blue,
    Robot::Black,
];

/// A field on the board.
///
/// Contains information regarding walls to the right and bottom of the field.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Field {
    /// Returns `true` if the wall in the down direction is set.
    pub down: bool,
    /// Returns `true` if the wall in the right direction is set.
    pub right: bool,
}

/// The robots identified by their color.
#[allow(missing_docs)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Robot {
    Red,
    Yellow,
    Green,
    Blue,
    Black,
}

/// The directions a robot can be moved in.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// The two orientations of a deflector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeflectorKind {
    /// Runs from the bottom left to the top right corner of a field, like `/`.
    ///
    /// Turns up into right, down into left, left into down and right into up.
    Slash,
    /// Runs from the top left to the bottom right corner of a field, like `\`.
    ///
    /// Turns up into left, down into right, left into up and right into down.
    Backslash,
}

/// A deflector placed on a field and owned by one robot color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Deflector {
    /// The orientation of the deflector.
    pub kind: DeflectorKind,
    /// The robot that passes through the deflector unaffected.
    pub owner: Robot,
}

/// The target of a puzzle: the robot that has to reach it and its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    robot: Robot,
    position: Position,
}

/// A validated puzzle containing walls, deflectors, the starting positions of the robots and the
/// target.
///
/// A board can only be created with a [`BoardBuilder`](BoardBuilder) and never changes after
/// creation.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    side_length: PositionEncoding,
    walls: Walls,
    /// The deflector on each field, indexed by [`Position::key`].
    deflectors: Vec<Option<Deflector>>,
    robots: RobotPositions,
    target: Target,
}

/// Collects the parts of a board and validates them when [building](BoardBuilder::build) it.
#[derive(Debug, Clone)]
pub struct BoardBuilder {
    side_length: PositionEncoding,
    walls: Walls,
    deflectors: Vec<(Position, Deflector)>,
    robots: Vec<(Robot, Position)>,
    targets: Vec<Target>,
}

/// One puzzle ready to be solved.
///
/// Pairs a board with its precomputed [`TrajectoryTable`](TrajectoryTable). A round never changes
/// after creation, so it can be shared between threads to solve the same board multiple times.
#[derive(Clone)]
pub struct Round {
    board: Board,
    trajectories: TrajectoryTable,
}

impl Robot {
    /// Returns the index of the robot in [`ROBOTS`](ROBOTS).
    #[inline(always)]
    pub fn index(self) -> usize {
        match self {
            Robot::Red => 0,
            Robot::Yellow => 1,
            Robot::Green => 2,
            Robot::Blue => 3,
            Robot::Black => 4,
        }
    }

    /// Returns the first letter of the color.
    pub fn initial(self) -> char {
        match self {
            Robot::Red => 'r',
            Robot::Yellow => 'y',
            Robot::Green => 'g',
            Robot::Blue => 'b',
            Robot::Black => 'k',
        }
    }
}

impl fmt::Display for Robot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let string = format!("{:?}", &self);
        f.pad(&string)
    }
}

impl str::FromStr for Robot {
    type Err = UnknownColor;

    /// Parses the lowercase color name or its [initial](Robot::initial).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "red" | "r" => Ok(Robot::Red),
            "yellow" | "y" => Ok(Robot::Yellow),
            "green" | "g" => Ok(Robot::Green),
            "blue" | "b" => Ok(Robot::Blue),
            "black" | "k" => Ok(Robot::Black),
            _ => Err(UnknownColor(s.to_string())),
        }
    }
}

impl Direction {
    /// Returns the index of the direction in [`DIRECTIONS`](DIRECTIONS).
    #[inline(always)]
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let string = format!("{:?}", &self);
        f.pad(&string)
    }
}

impl DeflectorKind {
    /// Returns the direction a robot moving in `direction` leaves the deflector in.
    pub fn bounce(self, direction: Direction) -> Direction {
        match (self, direction) {
            (DeflectorKind::Slash, Direction::Up) => Direction::Right,
            (DeflectorKind::Slash, Direction::Down) => Direction::Left,
            (DeflectorKind::Slash, Direction::Left) => Direction::Down,
            (DeflectorKind::Slash, Direction::Right) => Direction::Up,
            (DeflectorKind::Backslash, Direction::Up) => Direction::Left,
            (DeflectorKind::Backslash, Direction::Down) => Direction::Right,
            (DeflectorKind::Backslash, Direction::Left) => Direction::Up,
            (DeflectorKind::Backslash, Direction::Right) => Direction::Down,
        }
    }

    /// Returns the character the deflector looks like.
    pub fn symbol(self) -> char {
        match self {
            DeflectorKind::Slash => '/',
            DeflectorKind::Backslash => '\\',
        }
    }
}

impl Deflector {
    /// Creates a new deflector.
    pub fn new(kind: DeflectorKind, owner: Robot) -> Self {
        Self { kind, owner }
    }

    /// Returns the direction `robot` keeps moving in after entering the deflector's field while
    /// moving in `direction`.
    pub fn redirect(&self, robot: Robot, direction: Direction) -> Direction {
        if robot == self.owner {
            direction
        } else {
            self.kind.bounce(direction)
        }
    }
}

impl Target {
    /// Creates a target which has to be reached by `robot`.
    pub fn new(robot: Robot, position: Position) -> Self {
        Self { robot, position }
    }

    /// Returns the robot that has to reach the target.
    pub fn robot(&self) -> Robot {
        self.robot
    }

    /// Returns the position of the target.
    pub fn position(&self) -> Position {
        self.position
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(&format!("{} at {}", self.robot, self.position))
    }
}

/// Board impl containing code to create a board.
impl BoardBuilder {
    /// Starts an empty board with no walls with `side_length`.
    pub fn new(side_length: PositionEncoding) -> Self {
        Self {
            side_length,
            walls: vec![vec![Field::default(); side_length as usize]; side_length as usize],
            deflectors: Vec::new(),
            robots: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// Returns the side length of the board.
    pub fn side_length(&self) -> PositionEncoding {
        self.side_length
    }

    /// Sets walls from the flat boundary arrays used to store a board layout.
    ///
    /// `horizontal` contains one entry per pair of vertically adjacent fields, the entry at index
    /// `i` is the wall between the fields with the keys `i` and `i + side_length`. `vertical`
    /// contains one entry per pair of horizontally adjacent fields, the entry at index `i` is the
    /// wall between `(i % (side_length - 1), i / (side_length - 1))` and the field to its right.
    pub fn wall_boundaries(
        mut self,
        horizontal: &[bool],
        vertical: &[bool],
    ) -> Result<Self, MalformedBoard> {
        let side_length = self.side_length as usize;
        let expected = side_length * side_length.saturating_sub(1);
        for found in [horizontal.len(), vertical.len()].iter().copied() {
            if found != expected {
                return Err(MalformedBoard::BoundaryLength { expected, found });
            }
        }

        for (i, _) in horizontal.iter().enumerate().filter(|&(_, &wall)| wall) {
            self.walls[i % side_length][i / side_length].down = true;
        }
        for (i, _) in vertical.iter().enumerate().filter(|&(_, &wall)| wall) {
            self.walls[i % (side_length - 1)][i / (side_length - 1)].right = true;
        }
        Ok(self)
    }

    /// Starting from `[col, row]` sets `len` fields downwards to have a wall on the right side.
    ///
    /// # Panics
    /// Panics if the line leaves the board.
    #[inline]
    pub fn set_vertical_line(
        mut self,
        col: PositionEncoding,
        row: PositionEncoding,
        len: PositionEncoding,
    ) -> Self {
        for row in row..(row + len) {
            self.walls[col as usize][row as usize].right = true;
        }
        self
    }

    /// Starting from `[col, row]` sets `len` fields to the right to have a wall on the bottom side.
    ///
    /// # Panics
    /// Panics if the line leaves the board.
    #[inline]
    pub fn set_horizontal_line(
        mut self,
        col: PositionEncoding,
        row: PositionEncoding,
        width: PositionEncoding,
    ) -> Self {
        for col in col..(col + width) {
            self.walls[col as usize][row as usize].down = true;
        }
        self
    }

    /// Encloses a rectangle defined by the left upper corner and its width and height.
    /// The field (col, row) is inside the enclosure. Sides lying on the edge of the board are
    /// skipped.
    ///
    /// # Panics
    /// Panics if the rectangle leaves the board.
    pub fn enclose_lengths(
        mut self,
        col: PositionEncoding,
        row: PositionEncoding,
        len: PositionEncoding,
        width: PositionEncoding,
    ) -> Self {
        if row > 0 {
            self = self.set_horizontal_line(col, row - 1, width);
        }
        if row + len < self.side_length {
            self = self.set_horizontal_line(col, row + len - 1, width);
        }
        if col > 0 {
            self = self.set_vertical_line(col - 1, row, len);
        }
        if col + width < self.side_length {
            self = self.set_vertical_line(col + width - 1, row, len);
        }
        self
    }

    /// Creates a 2x2 block enclosed by walls in the center of the board.
    pub fn set_center_walls(self) -> Self {
        let point = self.side_length / 2 - 1;
        self.enclose_lengths(point, point, 2, 2)
    }

    /// Places a deflector of `kind` owned by `owner` on `pos`.
    pub fn deflector(mut self, pos: Position, kind: DeflectorKind, owner: Robot) -> Self {
        self.deflectors.push((pos, Deflector::new(kind, owner)));
        self
    }

    /// Places `robot` on its starting position `pos`.
    pub fn robot(mut self, robot: Robot, pos: Position) -> Self {
        self.robots.push((robot, pos));
        self
    }

    /// Sets the target `robot` has to reach at `pos`.
    pub fn target(mut self, robot: Robot, pos: Position) -> Self {
        self.targets.push(Target::new(robot, pos));
        self
    }

    /// Validates the collected parts and creates the board.
    pub fn build(self) -> Result<Board, MalformedBoard> {
        let side_length = self.side_length;
        if side_length == 0 || side_length > MAX_SIDE_LENGTH {
            return Err(MalformedBoard::UnsupportedSideLength(side_length));
        }
        let check_bounds = |pos: Position| {
            if pos.in_bounds(side_length) {
                Ok(pos)
            } else {
                Err(MalformedBoard::OutOfBounds(pos))
            }
        };

        let target = match self.targets.as_slice() {
            [] => return Err(MalformedBoard::MissingTarget),
            [target] => *target,
            _ => return Err(MalformedBoard::DuplicateTarget),
        };
        check_bounds(target.position)?;

        let mut robots = RobotPositions::new();
        for &(robot, pos) in &self.robots {
            check_bounds(pos)?;
            if robots.get(robot).is_some() {
                return Err(MalformedBoard::DuplicateRobot(robot));
            }
            if robots.contains_any_robot(pos) {
                return Err(MalformedBoard::RobotsOverlap(pos));
            }
            robots.set_robot(robot, pos);
        }
        if robots.get(target.robot).is_none() {
            return Err(MalformedBoard::TargetRobotMissing(target.robot));
        }

        let cells = side_length as usize * side_length as usize;
        let mut deflectors = vec![None; cells];
        for &(pos, deflector) in &self.deflectors {
            check_bounds(pos)?;
            if robots.contains_any_robot(pos) {
                return Err(MalformedBoard::DeflectorOnRobot(pos));
            }
            let field = &mut deflectors[pos.key(side_length)];
            if field.is_some() {
                return Err(MalformedBoard::OverlappingDeflectors(pos));
            }
            *field = Some(deflector);
        }
        if deflectors[target.position.key(side_length)].is_some() {
            return Err(MalformedBoard::TargetOnDeflector(target.position));
        }

        Ok(Board {
            side_length,
            walls: self.walls,
            deflectors,
            robots,
            target,
        })
    }
}

/// Board impl containing code to interact with a board.
impl Board {
    /// Creates a board from flat wall boundary arrays, see
    /// [`BoardBuilder::wall_boundaries`](BoardBuilder::wall_boundaries) for their layout.
    pub fn from_parts(
        side_length: PositionEncoding,
        horizontal_walls: &[bool],
        vertical_walls: &[bool],
        deflectors: &[(Position, Deflector)],
        robots: &[(Robot, Position)],
        target: Target,
    ) -> Result<Self, MalformedBoard> {
        if side_length == 0 || side_length > MAX_SIDE_LENGTH {
            return Err(MalformedBoard::UnsupportedSideLength(side_length));
        }
        let mut builder = BoardBuilder::new(side_length)
            .wall_boundaries(horizontal_walls, vertical_walls)?
            .target(target.robot, target.position);
        for &(pos, deflector) in deflectors {
            builder = builder.deflector(pos, deflector.kind, deflector.owner);
        }
        for &(robot, pos) in robots {
            builder = builder.robot(robot, pos);
        }
        builder.build()
    }

    /// Returns the side length of the board.
    pub fn side_length(&self) -> PositionEncoding {
        self.side_length
    }

    /// Returns a reference to the walls of the board.
    pub fn get_walls(&self) -> &Walls {
        &self.walls
    }

    /// Checks if a wall is next to `pos` in the given `direction`.
    ///
    /// The edge of the board is not considered a wall.
    pub fn has_wall(&self, pos: Position, direction: Direction) -> bool {
        let (col, row) = (pos.column() as usize, pos.row() as usize);
        match direction {
            Direction::Right => self.walls[col][row].right,
            Direction::Down => self.walls[col][row].down,
            Direction::Left => col > 0 && self.walls[col - 1][row].right,
            Direction::Up => row > 0 && self.walls[col][row - 1].down,
        }
    }

    /// Returns the field next to `pos` in `direction` if it can be entered from `pos`.
    pub fn step(&self, pos: Position, direction: Direction) -> Option<Position> {
        if self.has_wall(pos, direction) {
            return None;
        }
        pos.to_direction(direction, self.side_length)
    }

    /// Returns the deflector on `pos` if there is one.
    pub fn deflector_at(&self, pos: Position) -> Option<Deflector> {
        self.deflectors[pos.key(self.side_length)]
    }

    /// Iterates over all deflectors and their positions.
    pub fn deflectors(&self) -> impl Iterator<Item = (Position, Deflector)> + '_ {
        let side_length = self.side_length;
        self.deflectors
            .iter()
            .enumerate()
            .filter_map(move |(key, field)| field.map(|d| (Position::from_key(key, side_length), d)))
    }

    /// Returns the starting positions of the robots.
    pub fn robot_positions(&self) -> &RobotPositions {
        &self.robots
    }

    /// Returns the target to be reached.
    pub fn target(&self) -> Target {
        self.target
    }

    /// Checks if the target has been reached.
    pub fn target_reached(&self, positions: &RobotPositions) -> bool {
        positions.contains_colored_robot(self.target.robot, self.target.position)
    }
}

impl Round {
    /// Creates a new round and precomputes the trajectories on `board`.
    pub fn new(board: Board) -> Self {
        let trajectories = TrajectoryTable::new(&board);
        Self {
            board,
            trajectories,
        }
    }

    /// Returns the `Board` the robots move on.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the precomputed trajectories of the board.
    pub fn trajectories(&self) -> &TrajectoryTable {
        &self.trajectories
    }

    /// Returns the `Target` to be reached.
    pub fn target(&self) -> Target {
        self.board.target()
    }

    /// Returns the starting positions of the robots.
    pub fn start_positions(&self) -> &RobotPositions {
        self.board.robot_positions()
    }

    /// Checks if the target has been reached.
    pub fn target_reached(&self, positions: &RobotPositions) -> bool {
        self.board.target_reached(positions)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", draw_board(self))
    }
}

impl fmt::Debug for Round {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", draw_board(&self.board))
    }
}
