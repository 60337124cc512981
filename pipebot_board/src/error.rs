use crate::{Position, PositionEncoding, Robot};

/// The error type for [`BoardBuilder::build`](crate::BoardBuilder::build).
///
/// A malformed board is never corrected, the caller has to fix the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedBoard {
    /// No target has been set.
    MissingTarget,
    /// More than one target has been set.
    DuplicateTarget,
    /// The robot has been placed more than once.
    DuplicateRobot(Robot),
    /// Two robots start on the same field.
    RobotsOverlap(Position),
    /// A deflector has been placed on a robot's starting field.
    DeflectorOnRobot(Position),
    /// More than one deflector has been placed on the field.
    OverlappingDeflectors(Position),
    /// The target lies on a deflector, where no robot can ever stop.
    TargetOnDeflector(Position),
    /// A robot, deflector or the target lies outside of the board.
    OutOfBounds(Position),
    /// The robot that has to reach the target is not on the board.
    TargetRobotMissing(Robot),
    /// A flat wall boundary array does not match the size of the board.
    BoundaryLength {
        /// The number of entries needed for the board.
        expected: usize,
        /// The number of entries given.
        found: usize,
    },
    /// Boards have to be at least one field and at most
    /// [`MAX_SIDE_LENGTH`](crate::MAX_SIDE_LENGTH) fields wide.
    UnsupportedSideLength(PositionEncoding),
}

impl std::error::Error for MalformedBoard {}

impl std::fmt::Display for MalformedBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedBoard::MissingTarget => write!(f, "The board has no target"),
            MalformedBoard::DuplicateTarget => write!(f, "The board has more than one target"),
            MalformedBoard::DuplicateRobot(robot) => {
                write!(f, "The {} robot has been placed more than once", robot)
            }
            MalformedBoard::RobotsOverlap(pos) => {
                write!(f, "More than one robot has been placed on {}", pos)
            }
            MalformedBoard::DeflectorOnRobot(pos) => {
                write!(f, "A deflector has been placed on the robot at {}", pos)
            }
            MalformedBoard::OverlappingDeflectors(pos) => {
                write!(f, "More than one deflector has been placed on {}", pos)
            }
            MalformedBoard::TargetOnDeflector(pos) => {
                write!(f, "The target at {} lies on a deflector", pos)
            }
            MalformedBoard::OutOfBounds(pos) => write!(f, "{} lies outside of the board", pos),
            MalformedBoard::TargetRobotMissing(robot) => write!(
                f,
                "The target has to be reached by the {} robot, which is not on the board",
                robot
            ),
            MalformedBoard::BoundaryLength { expected, found } => write!(
                f,
                "Expected {} wall boundaries but {} were given",
                expected, found
            ),
            MalformedBoard::UnsupportedSideLength(side_length) => write!(
                f,
                "A side length of {} is not supported, it has to be between 1 and {}",
                side_length,
                crate::MAX_SIDE_LENGTH
            ),
        }
    }
}

/// The error returned when parsing an unknown robot color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColor(pub String);

impl std::error::Error for UnknownColor {}

impl std::fmt::Display for UnknownColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "There is no robot with the color \"{}\"", self.0)
    }
}
