//! Solvers finding the shortest sequence of moves that brings a robot onto its target.
//!
//! All solvers work on a [`Round`](pipebot_board::Round), which holds the precomputed trajectories
//! of a board and can be shared between threads. The search state of a solver is private to one
//! call of [`Solver::solve`](Solver::solve).

mod breadth_first;
mod iterative_deepening;
mod util;

use getset::{CopyGetters, Getters};
use pipebot_board::{Board, Direction, Robot, RobotPositions, Round, SlidePath};

pub use breadth_first::BreadthFirst;
pub use iterative_deepening::IterativeDeepening;

/// The depth up to which [`IterativeDeepening`](IterativeDeepening) searches by default.
pub const DEFAULT_MAX_DEPTH: usize = 32;

pub trait Solver {
    /// Find a solution to get from the `start_positions` to the target of `round`.
    ///
    /// Returns `None` if the target can't be reached.
    fn solve(&mut self, round: &Round, start_positions: RobotPositions) -> Option<Path>;
}

/// Solves `board` with a breadth first search starting from the robots' starting positions.
///
/// Returns `None` if the board is unsolvable.
pub fn solve(board: Board) -> Option<Path> {
    let round = Round::new(board);
    let start = round.start_positions().clone();
    BreadthFirst::new().solve(&round, start)
}

/// A single move of one robot.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct Move {
    /// The robot that was moved.
    #[getset(get_copy = "pub")]
    robot: Robot,
    /// The direction the robot was moved in.
    #[getset(get_copy = "pub")]
    direction: Direction,
    /// The positions of all robots after the move.
    #[getset(get = "pub")]
    positions: RobotPositions,
    /// The path the robot took, including every deflector it bounced off.
    #[getset(get = "pub")]
    replay: SlidePath,
}

/// A path from a starting position to another position.
///
/// Contains the starting positions of the robots, their final positions and the moves leading
/// from the former to the latter.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct Path {
    start_pos: RobotPositions,
    end_pos: RobotPositions,
    moves: Vec<Move>,
}

impl Move {
    /// Creates a new move which resulted in `positions`.
    pub fn new(
        robot: Robot,
        direction: Direction,
        positions: RobotPositions,
        replay: SlidePath,
    ) -> Self {
        debug_assert_eq!(positions.get(robot), Some(replay.end()));
        Self {
            robot,
            direction,
            positions,
            replay,
        }
    }
}

impl Path {
    /// Creates a new path containing the starting and final positions of the robots and the moves
    /// in between.
    pub fn new(start_pos: RobotPositions, end_pos: RobotPositions, moves: Vec<Move>) -> Self {
        debug_assert!(!moves.is_empty() || start_pos == end_pos);
        Self {
            start_pos,
            end_pos,
            moves,
        }
    }

    /// Creates a new path which ends on the starting position.
    pub fn new_start_on_target(start_pos: RobotPositions) -> Self {
        Self::new(start_pos.clone(), start_pos, Vec::new())
    }

    /// Returns the robots and directions of all moves in order.
    pub fn movements(&self) -> Vec<(Robot, Direction)> {
        self.moves
            .iter()
            .map(|m| (m.robot, m.direction))
            .collect()
    }

    /// Returns the number of moves in the path.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Checks if the path has a length of 0.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
