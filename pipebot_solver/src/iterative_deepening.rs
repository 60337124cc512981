use pipebot_board::{RobotPositions, Round};
use tracing::debug;

use crate::util::VisitedNodes;
use crate::{Path, Solver, DEFAULT_MAX_DEPTH};

/// A solver using iterative deepening to find the shortest path to the target.
///
/// Runs depth limited searches with an increasing limit until the target is reached or the
/// maximum depth is exceeded. Solutions longer than the maximum depth are never found.
///
/// Even though one of the advantages of iterative deepening is the small amount of memory needed,
/// using it without storing visited nodes makes it unusably slow.
#[derive(Debug)]
pub struct IterativeDeepening {
    /// Contains all visited robot positions and the number of moves in the shortest path found from
    /// the starting positions.
    visited_nodes: VisitedNodes,
    max_depth: usize,
    /// Set if the current iteration stopped at the depth limit at least once.
    cut_off: bool,
}

impl Solver for IterativeDeepening {
    fn solve(&mut self, round: &Round, start_positions: RobotPositions) -> Option<Path> {
        // Check if the robot has already reached the target
        if round.target_reached(&start_positions) {
            return Some(Path::new_start_on_target(start_positions));
        }

        for depth in 1..=self.max_depth {
            self.visited_nodes.reset(start_positions.clone());
            self.cut_off = false;

            if let Some(final_pos) = self.depth_limited_dfs(round, &start_positions, 0, depth) {
                debug!(moves = depth, "Found a solution");
                return Some(self.visited_nodes.path_to(&final_pos, round));
            }
            if !self.cut_off {
                debug!(depth, "Explored every reachable position without reaching the target");
                return None;
            }
        }

        debug!(max_depth = self.max_depth, "No solution within the maximum depth");
        None
    }
}

impl IterativeDeepening {
    /// Creates a new solver which gives up after searching `max_depth` moves deep.
    pub fn new(max_depth: usize) -> Self {
        Self {
            visited_nodes: VisitedNodes::with_capacity(65536),
            max_depth,
            cut_off: false,
        }
    }

    /// Performs a depth-limited DFS from `start_pos` up to a depth of `max_depth`.
    ///
    /// `at_move` is the number of moves needed to reach `start_pos`.
    fn depth_limited_dfs(
        &mut self,
        round: &Round,
        start_pos: &RobotPositions,
        at_move: usize,
        max_depth: usize,
    ) -> Option<RobotPositions> {
        // Return the final position if the target has been reached.
        if max_depth == 0 {
            if round.target_reached(start_pos) {
                return Some(start_pos.clone());
            }
            self.cut_off = true;
            return None;
        }

        let calculating_move = at_move + 1;

        for (pos, (robot, dir)) in start_pos.reachable_positions(round.trajectories()) {
            if self
                .visited_nodes
                .add_node(pos.clone(), start_pos, calculating_move, (robot, dir))
                .was_discarded()
            {
                continue;
            }

            if let Some(final_pos) =
                self.depth_limited_dfs(round, &pos, calculating_move, max_depth - 1)
            {
                return Some(final_pos);
            }
        }
        None
    }
}

impl Default for IterativeDeepening {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use pipebot_board::{BoardBuilder, DeflectorKind, Direction, Robot, RobotPositions, Round};

    use crate::{BreadthFirst, IterativeDeepening, Path, Solver};

    fn create_round() -> Round {
        let board = BoardBuilder::new(8)
            .set_vertical_line(3, 5, 1)
            .deflector((6, 2).into(), DeflectorKind::Backslash, Robot::Blue)
            .robot(Robot::Red, (0, 2).into())
            .robot(Robot::Blue, (6, 0).into())
            .robot(Robot::Green, (0, 6).into())
            .target(Robot::Red, (3, 5).into())
            .build()
            .unwrap();
        Round::new(board)
    }

    // Test robot already on target
    #[test]
    fn on_target() {
        let round = create_round();
        let start = RobotPositions::from_tuples(&[
            (Robot::Red, (3, 5)),
            (Robot::Blue, (6, 0)),
            (Robot::Green, (0, 6)),
        ]);

        let expected = Path::new_start_on_target(start.clone());
        assert_eq!(IterativeDeepening::default().solve(&round, start), Some(expected));
    }

    #[test]
    fn same_length_as_breadth_first() {
        let round = create_round();
        let start = round.start_positions().clone();
        let bfs = BreadthFirst::new().solve(&round, start.clone()).unwrap();
        let iddfs = IterativeDeepening::default().solve(&round, start).unwrap();

        assert_eq!(bfs.len(), iddfs.len());
        assert!(round.target_reached(iddfs.end_pos()));
        // Red is stopped above green and then slides right into the wall.
        assert_eq!(
            iddfs.movements(),
            vec![(Robot::Red, Direction::Down), (Robot::Red, Direction::Right)]
        );
    }

    #[test]
    fn gives_up_at_max_depth() {
        let round = create_round();
        let start = round.start_positions().clone();
        let length = BreadthFirst::new().solve(&round, start.clone()).unwrap().len();

        assert_eq!(IterativeDeepening::new(length - 1).solve(&round, start.clone()), None);
        assert!(IterativeDeepening::new(length).solve(&round, start).is_some());
    }

    #[test]
    fn unsolvable() {
        let board = BoardBuilder::new(8)
            .robot(Robot::Red, (0, 0).into())
            .target(Robot::Red, (3, 3).into())
            .build()
            .unwrap();
        let round = Round::new(board);
        assert_eq!(
            IterativeDeepening::new(100).solve(&round, round.start_positions().clone()),
            None
        );
    }

    #[test]
    fn single_move() {
        let board = BoardBuilder::new(8)
            .set_vertical_line(3, 5, 1)
            .robot(Robot::Red, (0, 5).into())
            .target(Robot::Red, (3, 5).into())
            .build()
            .unwrap();
        let round = Round::new(board);
        let path = IterativeDeepening::default()
            .solve(&round, round.start_positions().clone())
            .unwrap();
        assert_eq!(path.movements(), vec![(Robot::Red, Direction::Right)]);
    }
}
