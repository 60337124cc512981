use pipebot_board::{RobotPositions, Round};
use tracing::{debug, trace};

use crate::util::VisitedNodes;
use crate::{Path, Solver};

/// Finds an optimal solution by visiting all possible game states in order of moves needed to
/// reach them.
///
/// Moves are generated robot by robot in color order and for each robot in the order up, down,
/// left, right. If several solutions of the same length exist, the first one found this way is
/// returned.
#[derive(Debug, Clone)]
pub struct BreadthFirst {
    /// Manages knowledge of visited nodes.
    visited_nodes: VisitedNodes,
}

impl Solver for BreadthFirst {
    fn solve(&mut self, round: &Round, start_positions: RobotPositions) -> Option<Path> {
        // Check if the robot has already reached the target
        if round.target_reached(&start_positions) {
            return Some(Path::new_start_on_target(start_positions));
        }

        self.start(round, start_positions)
    }
}

impl BreadthFirst {
    /// Create a new solver which uses a breadth first search to find an optimal solution.
    pub fn new() -> Self {
        Self {
            visited_nodes: VisitedNodes::with_capacity(65536),
        }
    }

    fn start(&mut self, round: &Round, start_pos: RobotPositions) -> Option<Path> {
        self.visited_nodes.reset(start_pos.clone());

        // Contains all positions reachable with `move_n` moves which have yet to be expanded.
        let mut current_move_positions: Vec<RobotPositions> = Vec::with_capacity(16usize.pow(3));
        current_move_positions.push(start_pos);
        let mut next_move_positions: Vec<RobotPositions> = Vec::with_capacity(16usize.pow(4));

        // Forward pathing to the target.
        // Computes the min. number of moves to the target and creates a tree of reachable positions
        // in `visited_nodes`, which is later used in the path creation.
        let mut move_n = 0;
        while !current_move_positions.is_empty() {
            trace!(
                moves = move_n,
                frontier = current_move_positions.len(),
                "Expanding positions"
            );
            for pos in &current_move_positions {
                if let Some(reached) =
                    self.eval_robot_state(round, pos, move_n, &mut next_move_positions)
                {
                    debug!(
                        moves = move_n + 1,
                        visited = self.visited_nodes.len(),
                        "Found a solution"
                    );
                    return Some(self.visited_nodes.path_to(&reached, round));
                };
            }
            current_move_positions.clear();
            std::mem::swap(&mut current_move_positions, &mut next_move_positions);
            move_n += 1;
        }

        debug!(
            visited = self.visited_nodes.len(),
            "Explored every reachable position without reaching the target"
        );
        None
    }

    /// Calculates all unseen reachable positions starting from `initial_pos` and adds them to
    /// `self.visited_nodes`.
    ///
    /// `moves` is the number of moves needed to reach `initial_pos`.
    /// The calculated positions are inserted into `next_positions`.
    fn eval_robot_state(
        &mut self,
        round: &Round,
        initial_pos: &RobotPositions,
        moves: usize,
        next_positions: &mut Vec<RobotPositions>,
    ) -> Option<RobotPositions> {
        for (new_pos, (robot, dir)) in initial_pos.reachable_positions(round.trajectories()) {
            // Mark the new positions as visited and continue with the next one, if a better path
            // already exists.
            if self
                .visited_nodes
                .add_node(new_pos.clone(), initial_pos, moves + 1, (robot, dir))
                .was_discarded()
            {
                continue;
            }

            // Check if the target has been reached.
            if round.target_reached(&new_pos) {
                return Some(new_pos);
            }

            // Add new_pos to the positions to be checked
            next_positions.push(new_pos);
        }

        None
    }
}

impl Default for BreadthFirst {
    fn default() -> Self {
        Self::new()
    }
}
