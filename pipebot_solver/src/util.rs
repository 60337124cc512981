use fxhash::FxHashMap;
use pipebot_board::{Direction, Robot, RobotPositions, Round};
use std::collections::hash_map::Entry;

use crate::{Move, Path};

/// The possible outcomes when trying to add a node to [`VisitedNodes`](VisitedNodes).
pub(crate) enum AddNodeOutcome {
    /// The added node was previously unknown and has been added.
    New,
    /// The node has been seen before but is worse than the newly added one.
    WorseKnown,
    /// The node has been seen before and can be reached with fewer or as many moves. The new node
    /// has been discarded.
    BetterKnown,
}

impl AddNodeOutcome {
    /// Returns `true` if the node has been added to `VisitedNodes`.
    pub fn was_added(&self) -> bool {
        match self {
            AddNodeOutcome::New | AddNodeOutcome::WorseKnown => true,
            AddNodeOutcome::BetterKnown => false,
        }
    }

    /// Returns `true` if the node has been discarded.
    pub fn was_discarded(&self) -> bool {
        !self.was_added()
    }
}

/// Stores `RobotPositions` and how they were reached like nodes in a tree.
///
/// This wraps a map from `RobotPositions` to a `VisitedNode` and provides convenience methods
/// like [`add_node`](VisitedNodes::add_node) or [`path_to`](VisitedNodes::path_to).
#[derive(Debug, Clone)]
pub(crate) struct VisitedNodes {
    nodes: FxHashMap<RobotPositions, VisitedNode>,
}

/// A node containing the information needed to walk back to the root.
#[derive(Debug, Clone)]
pub(crate) struct VisitedNode {
    /// The number of moves needed to reach this node.
    moves_to_reach: usize,
    /// The positions this node was reached from and the move leading here, `None` for the root.
    parent: Option<(RobotPositions, Robot, Direction)>,
}

impl VisitedNodes {
    /// Creates a new `VisitedNodes` with the given `capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Removes all stored nodes and inserts `root` as the new root.
    pub fn reset(&mut self, root: RobotPositions) {
        self.nodes.clear();
        self.nodes.insert(
            root,
            VisitedNode {
                moves_to_reach: 0,
                parent: None,
            },
        );
    }

    /// Returns the number of stored nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Adds a node at `positions`, reached from `from` with `moves` moves by moving `moved`.
    ///
    /// If there's already a node at `positions` that can be reached with fewer or equal `moves`,
    /// no new node is created.
    pub fn add_node(
        &mut self,
        positions: RobotPositions,
        from: &RobotPositions,
        moves: usize,
        moved: (Robot, Direction),
    ) -> AddNodeOutcome {
        let node = || VisitedNode {
            moves_to_reach: moves,
            parent: Some((from.clone(), moved.0, moved.1)),
        };
        match self.nodes.entry(positions) {
            Entry::Occupied(occupied) if occupied.get().moves_to_reach <= moves => {
                AddNodeOutcome::BetterKnown
            }
            Entry::Occupied(mut occupied) => {
                // A shorter path has been found.
                occupied.insert(node());
                AddNodeOutcome::WorseKnown
            }
            Entry::Vacant(vacant) => {
                vacant.insert(node());
                AddNodeOutcome::New
            }
        }
    }

    /// Returns the shortest known path from the root to `positions`.
    ///
    /// Every move is replayed on the trajectories of `round` to recover the exact path the robot
    /// took.
    ///
    /// # Panics
    /// Panics if `positions` has yet to be visited.
    pub fn path_to(&self, positions: &RobotPositions, round: &Round) -> Path {
        let mut movements = Vec::with_capacity(32);
        let mut current_pos = positions;

        // Create the path by following the nodes previous positions.
        while let Some((previous, robot, direction)) = &self
            .nodes
            .get(current_pos)
            .expect("Failed to find a supposed source position")
            .parent
        {
            movements.push((*robot, *direction));
            current_pos = previous;
        }
        movements.reverse();

        replay(round, current_pos.clone(), &movements)
    }
}

/// Applies `movements` to `start` and records every move including the path taken.
///
/// # Panics
/// Panics if one of the moves is not possible.
pub(crate) fn replay(round: &Round, start: RobotPositions, movements: &[(Robot, Direction)]) -> Path {
    let table = round.trajectories();
    let mut current = start.clone();
    let moves = movements
        .iter()
        .map(|&(robot, direction)| {
            let replay = current
                .slide_path(table, robot, direction)
                .expect("Failed to replay a move found by the search");
            current = current
                .clone()
                .move_in_direction(table, robot, direction)
                .expect("Failed to replay a move found by the search");
            Move::new(robot, direction, current.clone(), replay)
        })
        .collect();
    Path::new(start, current, moves)
}
