//! Clips precomputed skeletons at the robots standing in the way.

use crate::trajectory::{Segment, Skeleton};
use crate::{Position, Robot, RobotPositions};

/// The path a robot actually took during one move, including every bounce.
///
/// This is a [`Skeleton`] cut off at the field the robot stopped on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlidePath {
    segments: Vec<Segment>,
}

impl SlidePath {
    /// Returns the segments of the path in the order they were travelled.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the field the robot started from.
    pub fn start(&self) -> Position {
        self.segments[0].start
    }

    /// Returns the field the robot stopped on.
    pub fn end(&self) -> Position {
        self.segments[self.segments.len() - 1].end
    }

    /// Returns the fields the robot was deflected on.
    pub fn bounces(&self) -> impl Iterator<Item = Position> + '_ {
        self.segments.iter().skip(1).map(|segment| segment.start)
    }
}

/// Returns the field `robot` stops on when sliding along `skeleton` with the other robots at
/// `positions`.
///
/// Returns `None` if the robot is blocked before it could move, or if it would have to stop on a
/// deflector.
pub fn resolve_end(skeleton: Skeleton<'_>, robot: Robot, positions: &RobotPositions) -> Option<Position> {
    clip(skeleton, robot, positions, |_| ())
}

/// Like [`resolve_end`], but returns the whole path up to the field the robot stops on.
pub fn resolve_path(skeleton: Skeleton<'_>, robot: Robot, positions: &RobotPositions) -> Option<SlidePath> {
    let mut segments = Vec::with_capacity(4);
    clip(skeleton, robot, positions, |segment| segments.push(segment))?;
    Some(SlidePath { segments })
}

/// Walks along the segments of `skeleton` and stops in front of the first robot in the way.
///
/// Every travelled segment is passed to `visit`, the last one already shortened.
fn clip<F>(skeleton: Skeleton<'_>, robot: Robot, positions: &RobotPositions, mut visit: F) -> Option<Position>
where
    F: FnMut(Segment),
{
    for segment in skeleton.segments() {
        let blocker = positions
            .iter()
            .filter(|&(other, pos)| other != robot && segment.covers(pos))
            .map(|(_, pos)| pos)
            .min_by(|a, b| a.cmp_along(b, segment.direction));

        let blocker = match blocker {
            Some(blocker) => blocker,
            None => {
                visit(segment);
                continue;
            }
        };

        let end = blocker.step_back(segment.direction);
        if end == segment.start || skeleton.table().is_deflector(end) {
            return None;
        }
        visit(Segment { end, ..segment });
        return Some(end);
    }

    Some(skeleton.end())
}

#[cfg(test)]
mod tests {
    use super::{resolve_end, resolve_path};
    use crate::generator::Generator;
    use crate::{
        BoardBuilder, DeflectorKind, Direction, Position, Robot, RobotPositions, Segment,
        TrajectoryTable, DIRECTIONS, ROBOTS,
    };
    use quickcheck::quickcheck;

    fn bounce_board() -> (TrajectoryTable, RobotPositions) {
        let board = BoardBuilder::new(8)
            .deflector((4, 1).into(), DeflectorKind::Backslash, Robot::Green)
            .deflector((4, 5).into(), DeflectorKind::Slash, Robot::Green)
            .robot(Robot::Red, (0, 1).into())
            .target(Robot::Red, (0, 5).into())
            .build()
            .unwrap();
        let positions = board.robot_positions().clone();
        (TrajectoryTable::new(&board), positions)
    }

    #[test]
    fn unobstructed() {
        let (table, positions) = bounce_board();
        let skeleton = table
            .skeleton((0, 1).into(), Robot::Red, Direction::Right)
            .unwrap();
        assert_eq!(
            resolve_end(skeleton, Robot::Red, &positions),
            Some(Position::new(0, 5))
        );
        let path = resolve_path(skeleton, Robot::Red, &positions).unwrap();
        assert_eq!(path.segments(), skeleton.segments().collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn blocked_after_bounce() {
        let (table, mut positions) = bounce_board();
        positions.set_robot(Robot::Blue, (4, 4).into());
        positions.set_robot(Robot::Yellow, (1, 5).into());
        let skeleton = table
            .skeleton((0, 1).into(), Robot::Red, Direction::Right)
            .unwrap();

        // Blue is hit on the second segment, yellow would only be hit on the third.
        let path = resolve_path(skeleton, Robot::Red, &positions).unwrap();
        assert_eq!(path.end(), Position::new(4, 3));
        assert_eq!(path.bounces().collect::<Vec<_>>(), vec![Position::new(4, 1)]);
        assert_eq!(
            path.segments()[1],
            Segment {
                start: (4, 1).into(),
                direction: Direction::Down,
                end: (4, 3).into(),
            }
        );
    }

    #[test]
    fn closest_robot_wins() {
        let (table, mut positions) = bounce_board();
        positions.set_robot(Robot::Blue, (1, 5).into());
        positions.set_robot(Robot::Yellow, (2, 5).into());
        let skeleton = table
            .skeleton((0, 1).into(), Robot::Red, Direction::Right)
            .unwrap();
        assert_eq!(
            resolve_end(skeleton, Robot::Red, &positions),
            Some(Position::new(3, 5))
        );
    }

    #[test]
    fn never_stop_on_a_deflector() {
        let (table, mut positions) = bounce_board();
        // Stopping in front of yellow would mean resting on the deflector at (4, 5).
        positions.set_robot(Robot::Yellow, (3, 5).into());
        let skeleton = table
            .skeleton((0, 1).into(), Robot::Red, Direction::Right)
            .unwrap();
        assert_eq!(resolve_end(skeleton, Robot::Red, &positions), None);
    }

    #[test]
    fn blocked_at_the_start() {
        let (table, mut positions) = bounce_board();
        positions.set_robot(Robot::Blue, (1, 1).into());
        let skeleton = table
            .skeleton((0, 1).into(), Robot::Red, Direction::Right)
            .unwrap();
        assert_eq!(resolve_end(skeleton, Robot::Red, &positions), None);
        assert_eq!(resolve_path(skeleton, Robot::Red, &positions), None);
    }

    #[test]
    fn blocked_on_first_segment() {
        let (table, mut positions) = bounce_board();
        positions.set_robot(Robot::Blue, (3, 1).into());
        let skeleton = table
            .skeleton((0, 1).into(), Robot::Red, Direction::Right)
            .unwrap();
        assert_eq!(
            resolve_end(skeleton, Robot::Red, &positions),
            Some(Position::new(2, 1))
        );
    }

    #[test]
    fn robots_off_the_path_are_ignored() {
        let (table, mut positions) = bounce_board();
        positions.set_robot(Robot::Blue, (5, 1).into());
        positions.set_robot(Robot::Yellow, (3, 4).into());
        positions.set_robot(Robot::Black, (4, 6).into());
        let skeleton = table
            .skeleton((0, 1).into(), Robot::Red, Direction::Right)
            .unwrap();
        assert_eq!(
            resolve_end(skeleton, Robot::Red, &positions),
            Some(Position::new(0, 5))
        );
    }

    #[test]
    fn no_skeleton_means_no_move() {
        let board = BoardBuilder::new(8)
            .set_vertical_line(2, 3, 1)
            .deflector((5, 5).into(), DeflectorKind::Slash, Robot::Blue)
            .deflector((5, 2).into(), DeflectorKind::Backslash, Robot::Red)
            .robot(Robot::Red, (2, 3).into())
            .robot(Robot::Blue, (6, 6).into())
            .robot(Robot::Green, (0, 0).into())
            .target(Robot::Red, (3, 3).into())
            .build()
            .unwrap();
        let table = TrajectoryTable::new(&board);
        let positions = board.robot_positions();

        for &robot in ROBOTS.iter() {
            for &dir in DIRECTIONS.iter() {
                let start = match positions.get(robot) {
                    Some(start) => start,
                    None => continue,
                };
                if table.skeleton(start, robot, dir).is_none() {
                    assert_eq!(positions.slide(&table, robot, dir), None);
                }
            }
        }
        assert_eq!(positions.slide(&table, Robot::Red, Direction::Right), None);
    }

    quickcheck! {
        fn moves_follow_their_skeleton(seed: u64) -> bool {
            let board = Generator::from_seed(seed as u128, 8).deflectors(10).generate_board();
            let table = TrajectoryTable::new(&board);
            let positions = board.robot_positions();

            let consistent = positions.iter().all(|(robot, start)| {
                DIRECTIONS.iter().all(|&dir| {
                    match (table.skeleton(start, robot, dir), positions.slide(&table, robot, dir)) {
                        (None, end) => end.is_none(),
                        (Some(_), None) => true,
                        (Some(skeleton), Some(end)) => {
                            let path = positions.slide_path(&table, robot, dir);
                            end != start
                                && !table.is_deflector(end)
                                && !positions.contains_any_robot(end)
                                && path.map_or(false, |path| {
                                    path.end() == end && path.start() == skeleton.start()
                                })
                        }
                    }
                })
            });
            consistent
        }
    }
}
