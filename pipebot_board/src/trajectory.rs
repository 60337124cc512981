//! Precomputed slides of single robots.
//!
//! Where a robot ends up when it is moved only depends on the walls, the deflectors and the color
//! of the robot, as long as no other robot is in the way. The [`TrajectoryTable`] computes this
//! path, the [`Skeleton`], once for every field, color and direction. Other robots are taken into
//! account afterwards by [`collision`](crate::collision), which clips a skeleton at the first robot
//! in the way.

use std::fmt;
use tracing::debug;

use crate::{Board, Direction, Position, PositionEncoding, Robot, DIRECTIONS, ROBOTS, ROBOT_COUNT};

/// One straight part of a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    /// The field the robot starts moving from, either its starting field or a deflector.
    pub start: Position,
    /// The direction the robot moves in.
    pub direction: Direction,
    /// The last field reached in this segment, either the field the robot stops on or the next
    /// deflector.
    pub end: Position,
}

impl Segment {
    /// Checks if `pos` lies on the segment, including both ends.
    #[inline]
    pub fn covers(&self, pos: Position) -> bool {
        self.start.is_aligned(&pos, self.direction)
            && self.start.cmp_along(&pos, self.direction).is_le()
            && pos.cmp_along(&self.end, self.direction).is_le()
    }
}

/// The slide of a robot that isn't obstructed by other robots.
///
/// A skeleton always consists of at least one segment and ends on a field without a deflector.
/// It is a cheap view into a [`TrajectoryTable`].
#[derive(Clone, Copy)]
pub struct Skeleton<'a> {
    table: &'a TrajectoryTable,
    head: usize,
}

/// Iterates over the segments of a [`Skeleton`].
#[derive(Clone)]
pub struct Segments<'a> {
    table: &'a TrajectoryTable,
    next: Option<usize>,
}

/// Contains the skeleton of every slide on a board.
///
/// The table is built once per board and never changes afterwards.
#[derive(Clone)]
pub struct TrajectoryTable {
    side_length: PositionEncoding,
    /// Skeletons share their tails, a link only stores its first segment and where the rest
    /// continues.
    links: Vec<Link>,
    /// Indexed by [`TrajectoryTable::index`].
    outcomes: Vec<Outcome>,
    /// Marks the fields with a deflector, indexed by [`Position::key`].
    deflectors: Vec<bool>,
}

#[derive(Debug, Clone, Copy)]
struct Link {
    start: Position,
    direction: Direction,
    /// The link of the segment following a bounce.
    rest: Option<usize>,
    /// The field the whole slide ends on.
    end: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// The robot is blocked right away or would have to come to rest on a deflector.
    Stuck,
    /// The robot would be bounced around by deflectors forever.
    Loops,
    /// The robot slides along the skeleton starting with this link.
    Slides(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expansion {
    Unvisited,
    InProgress,
    Done(Outcome),
}

/// One step of a slide while it is being expanded.
#[derive(Debug, Clone, Copy)]
struct Step {
    index: usize,
    position: Position,
    direction: Direction,
    next: Position,
    next_direction: Direction,
    next_is_deflector: bool,
}

impl TrajectoryTable {
    /// Computes the skeletons of all slides on `board`.
    pub fn new(board: &Board) -> Self {
        let side_length = board.side_length();
        let fields = side_length as usize * side_length as usize;
        let mut table = Self {
            side_length,
            links: Vec::with_capacity(fields * ROBOT_COUNT * DIRECTIONS.len()),
            outcomes: Vec::new(),
            deflectors: (0..fields)
                .map(|key| board.deflector_at(Position::from_key(key, side_length)).is_some())
                .collect(),
        };

        let mut expansions = vec![Expansion::Unvisited; fields * ROBOT_COUNT * DIRECTIONS.len()];
        for &robot in ROBOTS.iter() {
            for key in 0..fields {
                for &direction in DIRECTIONS.iter() {
                    let start = Position::from_key(key, side_length);
                    table.expand(board, robot, start, direction, &mut expansions);
                }
            }
        }

        table.outcomes = expansions
            .into_iter()
            .map(|expansion| match expansion {
                Expansion::Done(outcome) => outcome,
                _ => panic!("Failed to expand every slide on the board"),
            })
            .collect();

        debug!(
            side_length,
            skeletons = table.links.len(),
            looping = table.outcomes.iter().filter(|&&o| o == Outcome::Loops).count(),
            "Built trajectory table"
        );
        table
    }

    /// Returns the side length of the board the table was built for.
    pub fn side_length(&self) -> PositionEncoding {
        self.side_length
    }

    /// Returns the skeleton of `robot` moving from `start` in `direction`.
    ///
    /// Returns `None` if the robot can't move at all, would have to stop on a deflector or would
    /// be deflected in a loop forever.
    pub fn skeleton(&self, start: Position, robot: Robot, direction: Direction) -> Option<Skeleton<'_>> {
        match self.outcomes[self.index(robot, start, direction)] {
            Outcome::Slides(head) => Some(Skeleton { table: self, head }),
            Outcome::Stuck | Outcome::Loops => None,
        }
    }

    /// Checks if `robot` moving from `start` in `direction` is caught in a deflector loop.
    pub fn is_looping(&self, start: Position, robot: Robot, direction: Direction) -> bool {
        self.outcomes[self.index(robot, start, direction)] == Outcome::Loops
    }

    /// Checks if there is a deflector on `pos`.
    #[inline]
    pub fn is_deflector(&self, pos: Position) -> bool {
        self.deflectors[pos.key(self.side_length)]
    }

    #[inline(always)]
    fn index(&self, robot: Robot, pos: Position, direction: Direction) -> usize {
        let fields = self.side_length as usize * self.side_length as usize;
        ((robot.index() * fields) + pos.key(self.side_length)) * DIRECTIONS.len()
            + direction.index()
    }

    /// Expands the slide of `robot` from `start` in `direction` and every slide it depends on.
    ///
    /// The slide is followed step by step until a field is reached whose outcome is already known,
    /// a wall stops the robot or a step in progress is seen again. Afterwards the outcomes are
    /// resolved in reverse.
    fn expand(
        &mut self,
        board: &Board,
        robot: Robot,
        start: Position,
        direction: Direction,
        expansions: &mut [Expansion],
    ) {
        let mut chain: Vec<Step> = Vec::new();
        let (mut position, mut direction) = (start, direction);

        let cycle = loop {
            let index = self.index(robot, position, direction);
            match expansions[index] {
                Expansion::Done(_) => break None,
                Expansion::InProgress => break Some(index),
                Expansion::Unvisited => (),
            }

            let next = match board.step(position, direction) {
                Some(next) => next,
                None => {
                    expansions[index] = Expansion::Done(Outcome::Stuck);
                    break None;
                }
            };
            let deflector = board.deflector_at(next);
            let next_direction = deflector.map_or(direction, |d| d.redirect(robot, direction));

            expansions[index] = Expansion::InProgress;
            chain.push(Step {
                index,
                position,
                direction,
                next,
                next_direction,
                next_is_deflector: deflector.is_some(),
            });
            position = next;
            direction = next_direction;
        };

        if let Some(cycle_start) = cycle {
            while let Some(step) = chain.pop() {
                expansions[step.index] = Expansion::Done(Outcome::Loops);
                if step.index == cycle_start {
                    break;
                }
            }
        }

        while let Some(step) = chain.pop() {
            let successor = match expansions[self.index(robot, step.next, step.next_direction)] {
                Expansion::Done(outcome) => outcome,
                _ => panic!("Tried to resolve a slide before the slide it continues with"),
            };
            expansions[step.index] = Expansion::Done(self.resolve(step, successor));
        }
    }

    /// Determines the outcome of `step` given the outcome of the slide it continues with.
    fn resolve(&mut self, step: Step, successor: Outcome) -> Outcome {
        let link = match successor {
            Outcome::Loops => return Outcome::Loops,
            // A robot never rests on a deflector.
            Outcome::Stuck if step.next_is_deflector => return Outcome::Stuck,
            Outcome::Stuck => Link {
                start: step.position,
                direction: step.direction,
                rest: None,
                end: step.next,
            },
            Outcome::Slides(id) => {
                let tail = self.links[id];
                let rest = if step.next_direction == step.direction {
                    tail.rest
                } else {
                    Some(id)
                };
                Link {
                    start: step.position,
                    direction: step.direction,
                    rest,
                    end: tail.end,
                }
            }
        };
        debug_assert!(!self.is_deflector(link.end), "Skeleton ends on a deflector");
        self.links.push(link);
        Outcome::Slides(self.links.len() - 1)
    }
}

impl fmt::Debug for TrajectoryTable {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("TrajectoryTable")
            .field("side_length", &self.side_length)
            .field("skeletons", &self.links.len())
            .finish()
    }
}

impl<'a> Skeleton<'a> {
    /// Returns the field the robot starts from.
    pub fn start(&self) -> Position {
        self.table.links[self.head].start
    }

    /// Returns the direction the robot starts moving in.
    pub fn direction(&self) -> Direction {
        self.table.links[self.head].direction
    }

    /// Returns the field the robot stops on if nothing is in the way.
    pub fn end(&self) -> Position {
        self.table.links[self.head].end
    }

    /// Returns an iterator over the segments of the slide, starting with the first one.
    pub fn segments(&self) -> Segments<'a> {
        Segments {
            table: self.table,
            next: Some(self.head),
        }
    }

    /// Returns the fields the robot is deflected on, in the order they are reached.
    pub fn bounces(&self) -> impl Iterator<Item = Position> + 'a {
        self.segments().skip(1).map(|segment| segment.start)
    }

    pub(crate) fn table(&self) -> &'a TrajectoryTable {
        self.table
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.table.links[self.next?];
        self.next = link.rest;
        let end = match link.rest {
            Some(rest) => self.table.links[rest].start,
            None => link.end,
        };
        Some(Segment {
            start: link.start,
            direction: link.direction,
            end,
        })
    }
}

impl fmt::Debug for Skeleton<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_list().entries(self.segments()).finish()
    }
}

impl fmt::Debug for Segments<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("Segments").field("next", &self.next).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Segment, TrajectoryTable};
    use crate::{BoardBuilder, DeflectorKind, Direction, Position, Robot, DIRECTIONS, ROBOTS};

    fn segments(table: &TrajectoryTable, start: (u16, u16), robot: Robot, dir: Direction) -> Vec<Segment> {
        table
            .skeleton(start.into(), robot, dir)
            .expect("Expected the robot to be able to move")
            .segments()
            .collect()
    }

    fn segment(start: (u16, u16), direction: Direction, end: (u16, u16)) -> Segment {
        Segment {
            start: start.into(),
            direction,
            end: end.into(),
        }
    }

    #[test]
    fn straight_slides() {
        let board = BoardBuilder::new(16)
            .set_vertical_line(5, 0, 1)
            .robot(Robot::Red, (0, 0).into())
            .target(Robot::Red, (5, 0).into())
            .build()
            .unwrap();
        let table = TrajectoryTable::new(&board);

        assert_eq!(
            segments(&table, (0, 0), Robot::Red, Direction::Right),
            vec![segment((0, 0), Direction::Right, (5, 0))]
        );
        assert_eq!(
            segments(&table, (6, 0), Robot::Red, Direction::Right),
            vec![segment((6, 0), Direction::Right, (15, 0))]
        );
        assert_eq!(
            segments(&table, (0, 0), Robot::Red, Direction::Down),
            vec![segment((0, 0), Direction::Down, (0, 15))]
        );
        assert!(table.skeleton((0, 0).into(), Robot::Red, Direction::Up).is_none());
        assert!(table.skeleton((0, 0).into(), Robot::Red, Direction::Left).is_none());
        assert!(table.skeleton((5, 0).into(), Robot::Red, Direction::Right).is_none());
        assert!(table.skeleton((6, 0).into(), Robot::Red, Direction::Left).is_none());
    }

    #[test]
    fn deflector_bounce_and_pass_through() {
        let board = BoardBuilder::new(16)
            .deflector((3, 0).into(), DeflectorKind::Slash, Robot::Blue)
            .robot(Robot::Red, (0, 0).into())
            .target(Robot::Red, (3, 15).into())
            .build()
            .unwrap();
        let table = TrajectoryTable::new(&board);

        // The bounce rules of `DeflectorKind::bounce` decide the direction: moving right into a
        // slash always turns upwards, never downwards. On the top row that is blocked by the edge
        // of the board, so the robot stops in front of the deflector instead.
        assert_eq!(
            segments(&table, (0, 0), Robot::Red, Direction::Right),
            vec![segment((0, 0), Direction::Right, (2, 0))]
        );
        assert!(table.skeleton((2, 0).into(), Robot::Red, Direction::Right).is_none());

        // Moving left into a slash turns downwards.
        assert_eq!(
            segments(&table, (9, 0), Robot::Red, Direction::Left),
            vec![
                segment((9, 0), Direction::Left, (3, 0)),
                segment((3, 0), Direction::Down, (3, 15)),
            ]
        );

        // The owner passes straight through.
        assert_eq!(
            segments(&table, (0, 0), Robot::Blue, Direction::Right),
            vec![segment((0, 0), Direction::Right, (15, 0))]
        );
    }

    #[test]
    fn multiple_bounces() {
        let board = BoardBuilder::new(8)
            .deflector((4, 1).into(), DeflectorKind::Backslash, Robot::Green)
            .deflector((4, 5).into(), DeflectorKind::Slash, Robot::Green)
            .robot(Robot::Red, (0, 1).into())
            .target(Robot::Red, (0, 5).into())
            .build()
            .unwrap();
        let table = TrajectoryTable::new(&board);

        let skeleton = table
            .skeleton((0, 1).into(), Robot::Red, Direction::Right)
            .unwrap();
        assert_eq!(skeleton.end(), Position::new(0, 5));
        assert_eq!(
            skeleton.bounces().collect::<Vec<_>>(),
            vec![Position::new(4, 1), Position::new(4, 5)]
        );
        assert_eq!(
            skeleton.segments().collect::<Vec<_>>(),
            vec![
                segment((0, 1), Direction::Right, (4, 1)),
                segment((4, 1), Direction::Down, (4, 5)),
                segment((4, 5), Direction::Left, (0, 5)),
            ]
        );

        // Starting between the deflectors shares the tail of the slide.
        assert_eq!(
            segments(&table, (4, 3), Robot::Red, Direction::Down),
            vec![
                segment((4, 3), Direction::Down, (4, 5)),
                segment((4, 5), Direction::Left, (0, 5)),
            ]
        );
    }

    #[test]
    fn never_rest_on_a_deflector() {
        let board = BoardBuilder::new(8)
            .set_vertical_line(4, 2, 1)
            .deflector((4, 2).into(), DeflectorKind::Slash, Robot::Red)
            .robot(Robot::Red, (0, 2).into())
            .target(Robot::Red, (3, 2).into())
            .build()
            .unwrap();
        let table = TrajectoryTable::new(&board);

        // The owner would have to stop on its own deflector, so it stops in front of it.
        assert_eq!(
            segments(&table, (0, 2), Robot::Red, Direction::Right),
            vec![segment((0, 2), Direction::Right, (3, 2))]
        );
        assert!(table.skeleton((3, 2).into(), Robot::Red, Direction::Right).is_none());
        assert!(!table.is_looping((3, 2).into(), Robot::Red, Direction::Right));
        // Other robots bounce upwards.
        assert_eq!(
            segments(&table, (0, 2), Robot::Blue, Direction::Right),
            vec![
                segment((0, 2), Direction::Right, (4, 2)),
                segment((4, 2), Direction::Up, (4, 0)),
            ]
        );
    }

    #[test]
    fn deflector_loop() {
        // Four deflectors in the corners of a rectangle send every other robot in circles.
        let board = BoardBuilder::new(8)
            .deflector((1, 1).into(), DeflectorKind::Slash, Robot::Black)
            .deflector((5, 1).into(), DeflectorKind::Backslash, Robot::Black)
            .deflector((5, 4).into(), DeflectorKind::Slash, Robot::Black)
            .deflector((1, 4).into(), DeflectorKind::Backslash, Robot::Black)
            .robot(Robot::Red, (3, 1).into())
            .target(Robot::Red, (3, 4).into())
            .build()
            .unwrap();
        let table = TrajectoryTable::new(&board);

        for &(start, dir) in &[
            ((3, 1), Direction::Right),
            ((3, 1), Direction::Left),
            ((5, 2), Direction::Down),
            ((3, 4), Direction::Left),
            ((1, 3), Direction::Up),
        ] {
            assert!(table.skeleton(start.into(), Robot::Red, dir).is_none());
            assert!(table.is_looping(start.into(), Robot::Red, dir));
        }

        // Crossing the loop on a field without a deflector is unaffected.
        assert_eq!(
            segments(&table, (3, 0), Robot::Red, Direction::Down),
            vec![segment((3, 0), Direction::Down, (3, 7))]
        );

        // Leaving the loop sideways works.
        assert_eq!(
            segments(&table, (3, 1), Robot::Red, Direction::Up),
            vec![segment((3, 1), Direction::Up, (3, 0))]
        );

        // The owner isn't affected by the loop at all.
        assert_eq!(
            segments(&table, (3, 1), Robot::Black, Direction::Right),
            vec![segment((3, 1), Direction::Right, (7, 1))]
        );
    }

    #[test]
    fn skeletons_are_consistent() {
        let board = BoardBuilder::new(10)
            .set_center_walls()
            .set_horizontal_line(2, 6, 3)
            .deflector((2, 2).into(), DeflectorKind::Slash, Robot::Red)
            .deflector((7, 2).into(), DeflectorKind::Backslash, Robot::Yellow)
            .deflector((7, 7).into(), DeflectorKind::Slash, Robot::Green)
            .robot(Robot::Red, (0, 0).into())
            .target(Robot::Red, (9, 9).into())
            .build()
            .unwrap();
        let table = TrajectoryTable::new(&board);

        for &robot in ROBOTS.iter() {
            for key in 0..100 {
                let start = Position::from_key(key, 10);
                for &dir in DIRECTIONS.iter() {
                    let skeleton = match table.skeleton(start, robot, dir) {
                        Some(skeleton) => skeleton,
                        None => continue,
                    };
                    let segments = skeleton.segments().collect::<Vec<_>>();
                    assert_eq!(segments[0].start, start);
                    assert_eq!(segments.last().unwrap().end, skeleton.end());
                    assert!(!table.is_deflector(skeleton.end()));
                    for pair in segments.windows(2) {
                        assert_eq!(pair[0].end, pair[1].start);
                        assert!(table.is_deflector(pair[1].start));
                        assert_ne!(pair[0].direction, pair[1].direction);
                    }
                    for segment in &segments {
                        assert!(segment.start.is_aligned(&segment.end, segment.direction));
                        assert!(segment.start.cmp_along(&segment.end, segment.direction).is_lt());
                    }
                }
            }
        }
    }
}
