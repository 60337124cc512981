//! Tools to generate random boards of different sizes.

use std::collections::BTreeSet;

use crate::{
    BoardBuilder, Board, DeflectorKind, Direction, Position, PositionEncoding, DIRECTIONS,
    ROBOTS, ROBOT_COUNT,
};
use itertools::Itertools;
use rand::prelude::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// Marks the side_length from which on generated boards contain a center wall block.
pub const CENTER_WALLS_FROM_SIDE_LENGTH: PositionEncoding = 10;

/// The number of deflectors placed on a generated board unless configured otherwise.
pub const DEFAULT_DEFLECTORS: usize = 6;

/// A board generator to create boards of different sizes and configurations.
#[derive(Debug)]
pub struct Generator {
    rng: rand_pcg::Pcg64Mcg,
    side_length: PositionEncoding,
    robots: usize,
    deflectors: usize,
    /// Fields next to walls which have already been placed.
    occupied_fields: BTreeSet<Position>,
    /// Fields which can't hold a robot, a deflector or the target.
    blocked_fields: BTreeSet<Position>,
    potential_targets: Vec<Position>,
}

impl Generator {
    /// Creates a new generator with a random state.
    ///
    /// # Panics
    /// Panics if `side_length` is less than `3`.
    pub fn new(side_length: PositionEncoding) -> Self {
        Self::with_rng(rand_pcg::Pcg64Mcg::from_entropy(), side_length)
    }

    /// Creates a new generator initialized with `seed`.
    ///
    /// The same seed and configuration always generate the same sequence of boards.
    ///
    /// # Panics
    /// Panics if `side_length` is less than `3`.
    pub fn from_seed(seed: u128, side_length: PositionEncoding) -> Self {
        Self::with_rng(rand_pcg::Pcg64Mcg::new(seed.wrapping_mul(2)), side_length)
    }

    fn with_rng(rng: rand_pcg::Pcg64Mcg, side_length: PositionEncoding) -> Self {
        assert!(
            side_length >= 3 && side_length <= crate::MAX_SIDE_LENGTH,
            "Can't generate boards with a side length of {}",
            side_length
        );
        Self {
            rng,
            side_length,
            robots: ROBOT_COUNT,
            deflectors: DEFAULT_DEFLECTORS,
            occupied_fields: BTreeSet::new(),
            blocked_fields: BTreeSet::new(),
            potential_targets: Vec::new(),
        }
    }

    /// Sets the number of robots placed on generated boards, starting with red.
    ///
    /// # Panics
    /// Panics if `robots` is `0` or larger than [`ROBOT_COUNT`](crate::ROBOT_COUNT).
    pub fn robots(mut self, robots: usize) -> Self {
        assert!(robots > 0 && robots <= ROBOT_COUNT, "Invalid number of robots: {}", robots);
        self.robots = robots;
        self
    }

    /// Sets the number of deflectors placed on generated boards.
    ///
    /// Fewer deflectors are placed if the board runs out of space.
    pub fn deflectors(mut self, deflectors: usize) -> Self {
        self.deflectors = deflectors;
        self
    }

    /// Generates a new board with walls, deflectors, robots and a target.
    pub fn generate_board(&mut self) -> Board {
        let mut builder = BoardBuilder::new(self.side_length);
        self.occupied_fields = BTreeSet::new();
        self.blocked_fields = BTreeSet::new();
        self.potential_targets = Vec::new();

        if self.side_length >= CENTER_WALLS_FROM_SIDE_LENGTH {
            builder = builder.set_center_walls();
            let f = self.side_length / 2 - 1;
            for (col_add, row_add) in [0, 1].iter().cartesian_product(&[0, 1]) {
                let pos = Position::new(f + col_add, f + row_add);
                self.add_occupied_field(pos);
                self.blocked_fields.insert(pos);
            }
        }

        self.add_outer_wall_protrusions(&mut builder);
        self.add_corner_walls(&mut builder);

        let mut free_fields = (0..self.side_length)
            .cartesian_product(0..self.side_length)
            .map(Position::from)
            .filter(|pos| !self.blocked_fields.contains(pos))
            .collect::<Vec<_>>();
        free_fields.shuffle(&mut self.rng);

        let deflectors = self.deflectors.min(free_fields.len().saturating_sub(self.robots + 1));
        for pos in free_fields.drain(..deflectors) {
            let kind = if self.rng.gen() {
                DeflectorKind::Slash
            } else {
                DeflectorKind::Backslash
            };
            let owner = *ROBOTS.choose(&mut self.rng).unwrap();
            builder = builder.deflector(pos, kind, owner);
            self.potential_targets.retain(|&target| target != pos);
        }

        for (&robot, pos) in ROBOTS.iter().take(self.robots).zip(free_fields.drain(..self.robots)) {
            builder = builder.robot(robot, pos);
            self.potential_targets.retain(|&target| target != pos);
        }

        // Prefer the fields next to corner walls like on the physical board.
        let target_pos = match self.potential_targets.choose(&mut self.rng) {
            Some(&pos) => pos,
            None => free_fields[0],
        };
        let target_robot = *ROBOTS[..self.robots].choose(&mut self.rng).unwrap();
        builder = builder.target(target_robot, target_pos);

        trace!(side_length = self.side_length, deflectors, "Generated board");
        builder
            .build()
            .expect("Generated boards are always valid")
    }

    /// Adds walls in the shape of an `L` to random fields which are not too close to other walls.
    fn add_corner_walls(&mut self, builder: &mut BoardBuilder) {
        let count = 4 * (self.side_length as f64 / 4.0).round() as usize + 1;
        for _ in 0..count {
            let open_fields = (1..self.side_length - 1)
                .cartesian_product(1..self.side_length - 1)
                .map(Position::from)
                .filter(|pos| !self.occupied_fields.contains(pos))
                .collect::<Vec<_>>();
            let chosen = match open_fields.choose(&mut self.rng) {
                Some(&field) => field,
                None => break,
            };
            self.walls_around_field(builder, chosen);
            self.potential_targets.push(chosen);
            self.add_occupied_field(chosen);
        }
    }

    /// Adds a random corner wall to the field at `pos`.
    ///
    /// # Panics
    /// May panic if `pos` is at the edge of the board.
    fn walls_around_field(&mut self, builder: &mut BoardBuilder, pos: Position) {
        let (col, row) = (pos.column() as usize, pos.row() as usize);
        let walls = &mut builder.walls;
        match DIRECTIONS.choose(&mut self.rng).unwrap() {
            Direction::Up => {
                walls[col][row - 1].down = true;
                walls[col][row].right = true;
            }
            Direction::Right => {
                walls[col][row].right = true;
                walls[col][row].down = true;
            }
            Direction::Down => {
                walls[col][row].down = true;
                walls[col - 1][row].right = true;
            }
            Direction::Left => {
                walls[col - 1][row].right = true;
                walls[col][row - 1].down = true;
            }
        }
    }

    /// Adds walls protruding from the edges of the board.
    fn add_outer_wall_protrusions(&mut self, builder: &mut BoardBuilder) {
        let side_length = self.side_length as usize;
        let num_per_wall = (side_length + 7) / 8;
        let segment_length = side_length / num_per_wall;
        let is_odd_length = side_length % 2 == 1;

        // Get the indices of the fields for which walls will be set.
        let get_indices = |generator: &mut Self| {
            let mut indices = Vec::with_capacity(num_per_wall);
            let mut segment_sum = 0;
            for n in 0..num_per_wall {
                let mut len = segment_length;
                if is_odd_length && (num_per_wall - n) % 2 == 1 {
                    len += 1;
                }

                // Exclude the first field of the first segment.
                let start = segment_sum + (n == 0) as usize;
                segment_sum += len;

                // Exclude the last two fields of the last segment.
                let end = if n == num_per_wall - 1 {
                    side_length - 2
                } else {
                    segment_sum - 1
                };

                if start < end {
                    indices.push(generator.rng.gen_range(start..end));
                }
            }
            indices
        };

        let edges = [0, side_length - 1];
        // Protrusions at the top and bottom.
        for &row in &edges {
            for col in get_indices(self) {
                builder.walls[col][row].right = true;
                self.add_occupied_field(Position::new(col as PositionEncoding, row as PositionEncoding));
            }
        }
        // Protrusions at the left and right.
        for &col in &edges {
            for row in get_indices(self) {
                builder.walls[col][row].down = true;
                self.add_occupied_field(Position::new(col as PositionEncoding, row as PositionEncoding));
            }
        }
    }

    /// Adds a field and its surroundings to `self.occupied_fields`.
    fn add_occupied_field(&mut self, pos: Position) {
        let side_length = self.side_length;
        let around = |coordinate: PositionEncoding| {
            (coordinate.saturating_sub(1)..=coordinate + 1).filter(move |&c| c < side_length)
        };
        for (col, row) in around(pos.column()).cartesian_product(around(pos.row())) {
            self.occupied_fields.insert(Position::new(col, row));
        }
    }
}
