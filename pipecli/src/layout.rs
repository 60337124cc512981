//! The board layouts understood by the command line interface.

use std::fmt;
use std::path::Path;

use anyhow::{anyhow, bail, Context};
use pipebot_board::{
    Board, BoardBuilder, Deflector, DeflectorKind, MalformedBoard, Position, PositionEncoding,
    Robot, Target, MAX_SIDE_LENGTH, STANDARD_SIDE_LENGTH,
};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

/// A board stored as JSON.
///
/// The walls are given as flat boundary arrays, see
/// [`BoardBuilder::wall_boundaries`](pipebot_board::BoardBuilder::wall_boundaries). Robots are
/// stored as an object from color to position, a color appearing twice makes the board invalid.
#[derive(Debug, Deserialize)]
pub struct Layout {
    #[serde(default = "default_side_length")]
    pub side_length: PositionEncoding,
    pub horizontal_walls: Vec<bool>,
    pub vertical_walls: Vec<bool>,
    #[serde(deserialize_with = "robot_entries")]
    pub robots: Vec<(String, (PositionEncoding, PositionEncoding))>,
    #[serde(default)]
    pub deflectors: Vec<DeflectorLayout>,
    pub target: TargetLayout,
}

/// All deflectors of one kind and color.
#[derive(Debug, Deserialize)]
pub struct DeflectorLayout {
    pub kind: KindLayout,
    pub color: String,
    pub cells: Vec<(PositionEncoding, PositionEncoding)>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindLayout {
    Slash,
    Backslash,
}

#[derive(Debug, Deserialize)]
pub struct TargetLayout {
    pub color: String,
    pub position: (PositionEncoding, PositionEncoding),
}

fn default_side_length() -> PositionEncoding {
    STANDARD_SIDE_LENGTH
}

/// Reads the robots object entry by entry, keeping duplicate colors for validation.
fn robot_entries<'de, D>(
    deserializer: D,
) -> Result<Vec<(String, (PositionEncoding, PositionEncoding))>, D::Error>
where
    D: Deserializer<'de>,
{
    struct RobotEntries;

    impl<'de> Visitor<'de> for RobotEntries {
        type Value = Vec<(String, (PositionEncoding, PositionEncoding))>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object from robot colors to positions")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::new();
            while let Some(entry) = map.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(RobotEntries)
}

impl From<KindLayout> for DeflectorKind {
    fn from(kind: KindLayout) -> Self {
        match kind {
            KindLayout::Slash => DeflectorKind::Slash,
            KindLayout::Backslash => DeflectorKind::Backslash,
        }
    }
}

impl Layout {
    /// Reads a layout from the JSON file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open the board layout '{}'", path.display()))?;
        serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("Failed to parse the board layout '{}'", path.display()))
    }

    /// Validates the layout and creates the board.
    pub fn into_board(self) -> anyhow::Result<Board> {
        let mut deflectors = Vec::new();
        for group in &self.deflectors {
            let owner = parse_color(&group.color)?;
            for &cell in &group.cells {
                deflectors.push((Position::from(cell), Deflector::new(group.kind.into(), owner)));
            }
        }

        let robots = self
            .robots
            .iter()
            .map(|(color, pos)| Ok((parse_color(color)?, Position::from(*pos))))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let target = Target::new(
            parse_color(&self.target.color)?,
            self.target.position.into(),
        );

        let board = Board::from_parts(
            self.side_length,
            &self.horizontal_walls,
            &self.vertical_walls,
            &deflectors,
            &robots,
            target,
        )?;
        Ok(board)
    }
}

/// Parses the line based layout.
///
/// The first line holds the side length, followed by three sections each terminated by a line
/// containing a single `-`:
/// - walls as `x y d` (wall below the field) or `x y r` (wall right of the field),
/// - deflectors as `x y s color` (slash) or `x y b color` (backslash),
/// - robots as `color x y`.
///
/// The last line holds the target as `color x y`.
pub fn parse_lines<I>(lines: I) -> anyhow::Result<Board>
where
    I: IntoIterator<Item = String>,
{
    let mut lines = lines.into_iter().enumerate().map(|(n, line)| (n + 1, line));
    let mut next_line = || {
        lines
            .next()
            .ok_or_else(|| anyhow!("The board layout ended unexpectedly"))
    };

    let (n, side_length) = next_line()?;
    let side_length = side_length
        .trim()
        .parse::<PositionEncoding>()
        .with_context(|| format!("Line {}: invalid side length", n))?;
    if side_length == 0 || side_length > MAX_SIDE_LENGTH {
        return Err(MalformedBoard::UnsupportedSideLength(side_length).into());
    }
    let mut builder = BoardBuilder::new(side_length);

    loop {
        let (n, line) = next_line()?;
        let parts = line.split_whitespace().collect::<Vec<_>>();
        match parts.as_slice() {
            ["-"] => break,
            [x, y, side] => {
                let pos = parse_position(x, y, side_length).with_context(|| format!("Line {}", n))?;
                builder = match *side {
                    "d" => builder.set_horizontal_line(pos.column(), pos.row(), 1),
                    "r" => builder.set_vertical_line(pos.column(), pos.row(), 1),
                    _ => bail!("Line {}: expected 'd' or 'r' but found '{}'", n, side),
                };
            }
            _ => bail!("Line {}: expected a wall as 'x y d|r'", n),
        }
    }

    loop {
        let (n, line) = next_line()?;
        let parts = line.split_whitespace().collect::<Vec<_>>();
        match parts.as_slice() {
            ["-"] => break,
            [x, y, kind, color] => {
                let pos = parse_position(x, y, side_length).with_context(|| format!("Line {}", n))?;
                let kind = match *kind {
                    "s" => DeflectorKind::Slash,
                    "b" => DeflectorKind::Backslash,
                    _ => bail!("Line {}: expected 's' or 'b' but found '{}'", n, kind),
                };
                let owner = parse_color(color).with_context(|| format!("Line {}", n))?;
                builder = builder.deflector(pos, kind, owner);
            }
            _ => bail!("Line {}: expected a deflector as 'x y s|b color'", n),
        }
    }

    loop {
        let (n, line) = next_line()?;
        let parts = line.split_whitespace().collect::<Vec<_>>();
        match parts.as_slice() {
            ["-"] => break,
            [color, x, y] => {
                let robot = parse_color(color).with_context(|| format!("Line {}", n))?;
                let pos = parse_position(x, y, side_length).with_context(|| format!("Line {}", n))?;
                builder = builder.robot(robot, pos);
            }
            _ => bail!("Line {}: expected a robot as 'color x y'", n),
        }
    }

    let (n, line) = next_line()?;
    match line.split_whitespace().collect::<Vec<_>>().as_slice() {
        [color, x, y] => {
            let robot = parse_color(color).with_context(|| format!("Line {}", n))?;
            let pos = parse_position(x, y, side_length).with_context(|| format!("Line {}", n))?;
            builder = builder.target(robot, pos);
        }
        _ => bail!("Line {}: expected the target as 'color x y'", n),
    }

    Ok(builder.build()?)
}

/// Reads the line based layout line by line from `read_line` until the target line.
///
/// `read_line` reports the end of the input like `text_io` does when a line can't be finished.
/// Any other read error is returned instead of a parse error.
pub fn read_board<F>(mut read_line: F) -> anyhow::Result<Board>
where
    F: FnMut() -> Result<String, text_io::Error>,
{
    let mut read_error = None;
    let lines = std::iter::from_fn(|| match read_line() {
        Ok(line) => Some(line),
        Err(text_io::Error::UnexpectedValue(b'\n', None)) => None,
        Err(err) => {
            read_error = Some(err);
            None
        }
    });
    let board = parse_lines(lines);

    if let Some(err) = read_error {
        return Err(anyhow::Error::new(err).context("Failed to read the board layout"));
    }
    board
}

fn parse_color(color: &str) -> anyhow::Result<Robot> {
    Ok(color.parse::<Robot>()?)
}

fn parse_position(x: &str, y: &str, side_length: PositionEncoding) -> anyhow::Result<Position> {
    let pos = Position::new(
        x.parse().with_context(|| format!("Invalid column '{}'", x))?,
        y.parse().with_context(|| format!("Invalid row '{}'", y))?,
    );
    if !pos.in_bounds(side_length) {
        bail!("{} lies outside of the board", pos);
    }
    Ok(pos)
}

#[cfg(test)]
mod tests {
    use super::{parse_lines, read_board, Layout};
    use pipebot_board::{DeflectorKind, MalformedBoard, Position, Robot};

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn line_layout() {
        let board = parse_lines(lines(
            "8\n3 5 r\n2 2 d\n-\n6 2 b blue\n-\nred 0 2\nblue 6 0\n-\nred 3 5",
        ))
        .unwrap();

        assert_eq!(board.side_length(), 8);
        assert!(board.has_wall(Position::new(4, 5), pipebot_board::Direction::Left));
        assert!(board.has_wall(Position::new(2, 3), pipebot_board::Direction::Up));
        let deflector = board.deflector_at(Position::new(6, 2)).unwrap();
        assert_eq!(deflector.kind, DeflectorKind::Backslash);
        assert_eq!(deflector.owner, Robot::Blue);
        assert_eq!(board.robot_positions().get(Robot::Blue), Some(Position::new(6, 0)));
        assert_eq!(board.target().robot(), Robot::Red);
    }

    #[test]
    fn line_layout_errors() {
        assert!(parse_lines(lines("8\n9 0 r\n-\n-\nred 0 0\n-\nred 1 1")).is_err());
        assert!(parse_lines(lines("8\n-\n-\npurple 0 0\n-\nred 1 1")).is_err());
        assert!(parse_lines(lines("8\n-\n-\nred 0 0\n-")).is_err());
        // A deflector on a robot is rejected when building the board.
        assert!(parse_lines(lines("8\n-\n1 1 s red\n-\nred 1 1\n-\nred 2 2")).is_err());
    }

    fn reader(
        mut results: Vec<Result<String, text_io::Error>>,
    ) -> impl FnMut() -> Result<String, text_io::Error> {
        results.reverse();
        move || {
            results
                .pop()
                .unwrap_or(Err(text_io::Error::UnexpectedValue(b'\n', None)))
        }
    }

    #[test]
    fn read_errors_are_reported() {
        let lines = |count| {
            "4\n-\n-\nred 0 0\n-\nred 2 2"
                .lines()
                .take(count)
                .map(|line| Ok(line.to_string()))
                .collect::<Vec<_>>()
        };
        assert!(read_board(reader(lines(6))).is_ok());

        // The input ends before the target line.
        let err = read_board(reader(lines(5))).unwrap_err();
        assert!(err.to_string().contains("ended unexpectedly"));

        let mut broken = lines(2);
        broken.push(Err(text_io::Error::InvalidUtf8(vec![0xff])));
        let err = read_board(reader(broken)).unwrap_err();
        assert!(err.downcast_ref::<text_io::Error>().is_some());
        assert!(!err.to_string().contains("ended unexpectedly"));
    }

    #[test]
    fn json_layout() {
        let json = r#"{
            "side_length": 3,
            "horizontal_walls": [false, true, false, false, false, false],
            "vertical_walls": [false, false, false, false, false, true],
            "robots": { "red": [0, 0], "green": [2, 1] },
            "deflectors": [{ "kind": "slash", "color": "green", "cells": [[1, 1], [0, 2]] }],
            "target": { "color": "red", "position": [2, 2] }
        }"#;
        let layout: Layout = serde_json::from_str(json).unwrap();
        let board = layout.into_board().unwrap();

        assert!(board.has_wall(Position::new(1, 0), pipebot_board::Direction::Down));
        assert!(board.has_wall(Position::new(1, 2), pipebot_board::Direction::Right));
        assert_eq!(board.deflectors().count(), 2);
        assert_eq!(board.robot_positions().len(), 2);
    }

    #[test]
    fn json_layout_errors() {
        let json = r#"{
            "horizontal_walls": [],
            "vertical_walls": [],
            "robots": { "red": [0, 0] },
            "target": { "color": "red", "position": [2, 2] }
        }"#;
        let layout: Layout = serde_json::from_str(json).unwrap();
        assert_eq!(layout.side_length, 16);
        assert!(layout.into_board().is_err());

        let duplicate_robot = r#"{
            "side_length": 4,
            "horizontal_walls": [false, false, false, false, false, false,
                                 false, false, false, false, false, false],
            "vertical_walls": [false, false, false, false, false, false,
                               false, false, false, false, false, false],
            "robots": { "red": [0, 0], "red": [3, 3] },
            "target": { "color": "red", "position": [2, 2] }
        }"#;
        let layout: Layout = serde_json::from_str(duplicate_robot).unwrap();
        assert_eq!(layout.robots.len(), 2);
        let err = layout.into_board().unwrap_err();
        assert_eq!(
            err.downcast_ref::<MalformedBoard>(),
            Some(&MalformedBoard::DuplicateRobot(Robot::Red))
        );
    }
}
