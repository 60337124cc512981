use crate::{Board, Position, PositionEncoding, Walls};
use draw_a_box::{find_character, Weight};

/// Width per field in the string in number of characters.
pub const FIELD_DRAW_WIDTH: usize = 5;

/// Height per field in the string in number of characters.
pub const FIELD_DRAW_HEIGHT: usize = 2;

/// Creates a string representation of a board.
///
/// Walls and the edge of the board are drawn heavy. Each field shows the robot on it by the upper
/// case initial of its color, a deflector by its symbol followed by the initial of its owner and
/// the target by `*` followed by the initial of the robot that has to reach it.
pub fn draw_board(board: &Board) -> String {
    let canvas = create_wall_canvas(board.get_walls());
    let side_length = board.side_length();
    let label_width = FIELD_DRAW_WIDTH - 1;
    let mut output = String::new();

    for row in 0..canvas[0].len() {
        let mut col = 0;
        while col < canvas.len() {
            let is_label_row = row % FIELD_DRAW_HEIGHT == 1;
            if is_label_row && col % FIELD_DRAW_WIDTH == 1 {
                let pos = Position::new(
                    (col / FIELD_DRAW_WIDTH) as PositionEncoding,
                    (row / FIELD_DRAW_HEIGHT) as PositionEncoding,
                );
                output.push_str(&format!("{:^1$}", field_label(board, pos), label_width));
                col += label_width;
                continue;
            }
            output.push_str(canvas[col][row]);
            col += 1;
        }
        output.push('\n');
    }

    debug_assert_eq!(
        output.lines().count(),
        side_length as usize * FIELD_DRAW_HEIGHT + 1
    );
    output
}

/// Returns the short description of everything on the field at `pos`.
fn field_label(board: &Board, pos: Position) -> String {
    let mut label = String::new();
    if let Some((robot, _)) = board.robot_positions().iter().find(|&(_, p)| p == pos) {
        label.push(robot.initial().to_ascii_uppercase());
    }
    if let Some(deflector) = board.deflector_at(pos) {
        label.push(deflector.kind.symbol());
        label.push(deflector.owner.initial());
    }
    let target = board.target();
    if target.position() == pos {
        label.push('*');
        label.push(target.robot().initial());
    }
    label
}

/// Creates the box drawing characters making up the walls of a board, indexed by column first.
///
/// Fields are left blank.
fn create_wall_canvas(walls: &Walls) -> Vec<Vec<&str>> {
    let width = walls.len();
    let height = walls[0].len();
    let canvas_width = width * FIELD_DRAW_WIDTH + 1;
    let canvas_height = height * FIELD_DRAW_HEIGHT + 1;

    let mut canvas = vec![vec![" "; canvas_height]; canvas_width];
    let weight = |is_set: bool| if is_set { Weight::Heavy } else { Weight::Light };

    // The wall left of the field column `col` in row `row`.
    let vertical = |col: usize, row: usize| {
        weight(col == 0 || col == width || walls[col - 1][row].right)
    };
    // The wall above the field column `col` in row `row`.
    let horizontal = |col: usize, row: usize| {
        weight(row == 0 || row == height || walls[col][row - 1].down)
    };

    for col in 0..=width {
        for row in 0..=height {
            let up = if row > 0 { vertical(col, row - 1) } else { Weight::Empty };
            let down = if row < height { vertical(col, row) } else { Weight::Empty };
            let left = if col > 0 { horizontal(col - 1, row) } else { Weight::Empty };
            let right = if col < width { horizontal(col, row) } else { Weight::Empty };
            let (x, y) = (col * FIELD_DRAW_WIDTH, row * FIELD_DRAW_HEIGHT);
            canvas[x][y] = find_character(up, right, down, left);

            if col < width {
                let line = find_character(Weight::Empty, right, Weight::Empty, right);
                for x in (x + 1)..(x + FIELD_DRAW_WIDTH) {
                    canvas[x][y] = line;
                }
            }
            if row < height {
                let line = find_character(down, Weight::Empty, down, Weight::Empty);
                for y in (y + 1)..(y + FIELD_DRAW_HEIGHT) {
                    canvas[x][y] = line;
                }
            }
        }
    }

    canvas
}
