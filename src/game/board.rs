use std::fmt;

use crate::game::zobrist::ZOBRIST;

pub const BOARD_SIZE: usize = 15;
pub const NUM_INTERSECTIONS: usize = BOARD_SIZE * BOARD_SIZE;
pub const NUM_IN_A_ROW: usize = 5;

/// Playable area plus a one-vertex border of invalid cells, so line walks
/// never need explicit bounds checks.
pub const SIDE_VERTICES: usize = BOARD_SIZE + 2;
pub const NUM_VERTICES: usize = SIDE_VERTICES * SIDE_VERTICES;

/// Steps along the four line directions and their opposites: DIRS[d] and
/// DIRS[d + 4] point away from each other for d in 0..4.
const DIRS: [isize; 8] = [
    -(SIDE_VERTICES as isize),     // down
    1,                             // right
    -(SIDE_VERTICES as isize) + 1, // down-right
    SIDE_VERTICES as isize + 1,    // up-right
    SIDE_VERTICES as isize,        // up
    -1,                            // left
    SIDE_VERTICES as isize - 1,    // up-left
    -(SIDE_VERTICES as isize) - 1, // down-left
];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    fn idx(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Black,
    White,
    Empty,
    Invalid,
}

impl Cell {
    pub fn of(color: Color) -> Cell {
        match color {
            Color::Black => Cell::Black,
            Color::White => Cell::White,
        }
    }

    pub fn color(self) -> Option<Color> {
        match self {
            Cell::Black => Some(Color::Black),
            Cell::White => Some(Color::White),
            Cell::Empty | Cell::Invalid => None,
        }
    }

    fn zobrist_row(self) -> Option<usize> {
        match self {
            Cell::Black => Some(0),
            Cell::White => Some(1),
            Cell::Empty => Some(2),
            Cell::Invalid => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Move {
    Place(usize),
    Pass,
    Resign,
}

impl Move {
    /// Parse a textual move: a column letter (skipping 'i') followed by a
    /// 1-based row number, or "pass"/"resign". Case insensitive.
    pub fn from_text(text: &str) -> Option<Move> {
        let text = text.to_lowercase();
        match text.as_str() {
            "pass" => return Some(Move::Pass),
            "resign" => return Some(Move::Resign),
            _ => {}
        }

        let mut chars = text.chars();
        let column_char = chars.next()?;
        if !column_char.is_ascii_lowercase() || column_char == 'i' {
            return None;
        }
        let mut column = column_char as usize - 'a' as usize;
        if column_char > 'i' {
            column -= 1;
        }

        let row: usize = chars.as_str().parse().ok()?;
        if row == 0 || row > BOARD_SIZE || column >= BOARD_SIZE {
            return None;
        }
        Some(Move::Place(Board::vertex(column, row - 1)))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Pass => write!(f, "pass"),
            Move::Resign => write!(f, "resign"),
            Move::Place(vertex) => {
                let (x, y) = Board::xy(*vertex);
                let column = if x < 8 { b'A' + x as u8 } else { b'A' + x as u8 + 1 };
                write!(f, "{}{}", column as char, y + 1)
            }
        }
    }
}

/// Classification of the line through a vertex in one direction, as used by
/// the forbidden-move rules.
#[derive(Clone, Copy, PartialEq, Eq)]
enum LineKind {
    LiveThree,
    LiveFour,
    BlockedFour,
    Five,
    Overline,
    Other,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    state: [Cell; NUM_VERTICES],
    to_move: Color,
    hash: u64,
    empty_count: usize,
    ended: bool,
    winner: Option<Color>,
}

impl Board {
    pub fn new() -> Board {
        let mut state = [Cell::Invalid; NUM_VERTICES];
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                state[Board::vertex(x, y)] = Cell::Empty;
            }
        }
        let mut board = Board {
            state,
            to_move: Color::Black,
            hash: 0,
            empty_count: NUM_INTERSECTIONS,
            ended: false,
            winner: None,
        };
        board.hash = board.calc_hash();
        board
    }

    pub fn vertex(x: usize, y: usize) -> usize {
        assert!(x < BOARD_SIZE && y < BOARD_SIZE);
        (y + 1) * SIDE_VERTICES + (x + 1)
    }

    pub fn xy(vertex: usize) -> (usize, usize) {
        let x = (vertex % SIDE_VERTICES) - 1;
        let y = (vertex / SIDE_VERTICES) - 1;
        assert!(x < BOARD_SIZE && y < BOARD_SIZE);
        (x, y)
    }

    fn in_board(vertex: isize) -> bool {
        if vertex < 0 || vertex >= NUM_VERTICES as isize {
            return false;
        }
        let x = vertex as usize % SIDE_VERTICES;
        let y = vertex as usize / SIDE_VERTICES;
        (1..=BOARD_SIZE).contains(&x) && (1..=BOARD_SIZE).contains(&y)
    }

    pub fn get(&self, vertex: usize) -> Cell {
        assert!(vertex < NUM_VERTICES);
        self.state[vertex]
    }

    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.get(Board::vertex(x, y))
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn set_to_move(&mut self, color: Color) {
        if self.to_move != color {
            self.hash ^= ZOBRIST.black_to_move;
        }
        self.to_move = color;
    }

    pub fn game_end(&self) -> bool {
        self.ended
    }

    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    /// Result from black's point of view: 1 for a black win, -1 for a white
    /// win, 0 for a draw or an unfinished game.
    pub fn end_score(&self) -> f32 {
        if !self.ended {
            return 0.0;
        }
        match self.winner {
            Some(Color::Black) => 1.0,
            Some(Color::White) => -1.0,
            None => 0.0,
        }
    }

    pub fn empty_count(&self) -> usize {
        self.empty_count
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Place a stone and pass the turn to the other color. The vertex must be
    /// empty; forbidden-move legality is the caller's concern.
    pub fn play(&mut self, color: Color, vertex: usize) {
        assert!(self.state[vertex] == Cell::Empty);

        self.hash ^= ZOBRIST.cells[2][vertex] ^ ZOBRIST.cells[color.idx()][vertex];
        self.state[vertex] = Cell::of(color);
        self.empty_count -= 1;
        self.update_win_info(vertex, color);

        self.finish_turn(color);
    }

    /// Pass the turn without touching the board.
    pub fn pass(&mut self, color: Color) {
        self.finish_turn(color);
    }

    fn finish_turn(&mut self, color: Color) {
        if self.to_move == color {
            self.hash ^= ZOBRIST.black_to_move;
        }
        self.to_move = color.opposite();
    }

    fn update_win_info(&mut self, vertex: usize, color: Color) {
        for direction in 0..4 {
            if self.line_length(vertex, color, direction) >= NUM_IN_A_ROW {
                self.ended = true;
                self.winner = Some(color);
            }
        }
        if self.empty_count == 0 && !self.ended {
            self.ended = true;
        }
    }

    /// Number of contiguous `color` stones through `vertex` along one of the
    /// four line directions, counting `vertex` itself.
    fn line_length(&self, vertex: usize, color: Color, direction: usize) -> usize {
        let (forward, _) = self.run(vertex, color, DIRS[direction]);
        let (backward, _) = self.run(vertex, color, DIRS[direction + 4]);
        1 + forward + backward
    }

    /// Walk from `vertex` in steps of `dir` while cells hold `color` stones.
    /// Returns the stone count and the position the walk stopped at.
    fn run(&self, vertex: usize, color: Color, dir: isize) -> (usize, isize) {
        let stone = Cell::of(color);
        let mut count = 0;
        let mut pos = vertex as isize + dir;
        while Board::in_board(pos) && self.state[pos as usize] == stone {
            count += 1;
            pos += dir;
        }
        (count, pos)
    }

    /// Number of empty cells (at most two) extending the run from the
    /// position it stopped at.
    fn open_span(&self, from: isize, dir: isize) -> usize {
        let mut open = 0;
        if Board::in_board(from) && self.state[from as usize] == Cell::Empty {
            open += 1;
            let next = from + dir;
            if Board::in_board(next) && self.state[next as usize] == Cell::Empty {
                open += 1;
            }
        }
        open
    }

    /// Runs are contiguous stones only, a gap ends the run.
    fn classify_line(&self, vertex: usize, color: Color, direction: usize) -> LineKind {
        let forward_dir = DIRS[direction];
        let backward_dir = DIRS[direction + 4];

        let (forward, forward_stop) = self.run(vertex, color, forward_dir);
        let forward_open = self.open_span(forward_stop, forward_dir);
        let (backward, backward_stop) = self.run(vertex, color, backward_dir);
        let backward_open = self.open_span(backward_stop, backward_dir);

        let stones = 1 + forward + backward;
        if stones > NUM_IN_A_ROW {
            LineKind::Overline
        } else if stones == NUM_IN_A_ROW {
            LineKind::Five
        } else if stones == NUM_IN_A_ROW - 1 {
            if forward_open >= 1 && backward_open >= 1 {
                LineKind::LiveFour
            } else if forward_open + backward_open == 1 {
                LineKind::BlockedFour
            } else {
                LineKind::Other
            }
        } else if stones == NUM_IN_A_ROW - 2
            && ((forward_open >= 1 && backward_open >= 2)
                || (forward_open >= 2 && backward_open >= 1))
        {
            LineKind::LiveThree
        } else {
            LineKind::Other
        }
    }

    /// Renju restrictions, applied to black only: placing at `vertex` is
    /// forbidden if it makes an overline, two or more fours, or two or more
    /// live threes, unless the same stone also completes an exact five.
    ///
    /// The vertex is assumed to be empty.
    pub fn is_forbidden(&self, vertex: usize, color: Color) -> bool {
        if color == Color::White {
            return false;
        }

        let mut has_overline = false;
        let mut has_five = false;
        let mut num_four = 0;
        let mut num_live_three = 0;
        for direction in 0..4 {
            match self.classify_line(vertex, color, direction) {
                LineKind::Overline => has_overline = true,
                LineKind::Five => has_five = true,
                LineKind::LiveFour | LineKind::BlockedFour => num_four += 1,
                LineKind::LiveThree => num_live_three += 1,
                LineKind::Other => {}
            }
        }

        if has_five {
            return false;
        }
        has_overline || num_four >= 2 || num_live_three >= 2
    }

    pub fn calc_hash(&self) -> u64 {
        let mut hash = ZOBRIST.initial;
        for (vertex, cell) in self.state.iter().enumerate() {
            if let Some(row) = cell.zobrist_row() {
                hash ^= ZOBRIST.cells[row][vertex];
            }
        }
        if self.to_move == Color::Black {
            hash ^= ZOBRIST.black_to_move;
        }
        hash
    }

    /// Build a board from a string of 225 cell characters ('x', 'o' or 'e',
    /// whitespace ignored) followed by the color to move ('x' or 'o'). Rows
    /// are given top to bottom, as displayed.
    pub fn from_str(s: &str) -> Board {
        let chars = s.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>();
        assert_eq!(
            chars.len(),
            NUM_INTERSECTIONS + 1,
            "unexpected string length"
        );

        let mut board = Board::new();
        for (idx, c) in chars[..NUM_INTERSECTIONS].iter().enumerate() {
            let x = idx % BOARD_SIZE;
            let y = BOARD_SIZE - 1 - idx / BOARD_SIZE;
            let vertex = Board::vertex(x, y);
            match c {
                'x' => board.state[vertex] = Cell::Black,
                'o' => board.state[vertex] = Cell::White,
                'e' => {}
                _ => panic!("unknown board char: {:?}", c),
            }
            if board.state[vertex] != Cell::Empty {
                board.empty_count -= 1;
            }
        }
        board.to_move = match chars[NUM_INTERSECTIONS] {
            'x' => Color::Black,
            'o' => Color::White,
            c => panic!("unknown turn char: {:?}", c),
        };

        for vertex in 0..NUM_VERTICES {
            if let Some(color) = board.state[vertex].color() {
                board.update_win_info(vertex, color);
            }
        }
        board.hash = board.calc_hash();
        board
    }

    /// Text rendering in the style of the interactive tools: column letters
    /// (skipping 'i'), rows top to bottom, the last move in parentheses.
    pub fn render(&self, last_move: Option<Move>) -> String {
        let last_vertex = match last_move {
            Some(Move::Place(vertex)) => Some(vertex),
            _ => None,
        };
        let columns = (0..BOARD_SIZE)
            .map(|x| {
                let c = b'a' + x as u8;
                let c = if c < b'i' { c } else { c + 1 };
                format!("{} ", c as char)
            })
            .collect::<String>();

        let mut out = String::new();
        out.push_str(&format!("\n   {}\n", columns.trim_end()));
        for y in (0..BOARD_SIZE).rev() {
            out.push_str(&format!("{:2}", y + 1));
            out.push(if last_vertex == Some(Board::vertex(0, y)) {
                '('
            } else {
                ' '
            });
            for x in 0..BOARD_SIZE {
                out.push(match self.cell(x, y) {
                    Cell::Black => 'X',
                    Cell::White => 'O',
                    _ => '.',
                });
                if last_vertex == Some(Board::vertex(x, y)) {
                    out.push(')');
                } else if x != BOARD_SIZE - 1 && last_vertex == Some(Board::vertex(x, y) + 1) {
                    out.push('(');
                } else {
                    out.push(' ');
                }
            }
            out.push_str(&format!("{:2}\n", y + 1));
        }
        out.push_str(&format!("   {}\n", columns.trim_end()));
        out
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(None))
    }
}
