use std::fmt;

use crate::game::board::{Board, Cell, Color, Move};

#[derive(Clone)]
struct Snapshot {
    board: Board,
    last_move: Option<Move>,
}

/// A board plus the full move history, supporting navigation backwards and
/// forwards through the game.
pub struct GameState {
    board: Board,
    move_num: usize,
    last_move: Option<Move>,
    resigned: Option<Color>,
    history: Vec<Snapshot>,
}

impl GameState {
    pub fn new() -> GameState {
        GameState::from_board(Board::new())
    }

    pub fn from_board(board: Board) -> GameState {
        let mut state = GameState {
            board,
            move_num: 0,
            last_move: None,
            resigned: None,
            history: vec![],
        };
        state.history.push(state.snapshot());
        state
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.clone(),
            last_move: self.last_move,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn move_num(&self) -> usize {
        self.move_num
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    pub fn set_to_move(&mut self, color: Color) {
        self.board.set_to_move(color);
    }

    pub fn is_move_legal(&self, color: Color, m: Move) -> bool {
        match m {
            Move::Pass | Move::Resign => true,
            Move::Place(vertex) => {
                !self.board.game_end()
                    && self.board.get(vertex) == Cell::Empty
                    && !self.board.is_forbidden(vertex, color)
            }
        }
    }

    /// Play a move as the color whose turn it is.
    pub fn play(&mut self, m: Move) {
        self.play_move(self.board.to_move(), m);
    }

    /// Apply a move and record it in the history. No legality check happens
    /// here, callers gate with `is_move_legal`; playing an occupied vertex
    /// is a programmer error.
    pub fn play_move(&mut self, color: Color, m: Move) {
        match m {
            Move::Resign => self.resigned = Some(color),
            Move::Pass => {
                self.board.pass(color);
                self.last_move = Some(m);
                self.move_num += 1;
            }
            Move::Place(vertex) => {
                self.board.play(color, vertex);
                self.last_move = Some(m);
                self.move_num += 1;
            }
        }

        // cut off any leftover moves from navigating
        self.history.truncate(self.move_num);
        self.history.push(self.snapshot());
    }

    /// Play a move given as text, e.g. ("b", "h8") or ("white", "pass").
    /// Returns false without touching the state if the input is not
    /// understood or the target cell is occupied.
    pub fn play_textmove(&mut self, color: &str, vertex: &str) -> bool {
        let who = match color.to_lowercase().as_str() {
            "w" | "white" => Color::White,
            "b" | "black" => Color::Black,
            _ => return false,
        };

        let m = match Move::from_text(vertex) {
            Some(m) => m,
            None => return false,
        };
        if let Move::Place(vertex) = m {
            if self.board.get(vertex) != Cell::Empty {
                return false;
            }
        }

        self.set_to_move(who);
        self.play(m);
        true
    }

    pub fn undo_move(&mut self) -> bool {
        if self.move_num == 0 {
            return false;
        }
        self.move_num -= 1;
        self.restore(self.move_num);
        true
    }

    pub fn forward_move(&mut self) -> bool {
        if self.history.len() > self.move_num + 1 {
            self.move_num += 1;
            self.restore(self.move_num);
            true
        } else {
            false
        }
    }

    pub fn rewind(&mut self) {
        self.move_num = 0;
        self.restore(0);
    }

    fn restore(&mut self, move_num: usize) {
        let snapshot = self.history[move_num].clone();
        self.board = snapshot.board;
        self.last_move = snapshot.last_move;
    }

    /// The board as it was `moves_ago` moves in the past, relative to the
    /// current position in the history.
    pub fn past_board(&self, moves_ago: usize) -> &Board {
        assert!(moves_ago <= self.move_num);
        &self.history[self.move_num - moves_ago].board
    }

    pub fn has_resigned(&self) -> bool {
        self.resigned.is_some()
    }

    pub fn who_resigned(&self) -> Option<Color> {
        self.resigned
    }

    pub fn game_end(&self) -> bool {
        self.board.game_end() || self.has_resigned()
    }

    pub fn final_score(&self) -> f32 {
        self.board.end_score()
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let to_move = match self.board.to_move() {
            Color::Black => "Black (X) to move",
            Color::White => "White (O) to move",
        };
        write!(f, "{}{}", to_move, self.board.render(self.last_move))
    }
}
