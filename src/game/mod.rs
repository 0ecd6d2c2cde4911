pub mod board;
pub mod state;
mod zobrist;
