pub mod config;
pub mod game;
pub mod net;
pub mod utils;
