use clap::Parser;
use gomoku_zero::game::board::Color;
use gomoku_zero::game::state::GameState;
use gomoku_zero::net::common;
use gomoku_zero::utils;
use ndarray::Array4;
use std::fs;

#[derive(Parser, Debug)]
#[clap(about, long_about = None)]
struct Args {
    /// Comma separated moves played from the initial position, e.g. "h8,j9,k6"
    #[clap(long, default_value = "")]
    moves: String,
    #[clap(long)]
    outfile: String,
}

fn main() -> std::io::Result<()> {
    utils::init_globals();

    let args = Args::parse();
    let mut state = GameState::new();
    for move_text in args.moves.split(',').filter(|t| !t.is_empty()) {
        let color = match state.board().to_move() {
            Color::Black => "b",
            Color::White => "w",
        };
        if !state.play_textmove(color, move_text) {
            panic!("illegal move: {:?}", move_text);
        }
    }
    log::debug!("Encoding position:{}", state);

    let planes = common::position_to_planes(&state);
    let tensor = common::planes_to_tensor(&[planes]);
    tensor_to_json(tensor, &args.outfile)
}

fn tensor_to_json(tensor: Array4<f32>, filename: &String) -> std::io::Result<()> {
    fs::write(
        filename,
        json::object! {
            shape: tensor.shape().to_vec(),
            data: tensor.into_raw_vec(),
        }
        .dump(),
    )
}
