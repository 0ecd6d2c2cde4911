use clap::Parser;
use gomoku_zero::net::serializer;
use gomoku_zero::utils;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(about, long_about = None)]
struct Args {
    #[clap(long)]
    weights: PathBuf,
}

fn main() -> std::io::Result<()> {
    utils::init_globals();

    let args = Args::parse();
    let weights = serializer::read_weights(&args.weights)?;

    log::info!("Weights file {}:", args.weights.display());
    log::info!("\tformat version: {}", weights.version);
    log::info!("\tresidual blocks: {}", weights.residual_blocks);
    log::info!("\tresidual filters: {}", weights.residual_filters);
    log::info!("\ttotal parameters: {}", weights.num_params());
    Ok(())
}
