use gomoku_zero::net::gen_model_cmd;
use gomoku_zero::utils;

fn main() -> std::io::Result<()> {
    utils::init_globals();
    gen_model_cmd::run_main()
}
