use qchess::chess::chess_game::ChessGame;
use qchess::game::self_play_cmd::run_main;
use qchess::utils::init_globals;

fn main() {
    init_globals();
    if let Err(e) = run_main::<ChessGame>() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
