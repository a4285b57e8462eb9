use crate::error::Result;
use crate::game::common::IGame;
use crate::game::players_compare::PlayerComparator;
use crate::game::self_play_cmd::rng_source;
use crate::q_learning::agent::{QAgent, QParams};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(about, long_about = None)]
struct PlayersCompareArgs {
    #[clap(long, parse(from_os_str))]
    white_model: PathBuf,
    #[clap(long, parse(from_os_str))]
    black_model: PathBuf,
    #[clap(long, default_value = "1")]
    games_num: u32,
    /// Exploration rate of both players, 0 plays greedily
    #[clap(long, default_value = "0.0")]
    epsilon: f64,
    /// Print the board after every move
    #[clap(long)]
    verbose: bool,
    #[clap(long)]
    seed: Option<u64>,
    #[clap(long, parse(from_os_str))]
    result_file: Option<PathBuf>,
}

pub fn run_main<Game: IGame>() -> Result<()> {
    run::<Game>(PlayersCompareArgs::parse())
}

fn run<Game: IGame>(args: PlayersCompareArgs) -> Result<()> {
    let params = QParams {
        epsilon: args.epsilon,
        ..QParams::default()
    };
    let mut rngs = rng_source(args.seed);
    let mut white = QAgent::load_from_file(params, &args.white_model, rngs.next_rng())?;
    let mut black = QAgent::load_from_file(params, &args.black_model, rngs.next_rng())?;

    log::info!("Comparing between two players:");
    log::info!("\twhite: {}", args.white_model.display());
    log::info!("\tblack: {}", args.black_model.display());
    log::info!("\tnumber of games: {}", args.games_num);

    let results = PlayerComparator::<Game>::new(&mut white, &mut black, args.verbose)
        .compare_players(args.games_num)?;

    log::info!("Comparison results:");
    log::info!(
        "\twhite wins {}, black wins {}, draws {}",
        results.white_wins,
        results.black_wins,
        results.draws
    );

    if let Some(result_file) = &args.result_file {
        results.write_json(result_file)?;
    }
    Ok(())
}
