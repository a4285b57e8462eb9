use crate::error::{Error, Result};
use crate::game::common::{GameColor, IGame, PlayerRand};
use crate::game::self_play::{
    OutputNaming, RewardPerspective, SelfPlayConfig, SelfPlayRunner, SidePolicy,
};
use crate::q_learning::agent::{QAgent, QParams};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(about, long_about = None)]
struct SelfPlayArgs {
    #[clap(long, default_value = "50")]
    num_rounds: u32,
    #[clap(long, default_value = "0.4")]
    white_alpha: f64,
    #[clap(long, default_value = "1.0")]
    white_epsilon: f64,
    #[clap(long, default_value = "0.9")]
    white_discount: f64,
    #[clap(long, default_value = "0.4")]
    black_alpha: f64,
    #[clap(long, default_value = "1.0")]
    black_epsilon: f64,
    #[clap(long, default_value = "0.9")]
    black_discount: f64,
    #[clap(long, parse(from_os_str))]
    white_model_in: Option<PathBuf>,
    #[clap(long, parse(from_os_str))]
    black_model_in: Option<PathBuf>,
    #[clap(long, parse(from_os_str), default_value = "white_agent.qtable")]
    white_model_out: PathBuf,
    #[clap(long, parse(from_os_str), default_value = "black_agent.qtable")]
    black_model_out: PathBuf,
    #[clap(long, default_value = "learning")]
    white_policy: SidePolicy,
    #[clap(long, default_value = "learning")]
    black_policy: SidePolicy,
    #[clap(long, default_value = "overwrite")]
    output_naming: OutputNaming,
    #[clap(long, default_value = "white")]
    reward_perspective: RewardPerspective,
    #[clap(long)]
    seed: Option<u64>,
    #[clap(long, parse(from_os_str))]
    result_file: Option<PathBuf>,
}

pub fn run_main<Game: IGame>() -> Result<()> {
    run::<Game>(SelfPlayArgs::parse())
}

fn run<Game: IGame>(args: SelfPlayArgs) -> Result<()> {
    if args.num_rounds == 0 {
        return Err(Error::config("num-rounds must be positive"));
    }

    let mut rngs = rng_source(args.seed);
    let white_params = QParams {
        alpha: args.white_alpha,
        epsilon: args.white_epsilon,
        discount: args.white_discount,
    };
    let black_params = QParams {
        alpha: args.black_alpha,
        epsilon: args.black_epsilon,
        discount: args.black_discount,
    };
    let white = load_agent(
        GameColor::White,
        white_params,
        args.white_model_in.as_deref(),
        rngs.next_rng(),
    )?;
    let black = load_agent(
        GameColor::Black,
        black_params,
        args.black_model_in.as_deref(),
        rngs.next_rng(),
    )?;

    let config = SelfPlayConfig {
        num_rounds: args.num_rounds,
        white_policy: args.white_policy,
        black_policy: args.black_policy,
        white_output: Some(args.white_model_out),
        black_output: Some(args.black_model_out),
        output_naming: args.output_naming,
        reward_perspective: args.reward_perspective,
    };

    let mut runner = SelfPlayRunner::<Game, StdRng>::new(
        white,
        black,
        PlayerRand::with_rng(rngs.next_rng()),
        config,
    );
    let results = runner.run()?;

    if let Some(result_file) = &args.result_file {
        results.write_json(result_file)?;
    }
    Ok(())
}

fn load_agent(
    color: GameColor,
    params: QParams,
    model_in: Option<&Path>,
    rng: StdRng,
) -> Result<QAgent> {
    match model_in {
        Some(path) => {
            let agent = QAgent::load_from_file(params, path, rng)?;
            log::info!(
                "Loaded {} table with {} entries from {}",
                color,
                agent.table().len(),
                path.display()
            );
            Ok(agent)
        }
        None => {
            log::warn!("No input table for {}, starting cold with an empty table", color);
            QAgent::new(params, rng)
        }
    }
}

/// Independent random sources derived from an optional seed.
pub(crate) struct RngSource {
    seed: Option<u64>,
}

impl RngSource {
    pub(crate) fn next_rng(&mut self) -> StdRng {
        match &mut self.seed {
            Some(seed) => {
                let rng = StdRng::seed_from_u64(*seed);
                *seed = seed.wrapping_add(1);
                rng
            }
            None => StdRng::from_entropy(),
        }
    }
}

pub(crate) fn rng_source(seed: Option<u64>) -> RngSource {
    RngSource { seed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::test_util::RaceGame;
    use crate::q_learning::value_table::ValueTable;

    fn parse(args: &[&str]) -> SelfPlayArgs {
        SelfPlayArgs::try_parse_from(std::iter::once("self_play").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn defaults_match_the_training_setup() {
        let args = parse(&[]);
        assert_eq!(args.num_rounds, 50);
        assert_eq!(args.white_alpha, 0.4);
        assert_eq!(args.white_epsilon, 1.0);
        assert_eq!(args.black_discount, 0.9);
        assert_eq!(args.white_policy, SidePolicy::Learning);
        assert_eq!(args.output_naming, OutputNaming::Overwrite);
        assert_eq!(args.reward_perspective, RewardPerspective::White);
        assert!(args.white_model_in.is_none());
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let result = SelfPlayArgs::try_parse_from(["self_play", "--white-policy", "lazy"]);
        assert!(result.is_err());
    }

    #[test]
    fn zero_rounds_is_a_configuration_error() {
        let args = parse(&["--num-rounds", "0"]);
        assert!(matches!(
            run::<RaceGame>(args),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn invalid_hyperparameters_are_rejected() {
        let args = parse(&["--black-discount", "1.0"]);
        assert!(matches!(
            run::<RaceGame>(args),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn missing_input_table_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.qtable");
        let args = parse(&["--white-model-in", missing.to_str().unwrap()]);
        assert!(matches!(
            run::<RaceGame>(args),
            Err(Error::Deserialization { .. })
        ));
    }

    #[test]
    fn trains_from_existing_tables_and_writes_results() {
        let dir = tempfile::tempdir().unwrap();
        let white_in = dir.path().join("white_in.qtable");
        let mut seeded = ValueTable::new();
        seeded.set("0:white", "+2", 0.75);
        seeded.save_to_file(&white_in).unwrap();

        let white_out = dir.path().join("white.qtable");
        let black_out = dir.path().join("black.qtable");
        let result_file = dir.path().join("results.json");
        let args = parse(&[
            "--num-rounds",
            "4",
            "--seed",
            "7",
            "--white-model-in",
            white_in.to_str().unwrap(),
            "--white-model-out",
            white_out.to_str().unwrap(),
            "--black-model-out",
            black_out.to_str().unwrap(),
            "--result-file",
            result_file.to_str().unwrap(),
        ]);
        run::<RaceGame>(args).unwrap();

        let white = ValueTable::load_from_file(&white_out).unwrap();
        assert_eq!(white.peek("0:white", "+2"), Some(0.75));
        assert!(black_out.exists());

        let results = json::parse(&std::fs::read_to_string(&result_file).unwrap()).unwrap();
        let total = results["white_wins"].as_u32().unwrap()
            + results["black_wins"].as_u32().unwrap()
            + results["draws"].as_u32().unwrap();
        assert_eq!(total, 4);
    }

    #[test]
    fn seeded_rngs_are_reproducible() {
        use rand::Rng;
        let mut a = rng_source(Some(3));
        let mut b = rng_source(Some(3));
        for _ in 0..3 {
            assert_eq!(a.next_rng().gen::<u64>(), b.next_rng().gen::<u64>());
        }
    }
}
