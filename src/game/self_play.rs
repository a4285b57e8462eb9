use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rand::Rng;

use crate::error::{Error, Result};
use crate::game::common::{GameColor, GamePosition, GameStatus, IGame, PlayerRand};
use crate::q_learning::agent::QAgent;

/// How a side picks its moves during self-play.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SidePolicy {
    /// Epsilon-greedy over the agent's table, updated on rewarded transitions
    Learning,
    /// Uniformly random moves, the agent's table is never updated
    FrozenRandom,
}

impl FromStr for SidePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "learning" => Ok(SidePolicy::Learning),
            "frozen-random" => Ok(SidePolicy::FrozenRandom),
            other => Err(Error::config(format!(
                "unknown side policy '{}', expected one of: learning, frozen-random",
                other
            ))),
        }
    }
}

/// Where tables are written after every episode.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OutputNaming {
    /// Overwrite the configured file
    Overwrite,
    /// Write `<stem>_round<NNNN>.<ext>` next to the configured file
    PerRound,
}

impl OutputNaming {
    pub fn resolve(&self, base: &Path, round: u32) -> PathBuf {
        match self {
            OutputNaming::Overwrite => base.to_path_buf(),
            OutputNaming::PerRound => {
                let stem = base
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let file_name = match base.extension() {
                    Some(ext) => format!("{}_round{:04}.{}", stem, round, ext.to_string_lossy()),
                    None => format!("{}_round{:04}", stem, round),
                };
                base.with_file_name(file_name)
            }
        }
    }
}

impl FromStr for OutputNaming {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "overwrite" => Ok(OutputNaming::Overwrite),
            "per-round" => Ok(OutputNaming::PerRound),
            other => Err(Error::config(format!(
                "unknown output naming '{}', expected one of: overwrite, per-round",
                other
            ))),
        }
    }
}

/// Sign convention of the checkmate reward.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RewardPerspective {
    /// +1.0 when white mates, -1.0 when black mates
    White,
    /// +1.0 for the side that delivered mate
    Mover,
}

impl RewardPerspective {
    /// Reward of the transition made by `mover` that led to `status`, `None`
    /// while the game goes on or when it ends without a reward signal.
    pub fn reward(&self, status: GameStatus, mover: GameColor) -> Option<f64> {
        match status {
            GameStatus::Ongoing | GameStatus::FivefoldRepetition => None,
            GameStatus::Checkmate { winner } => {
                let favored = match self {
                    RewardPerspective::White => GameColor::White,
                    RewardPerspective::Mover => mover,
                };
                Some(if winner == favored { 1.0 } else { -1.0 })
            }
            GameStatus::Stalemate
            | GameStatus::InsufficientMaterial
            | GameStatus::SeventyFiveMoveRule => Some(0.0),
        }
    }
}

impl FromStr for RewardPerspective {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "white" => Ok(RewardPerspective::White),
            "mover" => Ok(RewardPerspective::Mover),
            other => Err(Error::config(format!(
                "unknown reward perspective '{}', expected one of: white, mover",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SelfPlayConfig {
    pub num_rounds: u32,
    pub white_policy: SidePolicy,
    pub black_policy: SidePolicy,
    pub white_output: Option<PathBuf>,
    pub black_output: Option<PathBuf>,
    pub output_naming: OutputNaming,
    pub reward_perspective: RewardPerspective,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            num_rounds: 50,
            white_policy: SidePolicy::Learning,
            black_policy: SidePolicy::Learning,
            white_output: None,
            black_output: None,
            output_naming: OutputNaming::Overwrite,
            reward_perspective: RewardPerspective::White,
        }
    }
}

impl SelfPlayConfig {
    fn policy(&self, color: GameColor) -> SidePolicy {
        match color {
            GameColor::White => self.white_policy,
            GameColor::Black => self.black_policy,
        }
    }

    fn output(&self, color: GameColor) -> Option<&Path> {
        match color {
            GameColor::White => self.white_output.as_deref(),
            GameColor::Black => self.black_output.as_deref(),
        }
    }
}

#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct GamesResults {
    pub white_wins: u32,
    pub black_wins: u32,
    pub draws: u32,
}

impl GamesResults {
    pub fn record(&mut self, winner: Option<GameColor>) {
        match winner {
            Some(GameColor::White) => self.white_wins += 1,
            Some(GameColor::Black) => self.black_wins += 1,
            None => self.draws += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.white_wins + self.black_wins + self.draws
    }

    pub fn write_json(&self, result_file: &Path) -> Result<()> {
        fs::write(
            result_file,
            json::object! {
                white_wins: self.white_wins,
                black_wins: self.black_wins,
                draws: self.draws,
            }
            .dump(),
        )
        .map_err(|source| Error::Io {
            operation: format!("write results to {}", result_file.display()),
            source,
        })
    }
}

/// Outcome of a single self-play episode.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct EpisodeSummary {
    pub status: GameStatus,
    pub half_moves: u32,
    pub updates: u32,
}

/// Plays episodes between a white and a black agent, updating the acting
/// agent on rewarded transitions and persisting both tables after every
/// episode.
pub struct SelfPlayRunner<Game: IGame, R: Rng> {
    white: QAgent<R>,
    black: QAgent<R>,
    random_player: PlayerRand<R>,
    config: SelfPlayConfig,
    _game: PhantomData<Game>,
}

impl<Game: IGame, R: Rng> SelfPlayRunner<Game, R> {
    pub fn new(
        white: QAgent<R>,
        black: QAgent<R>,
        random_player: PlayerRand<R>,
        config: SelfPlayConfig,
    ) -> Self {
        for (color, agent) in [(GameColor::White, &white), (GameColor::Black, &black)] {
            if config.policy(color) == SidePolicy::Learning && agent.params().epsilon >= 1.0 {
                log::warn!(
                    "{} agent learns with epsilon={}, its moves never follow its learned values",
                    color,
                    agent.params().epsilon
                );
            }
        }
        Self {
            white,
            black,
            random_player,
            config,
            _game: PhantomData,
        }
    }

    pub fn white(&self) -> &QAgent<R> {
        &self.white
    }

    pub fn black(&self) -> &QAgent<R> {
        &self.black
    }

    pub fn into_agents(self) -> (QAgent<R>, QAgent<R>) {
        (self.white, self.black)
    }

    fn agent(&self, color: GameColor) -> &QAgent<R> {
        match color {
            GameColor::White => &self.white,
            GameColor::Black => &self.black,
        }
    }

    fn agent_mut(&mut self, color: GameColor) -> &mut QAgent<R> {
        match color {
            GameColor::White => &mut self.white,
            GameColor::Black => &mut self.black,
        }
    }

    pub fn run(&mut self) -> Result<GamesResults> {
        let mut results = GamesResults::default();
        let num_rounds = self.config.num_rounds;

        for round in 1..=num_rounds {
            log::info!("Round {}/{}", round, num_rounds);

            let summary = self.play_episode()?;
            results.record(summary.status.winner());
            log::info!(
                "Winner: {} ({:?} after {} half moves)",
                summary
                    .status
                    .winner()
                    .map_or_else(|| "draw".to_string(), |c| c.to_string()),
                summary.status,
                summary.half_moves
            );

            self.persist(round)?;
        }

        log::info!(
            "Results: white wins {}, black wins {}, draws {}",
            results.white_wins,
            results.black_wins,
            results.draws
        );
        Ok(results)
    }

    pub fn play_episode(&mut self) -> Result<EpisodeSummary> {
        let mut game = Game::new();
        let mut half_moves = 0;
        let mut updates = 0;

        while !game.is_over() {
            let position = *game.get_position();
            let turn = position.get_turn();
            let state = position.encode();
            let legal_moves = position.get_legal_moves();

            let action = match self.config.policy(turn) {
                SidePolicy::Learning => self.agent_mut(turn).choose_action(&state, &legal_moves)?,
                SidePolicy::FrozenRandom => self.random_player.choose(&legal_moves)?,
            };

            game.play_single_turn(action)?;
            half_moves += 1;

            let reward = self.config.reward_perspective.reward(game.status(), turn);
            if let (Some(reward), SidePolicy::Learning) = (reward, self.config.policy(turn)) {
                let next_position = game.get_position();
                let next_state = next_position.encode();
                let next_legal_moves = next_position.get_legal_moves();
                self.agent_mut(turn)
                    .update(&state, &action, reward, &next_state, &next_legal_moves);
                updates += 1;
            }
        }

        Ok(EpisodeSummary {
            status: game.status(),
            half_moves,
            updates,
        })
    }

    fn persist(&self, round: u32) -> Result<()> {
        for color in [GameColor::White, GameColor::Black] {
            if let Some(base) = self.config.output(color) {
                let path = self.config.output_naming.resolve(base, round);
                let agent = self.agent(color);
                agent.save_to_file(&path)?;
                log::debug!(
                    "Saved {} table ({} entries) to {}",
                    color,
                    agent.table().len(),
                    path.display()
                );
            }
        }
        Ok(())
    }
}
