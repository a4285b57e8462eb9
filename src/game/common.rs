use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use std::fmt::{self, Debug, Display};
use std::hash::Hash;

use crate::error::{Error, Result};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum GameColor {
    White,
    Black,
}

impl GameColor {
    pub fn opposite(&self) -> GameColor {
        match self {
            GameColor::White => GameColor::Black,
            GameColor::Black => GameColor::White,
        }
    }
}

impl Display for GameColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameColor::White => "white",
            GameColor::Black => "black",
        })
    }
}

/// Status of a game after the last applied move.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum GameStatus {
    Ongoing,
    Checkmate { winner: GameColor },
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoveRule,
    FivefoldRepetition,
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        *self != GameStatus::Ongoing
    }

    /// The winner of a finished game, `None` for draws and unfinished games.
    pub fn winner(&self) -> Option<GameColor> {
        match self {
            GameStatus::Checkmate { winner } => Some(*winner),
            _ => None,
        }
    }
}

pub trait IGame: Sized {
    type Position: GamePosition<Game = Self>;
    type Move: GameMove<Game = Self>;

    fn new() -> Self;
    fn new_from_pos(pos: Self::Position) -> Self;
    fn get_position(&self) -> &Self::Position;
    fn status(&self) -> GameStatus;
    /// Apply a move. Illegal moves and moves after the game is over are
    /// rules engine errors.
    fn play_single_turn(&mut self, next_move: Self::Move) -> Result<()>;

    fn is_over(&self) -> bool {
        self.status().is_over()
    }

    fn get_winner(&self) -> Option<GameColor> {
        self.status().winner()
    }
}

pub trait GamePosition: Clone + Copy + Eq + Hash {
    type Game: IGame<Position = Self>;

    fn get_turn(&self) -> GameColor;
    fn get_legal_moves(&self) -> Vec<<Self::Game as IGame>::Move>;
    /// Exact encoding of the position, used as the state key of value tables.
    fn encode(&self) -> String;
    fn print(&self);
}

/// The `Display` form of a move is its action key.
pub trait GameMove: Clone + Copy + Eq + Hash + Display + Debug {
    type Game: IGame<Move = Self>;
}

pub trait GamePlayer<Game: IGame> {
    fn next_move(&mut self, position: &Game::Position) -> Result<Game::Move>;
}

/// Plays uniformly random legal moves.
pub struct PlayerRand<R: Rng = StdRng> {
    rand: R,
}

impl Default for PlayerRand {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerRand {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PlayerRand<R> {
    pub fn with_rng(rand: R) -> Self {
        Self { rand }
    }

    pub fn choose<M: Clone>(&mut self, moves: &[M]) -> Result<M> {
        if moves.is_empty() {
            return Err(Error::InvalidInput {
                message: "no legal moves to choose from".to_string(),
            });
        }
        Ok(moves[self.rand.gen_range(0..moves.len())].clone())
    }
}

impl<Game: IGame, R: Rng> GamePlayer<Game> for PlayerRand<R> {
    fn next_move(&mut self, position: &Game::Position) -> Result<Game::Move> {
        self.choose(&position.get_legal_moves())
    }
}
