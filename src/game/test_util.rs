//! A tiny two-player race used to exercise the game drivers without chess.
//!
//! Players alternately add one or two to a shared counter. Reaching
//! [`RACE_TARGET`] exactly wins, overshooting it is a draw. [`ScriptedGame`]
//! ends after a fixed number of half moves with a chosen status.

use std::fmt;
use std::marker::PhantomData;

use crate::error::{Error, Result};
use crate::game::common::{GameColor, GameMove, GamePosition, GameStatus, IGame};

pub const RACE_TARGET: u8 = 4;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RaceMove(pub u8);

impl GameMove for RaceMove {
    type Game = RaceGame;
}

impl fmt::Display for RaceMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RacePosition {
    pub count: u8,
    pub turn: GameColor,
    pub status: GameStatus,
}

impl RacePosition {
    pub fn new() -> Self {
        Self {
            count: 0,
            turn: GameColor::White,
            status: GameStatus::Ongoing,
        }
    }
}

impl GamePosition for RacePosition {
    type Game = RaceGame;

    fn get_turn(&self) -> GameColor {
        self.turn
    }

    fn get_legal_moves(&self) -> Vec<RaceMove> {
        if self.status.is_over() {
            vec![]
        } else {
            vec![RaceMove(1), RaceMove(2)]
        }
    }

    fn encode(&self) -> String {
        format!("{}:{}", self.count, self.turn)
    }

    fn print(&self) {
        println!("count {} ({} to move)", self.count, self.turn);
    }
}

pub struct RaceGame {
    pos: RacePosition,
}

impl IGame for RaceGame {
    type Position = RacePosition;
    type Move = RaceMove;

    fn new() -> Self {
        Self::new_from_pos(RacePosition::new())
    }

    fn new_from_pos(pos: RacePosition) -> Self {
        Self { pos }
    }

    fn get_position(&self) -> &RacePosition {
        &self.pos
    }

    fn status(&self) -> GameStatus {
        self.pos.status
    }

    fn play_single_turn(&mut self, next_move: RaceMove) -> Result<()> {
        if !self.pos.get_legal_moves().contains(&next_move) {
            return Err(Error::rules(format!("illegal race move {}", next_move)));
        }
        let count = self.pos.count + next_move.0;
        let status = if count == RACE_TARGET {
            GameStatus::Checkmate {
                winner: self.pos.turn,
            }
        } else if count > RACE_TARGET {
            GameStatus::Stalemate
        } else {
            GameStatus::Ongoing
        };
        self.pos = RacePosition {
            count,
            turn: self.pos.turn.opposite(),
            status,
        };
        Ok(())
    }
}

/// How a [`ScriptedGame`] ends.
pub trait Ending: Clone + Copy + PartialEq + Eq + std::hash::Hash + fmt::Debug {
    /// Number of half moves before the game ends.
    const HALF_MOVES: u8;
    const STATUS: GameStatus;
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EndsInRepetition;

impl Ending for EndsInRepetition {
    const HALF_MOVES: u8 = 1;
    const STATUS: GameStatus = GameStatus::FivefoldRepetition;
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EndsByMoveRule;

impl Ending for EndsByMoveRule {
    const HALF_MOVES: u8 = 1;
    const STATUS: GameStatus = GameStatus::SeventyFiveMoveRule;
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BlackMates;

impl Ending for BlackMates {
    const HALF_MOVES: u8 = 2;
    const STATUS: GameStatus = GameStatus::Checkmate {
        winner: GameColor::Black,
    };
}

/// A fixed-length game where both moves stay legal until and after the end.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ScriptedMove<E: Ending>(pub u8, PhantomData<E>);

impl<E: Ending> ScriptedMove<E> {
    pub fn new(id: u8) -> Self {
        Self(id, PhantomData)
    }
}

impl<E: Ending> GameMove for ScriptedMove<E> {
    type Game = ScriptedGame<E>;
}

impl<E: Ending> fmt::Display for ScriptedMove<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ScriptedPosition<E: Ending> {
    pub half_moves: u8,
    _ending: PhantomData<E>,
}

impl<E: Ending> GamePosition for ScriptedPosition<E> {
    type Game = ScriptedGame<E>;

    fn get_turn(&self) -> GameColor {
        if self.half_moves % 2 == 0 {
            GameColor::White
        } else {
            GameColor::Black
        }
    }

    fn get_legal_moves(&self) -> Vec<ScriptedMove<E>> {
        vec![ScriptedMove::new(0), ScriptedMove::new(1)]
    }

    fn encode(&self) -> String {
        format!("{}:{}", self.half_moves, self.get_turn())
    }

    fn print(&self) {
        println!("half move {}", self.half_moves);
    }
}

pub struct ScriptedGame<E: Ending> {
    pos: ScriptedPosition<E>,
}

impl<E: Ending> IGame for ScriptedGame<E> {
    type Position = ScriptedPosition<E>;
    type Move = ScriptedMove<E>;

    fn new() -> Self {
        Self::new_from_pos(ScriptedPosition {
            half_moves: 0,
            _ending: PhantomData,
        })
    }

    fn new_from_pos(pos: ScriptedPosition<E>) -> Self {
        Self { pos }
    }

    fn get_position(&self) -> &ScriptedPosition<E> {
        &self.pos
    }

    fn status(&self) -> GameStatus {
        if self.pos.half_moves >= E::HALF_MOVES {
            E::STATUS
        } else {
            GameStatus::Ongoing
        }
    }

    fn play_single_turn(&mut self, _next_move: ScriptedMove<E>) -> Result<()> {
        if self.is_over() {
            return Err(Error::rules("scripted game is already over"));
        }
        self.pos.half_moves += 1;
        Ok(())
    }
}
