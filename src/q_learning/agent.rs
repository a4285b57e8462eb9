//! Epsilon-greedy Q-learning agent

use std::fmt::Display;
use std::io::{Read, Write};
use std::path::Path;

use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Error, Result};
use crate::game::common::{GamePlayer, GamePosition, IGame};
use crate::q_learning::value_table::ValueTable;

/// Hyperparameters of a Q-learning agent. Fixed for the agent's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QParams {
    /// Learning rate α, in (0, 1]
    pub alpha: f64,
    /// Exploration rate ε, in [0, 1]
    pub epsilon: f64,
    /// Discount factor γ, in [0, 1)
    pub discount: f64,
}

impl Default for QParams {
    fn default() -> Self {
        Self {
            alpha: 0.4,
            epsilon: 1.0,
            discount: 0.9,
        }
    }
}

impl QParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(Error::config(format!(
                "alpha must be in (0, 1], got {}",
                self.alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(Error::config(format!(
                "epsilon must be in [0, 1], got {}",
                self.epsilon
            )));
        }
        if !(0.0..1.0).contains(&self.discount) {
            return Err(Error::config(format!(
                "discount must be in [0, 1), got {}",
                self.discount
            )));
        }
        Ok(())
    }
}

/// Q-learning agent (off-policy one-step TD control)
///
/// Owns its value table and its random source. Actions are keyed by their
/// `Display` form, states by their encoding.
#[derive(Debug, Clone)]
pub struct QAgent<R: Rng = StdRng> {
    table: ValueTable,
    params: QParams,
    rng: R,
}

impl<R: Rng> QAgent<R> {
    /// Create an agent with an empty table.
    pub fn new(params: QParams, rng: R) -> Result<Self> {
        Self::with_table(params, ValueTable::new(), rng)
    }

    /// Create an agent around an already loaded table.
    pub fn with_table(params: QParams, table: ValueTable, rng: R) -> Result<Self> {
        params.validate()?;
        Ok(Self { table, params, rng })
    }

    pub fn load<Src: Read>(params: QParams, source: Src, rng: R) -> Result<Self> {
        Self::with_table(params, ValueTable::read_from(source)?, rng)
    }

    pub fn load_from_file<P: AsRef<Path>>(params: QParams, path: P, rng: R) -> Result<Self> {
        Self::with_table(params, ValueTable::load_from_file(path)?, rng)
    }

    pub fn save<W: Write>(&self, sink: W) -> Result<()> {
        self.table.write_to(sink)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.table.save_to_file(path)
    }

    pub fn params(&self) -> &QParams {
        &self.params
    }

    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut ValueTable {
        &mut self.table
    }

    /// ε-greedy action selection
    ///
    /// Explores uniformly with probability ε. Otherwise picks uniformly among
    /// all actions sharing the maximal value.
    pub fn choose_action<M: Clone + Display>(
        &mut self,
        state: &str,
        legal_actions: &[M],
    ) -> Result<M> {
        if legal_actions.is_empty() {
            return Err(Error::InvalidInput {
                message: format!("no legal actions in state '{}'", state),
            });
        }

        if self.rng.gen::<f64>() < self.params.epsilon {
            return Ok(legal_actions[self.rng.gen_range(0..legal_actions.len())].clone());
        }

        let q_values = legal_actions
            .iter()
            .map(|action| self.table.get(state, &action.to_string()))
            .collect_vec();
        let max_q = q_values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let best_actions = legal_actions
            .iter()
            .zip(&q_values)
            .filter(|&(_, &q)| q == max_q)
            .map(|(action, _)| action)
            .collect_vec();

        best_actions
            .choose(&mut self.rng)
            .map(|&action| action.clone())
            .ok_or_else(|| Error::InvalidInput {
                message: format!("no comparable action values in state '{}'", state),
            })
    }

    /// Q-learning update for the transition just taken:
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// With no legal actions in `next_state` the future value is zero.
    pub fn update<M: Display>(
        &mut self,
        state: &str,
        action: &M,
        reward: f64,
        next_state: &str,
        next_legal_actions: &[M],
    ) {
        let action = action.to_string();
        let q = self.table.get(state, &action);
        let max_next_q = if next_legal_actions.is_empty() {
            0.0
        } else {
            next_legal_actions
                .iter()
                .map(|a| self.table.get(next_state, &a.to_string()))
                .fold(f64::NEG_INFINITY, f64::max)
        };
        let new_q = q + self.params.alpha * (reward + self.params.discount * max_next_q - q);
        self.table.set(state, &action, new_q);
    }
}

impl<Game: IGame, R: Rng> GamePlayer<Game> for QAgent<R> {
    fn next_move(&mut self, position: &Game::Position) -> Result<Game::Move> {
        self.choose_action(&position.encode(), &position.get_legal_moves())
    }
}
