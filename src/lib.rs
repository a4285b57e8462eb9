pub mod chess;
pub mod error;
pub mod game;
pub mod q_learning;
pub mod utils;
