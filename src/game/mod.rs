pub mod common;
pub mod players_compare;
pub mod players_compare_cmd;
pub mod self_play;
pub mod self_play_cmd;

#[cfg(test)]
pub(crate) mod test_util;
