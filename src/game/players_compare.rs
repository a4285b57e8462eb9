use crate::error::Result;
use crate::game::common::{GameColor, GamePlayer, GamePosition, IGame};
use crate::game::self_play::GamesResults;

/// Plays games between two fixed players without any learning.
pub struct PlayerComparator<'a, Game: IGame> {
    white: &'a mut dyn GamePlayer<Game>,
    black: &'a mut dyn GamePlayer<Game>,
    verbose: bool,
}

impl<'a, Game: IGame> PlayerComparator<'a, Game> {
    pub fn new(
        white: &'a mut dyn GamePlayer<Game>,
        black: &'a mut dyn GamePlayer<Game>,
        verbose: bool,
    ) -> Self {
        Self {
            white,
            black,
            verbose,
        }
    }

    pub fn compare_players(&mut self, games_num: u32) -> Result<GamesResults> {
        let mut results = GamesResults::default();
        for game_idx in 1..=games_num {
            let winner = self.play_game()?;
            results.record(winner);
            match winner {
                Some(GameColor::White) => log::info!("Game {}: White wins!", game_idx),
                Some(GameColor::Black) => log::info!("Game {}: Black wins!", game_idx),
                None => log::info!("Game {}: Draw!", game_idx),
            }
        }
        Ok(results)
    }

    fn play_game(&mut self) -> Result<Option<GameColor>> {
        let mut game = Game::new();
        while !game.is_over() {
            let player = match game.get_position().get_turn() {
                GameColor::White => &mut *self.white,
                GameColor::Black => &mut *self.black,
            };
            let next_move = player.next_move(game.get_position())?;
            game.play_single_turn(next_move)?;

            if self.verbose {
                game.get_position().print();
                println!();
            }
        }
        if self.verbose {
            log::info!("Final status: {:?}", game.status());
        }
        Ok(game.get_winner())
    }
}
