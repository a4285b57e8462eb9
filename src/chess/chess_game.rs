use crate::error::{Error, Result};
use crate::game::common::{GameColor, GameMove, GamePosition, GameStatus, IGame};
use ::chess::{BitBoard, Board, BoardStatus, File, MoveGen, Piece, Rank, Square};
use itertools::Itertools;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub const BOARD_SIZE: usize = 8;
/// Halfmove clock value at which the seventy-five-move rule ends the game.
pub const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;
pub const REPETITION_LIMIT: u32 = 5;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ChessMove {
    m: ::chess::ChessMove,
}

impl ChessMove {
    pub fn new(m: ::chess::ChessMove) -> Self {
        Self { m }
    }

    pub fn from_san(pos: &ChessPosition, s: &str) -> Result<Self> {
        ::chess::ChessMove::from_san(&pos.board, s)
            .map(Self::new)
            .map_err(|e| Error::rules(format!("invalid move '{}': {}", s, e)))
    }

    pub fn get_raw(&self) -> ::chess::ChessMove {
        self.m
    }
}

impl GameMove for ChessMove {
    type Game = ChessGame;
}

/// UCI notation, e.g. `e2e4` or `e7e8q`.
impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.m)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ChessPosition {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Default for ChessPosition {
    fn default() -> Self {
        Self::new()
    }
}

impl ChessPosition {
    pub fn new() -> Self {
        Self {
            board: Board::default(),
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        let board = Board::from_str(fen)
            .map_err(|e| Error::rules(format!("invalid FEN '{}': {}", fen, e)))?;
        let fields = fen.split_whitespace().collect_vec();
        let parse_counter = |idx: usize, default: u32| -> Result<u32> {
            match fields.get(idx) {
                None => Ok(default),
                Some(field) => field
                    .parse::<u32>()
                    .map_err(|e| Error::rules(format!("invalid FEN counter '{}': {}", field, e))),
            }
        };
        Ok(Self {
            board,
            halfmove_clock: parse_counter(4, 0)?,
            fullmove_number: parse_counter(5, 1)?,
        })
    }

    pub fn is_valid_move(&self, m: ChessMove) -> bool {
        self.board.legal(m.m)
    }

    pub fn get_moved_position(&self, m: ChessMove) -> Self {
        let is_pawn_move = self.board.piece_on(m.m.get_source()) == Some(Piece::Pawn);
        let is_capture = self.board.piece_on(m.m.get_dest()).is_some();
        let halfmove_clock = if is_pawn_move || is_capture {
            0
        } else {
            self.halfmove_clock + 1
        };
        let fullmove_number = match self.board.side_to_move() {
            ::chess::Color::White => self.fullmove_number,
            ::chess::Color::Black => self.fullmove_number + 1,
        };
        Self {
            board: self.board.make_move_new(m.m),
            halfmove_clock,
            fullmove_number,
        }
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn get_board(&self) -> &Board {
        &self.board
    }

    /// Status derivable from the position alone, repetitions excluded.
    pub fn status(&self) -> GameStatus {
        match self.board.status() {
            BoardStatus::Checkmate => GameStatus::Checkmate {
                winner: self.get_turn().opposite(),
            },
            BoardStatus::Stalemate => GameStatus::Stalemate,
            BoardStatus::Ongoing => {
                if has_insufficient_material(&self.board) {
                    GameStatus::InsufficientMaterial
                } else if self.halfmove_clock >= SEVENTY_FIVE_MOVE_PLIES {
                    GameStatus::SeventyFiveMoveRule
                } else {
                    GameStatus::Ongoing
                }
            }
        }
    }
}

/// Neither side can mate: no pawns, rooks or queens, and at most one minor
/// piece or only bishops all on one square color.
fn has_insufficient_material(board: &Board) -> bool {
    let majors_and_pawns =
        *board.pieces(Piece::Pawn) | *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
    if majors_and_pawns.popcnt() > 0 {
        return false;
    }
    let knights = board.pieces(Piece::Knight).popcnt();
    let bishops: BitBoard = *board.pieces(Piece::Bishop);
    if knights + bishops.popcnt() <= 1 {
        return true;
    }
    knights == 0 && bishops.map(square_color).all_equal()
}

fn square_color(sq: Square) -> usize {
    (sq.get_rank().to_index() + sq.get_file().to_index()) % 2
}

fn chess_color_to_game_color(c: ::chess::Color) -> GameColor {
    match c {
        ::chess::Color::White => GameColor::White,
        ::chess::Color::Black => GameColor::Black,
    }
}

impl GamePosition for ChessPosition {
    type Game = ChessGame;

    fn get_turn(&self) -> GameColor {
        chess_color_to_game_color(self.board.side_to_move())
    }

    fn get_legal_moves(&self) -> Vec<ChessMove> {
        MoveGen::new_legal(&self.board).map(ChessMove::new).collect_vec()
    }

    /// Full FEN, including the move counters the board itself does not track.
    fn encode(&self) -> String {
        let board_fen = self.board.to_string();
        format!(
            "{} {} {}",
            board_fen.split_whitespace().take(4).join(" "),
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    fn print(&self) {
        for rank_idx in (0..BOARD_SIZE).rev() {
            let row_characters = (0..BOARD_SIZE)
                .map(|file_idx| {
                    let sq = Square::make_square(Rank::from_index(rank_idx), File::from_index(file_idx));
                    match (self.board.piece_on(sq), self.board.color_on(sq)) {
                        (Some(piece), Some(color)) => piece.to_string(color),
                        _ => String::from("."),
                    }
                })
                .collect_vec();
            println!("{}", row_characters.join(" "));
        }
    }
}

pub struct ChessGame {
    pos: ChessPosition,
    /// Occurrences of every position reached, keyed by board hash
    repetitions: HashMap<u64, u32>,
}

impl IGame for ChessGame {
    type Position = ChessPosition;
    type Move = ChessMove;

    fn new() -> Self {
        Self::new_from_pos(ChessPosition::new())
    }

    fn new_from_pos(pos: ChessPosition) -> Self {
        let repetitions = HashMap::from([(pos.board.get_hash(), 1)]);
        Self { pos, repetitions }
    }

    fn get_position(&self) -> &ChessPosition {
        &self.pos
    }

    fn status(&self) -> GameStatus {
        let status = self.pos.status();
        if status.is_over() {
            return status;
        }
        let seen = self
            .repetitions
            .get(&self.pos.board.get_hash())
            .copied()
            .unwrap_or(0);
        if seen >= REPETITION_LIMIT {
            GameStatus::FivefoldRepetition
        } else {
            GameStatus::Ongoing
        }
    }

    fn play_single_turn(&mut self, next_move: ChessMove) -> Result<()> {
        if self.is_over() {
            return Err(Error::rules(format!(
                "move {} played after the game is over ({})",
                next_move,
                self.pos.encode()
            )));
        }
        if !self.pos.is_valid_move(next_move) {
            return Err(Error::rules(format!(
                "illegal move {} in position {}",
                next_move,
                self.pos.encode()
            )));
        }
        self.pos = self.pos.get_moved_position(next_move);
        *self.repetitions.entry(self.pos.board.get_hash()).or_insert(0) += 1;
        Ok(())
    }
}
