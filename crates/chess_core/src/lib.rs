//! Chess rules: positions, legal move generation, FEN, UCI move tokens and
//! game termination.

pub mod attacks;
pub mod board;
pub mod error;
pub mod fen;
pub mod game;
pub mod movegen;
pub mod perft;
pub mod types;
pub mod uci;

pub use attacks::attacks;
pub use board::*;
pub use error::*;
pub use fen::START_FEN;
pub use game::*;
pub use movegen::*;
pub use perft::{perft, perft_divide};
pub use types::*;
pub use uci::*;
