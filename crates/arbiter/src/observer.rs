//! Hooks for rendering a game as it is played.

use chess_core::{Color, Game, Move, TerminationStatus};

use crate::error::ProposalError;

/// Receives every event of a game. All methods default to doing nothing.
pub trait GameObserver: Send {
    fn game_started(&mut self, _game: &Game, _white: &str, _black: &str) {}

    /// A source is about to be asked for a move. `is_agent` tells a
    /// [`MoveService`](crate::MoveService)-backed player from a human.
    fn turn_started(&mut self, _game: &Game, _side: Color, _player: &str, _is_agent: bool) {}

    fn help_requested(&mut self) {}

    fn legal_moves_requested(&mut self, _legal: &[Move]) {}

    /// A proposal was refused. `attempt` is the consecutive failure count for
    /// agents and zero for humans, whose mistakes do not count.
    fn proposal_rejected(&mut self, _player: &str, _error: &ProposalError, _attempt: u32) {}

    fn move_applied(&mut self, _game: &Game, _last_move: Move) {}

    fn game_finished(&mut self, _game: &Game, _status: &TerminationStatus) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl GameObserver for NullObserver {}
