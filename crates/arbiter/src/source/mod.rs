//! Move sources: who is asked for the next move.

mod agent;
mod human;

pub use agent::{agent_name, build_prompt, AgentSource};
pub use human::{ConsoleInput, HumanSource, HELP_TEXT};

use chess_core::{Color, Game, Move, Position, UciMove};

use crate::error::ProposalError;
use crate::rate_limit::RateLimiter;

/// What a source sees when asked for a move.
#[derive(Debug, Clone)]
pub struct TurnContext<'a> {
    pub position: &'a Position,
    pub legal_moves: &'a [Move],
    /// Moves played so far in UCI form
    pub history: Vec<String>,
}

impl<'a> TurnContext<'a> {
    pub fn from_game(game: &'a Game) -> Self {
        Self {
            position: game.position(),
            legal_moves: game.legal_moves(),
            history: game.record().uci_moves(),
        }
    }

    pub fn side(&self) -> Color {
        self.position.side_to_move
    }
}

/// Non-move input a human can type at the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumanCommand {
    Help,
    Legal,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proposal {
    Move(UciMove),
    Command(HumanCommand),
}

pub enum MoveSource {
    Human(HumanSource),
    Agent(AgentSource),
}

impl MoveSource {
    pub async fn propose_move(&mut self, ctx: &TurnContext<'_>) -> Result<Proposal, ProposalError> {
        match self {
            MoveSource::Human(human) => human.propose_move(ctx).await,
            MoveSource::Agent(agent) => agent.propose_move(ctx).await,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MoveSource::Human(human) => human.name(),
            MoveSource::Agent(agent) => agent.name(),
        }
    }

    pub fn is_agent(&self) -> bool {
        matches!(self, MoveSource::Agent(_))
    }

    /// Budget this source draws on, if its requests are rate limited.
    pub fn rate_limiter(&self) -> Option<&RateLimiter> {
        match self {
            MoveSource::Human(_) => None,
            MoveSource::Agent(agent) => Some(agent.rate_limiter()),
        }
    }
}

impl std::fmt::Debug for MoveSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveSource::Human(human) => f.debug_tuple("Human").field(&human.name()).finish(),
            MoveSource::Agent(agent) => f.debug_tuple("Agent").field(&agent.name()).finish(),
        }
    }
}
