//! Move-negotiation arbiter for ML-chess
//!
//! This crate plays a single game of chess between two move sources:
//! - Humans typing UCI moves on a line-oriented reader
//! - Agents backed by a [`MoveService`] whose free-text replies are parsed defensively
//!
//! The [`Orchestrator`] asks the side to move for a proposal, validates it
//! against the game, and retries agent failures with exponential backoff
//! under a sliding-window rate limit.
//!
//! # Usage
//!
//! ```bash
//! # Two random agents
//! cargo run -p arbiter -- ai-vs-ai --max-moves 80
//!
//! # Play black against an agent
//! cargo run -p arbiter -- human-vs-ai --color black --config arbiter.toml
//! ```

mod backoff;
mod config;
mod error;
mod observer;
mod orchestrator;
mod rate_limit;
mod results;
mod service;
mod signal;
pub mod source;

pub use backoff::*;
pub use config::*;
pub use error::*;
pub use observer::*;
pub use orchestrator::*;
pub use rate_limit::*;
pub use results::*;
pub use service::*;
pub use signal::*;
pub use source::{
    agent_name, build_prompt, AgentSource, ConsoleInput, HumanCommand, HumanSource, MoveSource,
    Proposal, TurnContext, HELP_TEXT,
};
