//! Error types for move negotiation, configuration and summaries.

use std::path::PathBuf;
use std::time::Duration;

use chess_core::{IllegalMoveError, ParseError};
use thiserror::Error;

/// Why a move source failed to produce a usable move this attempt.
///
/// These never outlive a turn: the orchestrator either retries or turns
/// them into an abort reason.
#[derive(Debug, Error)]
pub enum ProposalError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Illegal(#[from] IllegalMoveError),
    #[error("move service failed: {0}")]
    Rejected(#[from] ServiceError),
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    #[error("input closed")]
    InputClosed,
    #[error("failed to read input: {0}")]
    Input(String),
}

impl ProposalError {
    /// Errors worth asking the same source again for.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ProposalError::InputClosed | ProposalError::Input(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rate limit exceeded: {used} of {max_requests} requests in the last {window:?}")]
pub struct RateLimitExceeded {
    pub used: usize,
    pub max_requests: u32,
    pub window: Duration,
}

/// Failure reported by a [`crate::MoveService`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("service declined to move: {0}")]
    Declined(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode summary: {0}")]
    Json(#[from] serde_json::Error),
}
