//! The seam to whatever proposes moves for an agent.

use std::sync::Mutex;

use async_trait::async_trait;
use chess_core::Color;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, SeedableRng};

use crate::error::ServiceError;

/// Everything a service gets to see when asked for a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    /// Six-field FEN of the current position
    pub fen: String,
    pub side: Color,
    /// Every legal move in UCI form
    pub legal_moves: Vec<String>,
    /// Moves played so far in UCI form
    pub history: Vec<String>,
    /// Provider-neutral natural-language prompt
    pub prompt: String,
}

/// Something that answers a [`MoveRequest`] with free text containing a move.
///
/// The reply is not trusted: the caller extracts the first move token from
/// it and validates that against the position.
#[async_trait]
pub trait MoveService: Send + Sync {
    async fn request_move(&self, request: &MoveRequest) -> Result<String, ServiceError>;

    fn name(&self) -> &str;
}

/// Answers with a uniformly random legal move wrapped in a short sentence.
#[derive(Debug, Default)]
pub struct RandomMoveService {
    rng: Option<Mutex<StdRng>>,
}

impl RandomMoveService {
    pub fn new() -> Self {
        Self { rng: None }
    }

    /// Reproducible choices for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    fn pick<'a>(&self, moves: &'a [String]) -> Option<&'a String> {
        match &self.rng {
            Some(rng) => {
                let mut rng = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                moves.choose(&mut *rng)
            }
            None => moves.choose(&mut thread_rng()),
        }
    }
}

#[async_trait]
impl MoveService for RandomMoveService {
    async fn request_move(&self, request: &MoveRequest) -> Result<String, ServiceError> {
        match self.pick(&request.legal_moves) {
            Some(mv) => Ok(format!("As {}, I'll play {mv}.", request.side)),
            None => Err(ServiceError::Declined("no legal moves".to_string())),
        }
    }

    fn name(&self) -> &str {
        "Random v1.0"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::extract_uci_move;

    fn request(legal: &[&str]) -> MoveRequest {
        MoveRequest {
            fen: chess_core::START_FEN.to_string(),
            side: Color::White,
            legal_moves: legal.iter().map(|s| s.to_string()).collect(),
            history: Vec::new(),
            prompt: String::new(),
        }
    }

    #[tokio::test]
    async fn test_reply_contains_a_legal_move() {
        let service = RandomMoveService::new();
        let legal = ["e2e4", "d2d4", "g1f3"];
        for _ in 0..20 {
            let reply = service.request_move(&request(&legal)).await.unwrap();
            let mv = extract_uci_move(&reply).unwrap().to_string();
            assert!(legal.contains(&mv.as_str()), "{reply}");
        }
    }

    #[tokio::test]
    async fn test_seeded_service_is_reproducible() {
        let legal: Vec<String> = (0..8).map(|i| format!("a{}a{}", i % 8 + 1, (i + 1) % 8 + 1)).collect();
        let legal: Vec<&str> = legal.iter().map(String::as_str).collect();
        let a = RandomMoveService::seeded(9);
        let b = RandomMoveService::seeded(9);
        for _ in 0..10 {
            assert_eq!(
                a.request_move(&request(&legal)).await.unwrap(),
                b.request_move(&request(&legal)).await.unwrap()
            );
        }
    }

    #[tokio::test]
    async fn test_declines_without_moves() {
        let service = RandomMoveService::new();
        let err = service.request_move(&request(&[])).await.unwrap_err();
        assert!(matches!(err, ServiceError::Declined(_)));
    }
}
