use std::fmt::Write as _;
use std::sync::Arc;

use chess_core::{extract_uci_move, Color};
use tracing::debug;

use super::{Proposal, TurnContext};
use crate::error::ProposalError;
use crate::rate_limit::RateLimiter;
use crate::service::{MoveRequest, MoveService};

/// An automated player backed by a [`MoveService`].
pub struct AgentSource {
    name: String,
    service: Arc<dyn MoveService>,
    limiter: RateLimiter,
    prompt_legal_move_limit: usize,
}

impl AgentSource {
    pub fn new(
        name: impl Into<String>,
        service: Arc<dyn MoveService>,
        limiter: RateLimiter,
        prompt_legal_move_limit: usize,
    ) -> Self {
        Self {
            name: name.into(),
            service,
            limiter,
            prompt_legal_move_limit,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn request(&self, ctx: &TurnContext<'_>) -> MoveRequest {
        let legal_moves: Vec<String> = ctx.legal_moves.iter().map(|m| m.to_string()).collect();
        let prompt = build_prompt(ctx, &legal_moves, self.prompt_legal_move_limit);
        MoveRequest {
            fen: ctx.position.to_fen(),
            side: ctx.side(),
            legal_moves,
            history: ctx.history.clone(),
            prompt,
        }
    }

    /// Ask the service once and pull the first move token out of its reply.
    ///
    /// The token is only checked for syntax here; legality is decided by the
    /// orchestrator against the game.
    pub async fn propose_move(&mut self, ctx: &TurnContext<'_>) -> Result<Proposal, ProposalError> {
        let request = self.request(ctx);
        let reply = self.service.request_move(&request).await?;
        debug!(agent = %self.name, service = self.service.name(), reply = %reply.trim(), "agent replied");
        // Replies are not lowercased; only exact lowercase tokens count.
        Ok(Proposal::Move(extract_uci_move(&reply)?))
    }
}

/// Plain-text prompt describing the position for a language-model style service.
pub fn build_prompt(ctx: &TurnContext<'_>, legal_moves: &[String], limit: usize) -> String {
    let side = ctx.side();
    let opponent = side.other();
    let shown = legal_moves.len().min(limit);

    let mut prompt = String::new();
    let _ = writeln!(prompt, "You are playing chess as {side}; your opponent plays {opponent}.");
    let _ = writeln!(
        prompt,
        "Answer with exactly one move in UCI notation (for example e2e4, g1f3, e1g1 or a7a8q) and nothing else."
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Position (FEN): {}", ctx.position.to_fen());
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "{}", ctx.position);
    let _ = writeln!(prompt);
    if !ctx.history.is_empty() {
        let _ = writeln!(prompt, "Moves so far: {}", ctx.history.join(" "));
    }
    let _ = write!(prompt, "{side} to move. Legal moves: {}", legal_moves[..shown].join(", "));
    if legal_moves.len() > shown {
        let _ = write!(prompt, " (and {} more)", legal_moves.len() - shown);
    }
    let _ = writeln!(prompt);
    let _ = write!(prompt, "Your move:");
    prompt
}

/// Default display name for an agent playing `color`.
pub fn agent_name(color: Color) -> String {
    format!("AI_{color}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::WindowLimit;
    use async_trait::async_trait;
    use chess_core::{Game, ParseError};

    struct Canned(&'static str);

    #[async_trait]
    impl MoveService for Canned {
        async fn request_move(&self, _request: &MoveRequest) -> Result<String, ServiceError> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    fn agent(reply: &'static str) -> AgentSource {
        let limiter = RateLimiter::new(WindowLimit::new(6, 60), WindowLimit::new(800, 86_400));
        AgentSource::new(agent_name(Color::White), Arc::new(Canned(reply)), limiter, 15)
    }

    #[tokio::test]
    async fn test_extracts_move_from_commentary() {
        let game = Game::startpos();
        let ctx = TurnContext::from_game(&game);
        let mut source = agent("Solid choice: e2e4!");
        match source.propose_move(&ctx).await.unwrap() {
            Proposal::Move(mv) => assert_eq!(mv.to_string(), "e2e4"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(source.name(), "AI_White");
    }

    #[tokio::test]
    async fn test_reply_without_token_is_parse_error() {
        let game = Game::startpos();
        let ctx = TurnContext::from_game(&game);
        let mut source = agent("I resign.");
        assert!(matches!(
            source.propose_move(&ctx).await,
            Err(ProposalError::Parse(ParseError::NoMoveToken(_)))
        ));
    }

    #[tokio::test]
    async fn test_uppercase_reply_is_parse_error() {
        let game = Game::startpos();
        let ctx = TurnContext::from_game(&game);
        let mut source = agent("E2E4");
        assert!(matches!(
            source.propose_move(&ctx).await,
            Err(ProposalError::Parse(ParseError::NoMoveToken(_)))
        ));
    }

    #[test]
    fn test_request_lists_position_and_truncated_moves() {
        let mut game = Game::startpos();
        game.apply_uci("e2e4").unwrap();
        let ctx = TurnContext::from_game(&game);
        let request = agent("").request(&ctx);

        assert_eq!(request.side, Color::Black);
        assert_eq!(request.fen, game.position().to_fen());
        assert_eq!(request.legal_moves.len(), 20);
        assert_eq!(request.history, vec!["e2e4"]);
        assert!(request.prompt.contains("as Black"));
        assert!(request.prompt.contains(&request.fen));
        assert!(request.prompt.contains("Moves so far: e2e4"));
        assert!(request.prompt.contains("(and 5 more)"));
        let listed = request.prompt.lines().find(|l| l.contains("Legal moves:")).unwrap();
        assert_eq!(listed.matches(", ").count(), 14);
    }
}
