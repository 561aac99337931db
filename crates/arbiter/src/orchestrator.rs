//! Turn-by-turn negotiation between the game and its two move sources.
//!
//! Every turn runs a small state machine:
//!
//! ```text
//! RequestMove -> Validate -> Apply
//!      ^            |
//!      +-- Retry <--+--> Abort
//! ```
//!
//! Agent failures (unparseable reply, illegal move, service error, timeout)
//! are retried with exponential backoff until more than
//! `max_consecutive_errors` happen in a row. Human mistakes are reported and
//! asked again without counting.

use chess_core::{resolve_move, Color, Game, GameError, Move, Position, TerminationStatus, UciMove};
use tracing::{debug, info, warn};

use crate::backoff::Backoff;
use crate::config::ArbiterConfig;
use crate::error::{ProposalError, RateLimitExceeded};
use crate::observer::{GameObserver, NullObserver};
use crate::signal::StopSignal;
use crate::source::{HumanCommand, MoveSource, Proposal, TurnContext};

pub const REASON_INTERRUPT: &str = "user interrupt";
pub const REASON_QUIT: &str = "player quit";
pub const REASON_INPUT_ENDED: &str = "input ended";
pub const REASON_NEGOTIATION_FAILED: &str = "move negotiation failed";

/// How a call to [`Orchestrator::play_turn`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A move was applied; the game may have ended with it.
    Applied(Move),
    /// The game was aborted with this reason.
    Aborted(String),
    /// The game was already over.
    GameOver,
}

#[derive(Debug)]
enum TurnState {
    RequestMove,
    Validate(UciMove),
    Apply(Move),
    Retry(ProposalError),
    Abort(String),
}

/// Why a request did not yield a proposal.
#[derive(Debug)]
enum RequestError {
    Stopped,
    RateLimited(RateLimitExceeded),
    Proposal(ProposalError),
}

pub struct Orchestrator {
    config: ArbiterConfig,
    white: MoveSource,
    black: MoveSource,
    observer: Box<dyn GameObserver>,
    stop: StopSignal,
    backoff: Backoff,
    consecutive_errors: u32,
}

impl Orchestrator {
    pub fn new(config: ArbiterConfig, white: MoveSource, black: MoveSource) -> Self {
        let backoff = Backoff::new(config.backoff_base(), config.backoff_cap());
        Self {
            config,
            white,
            black,
            observer: Box::new(NullObserver),
            stop: StopSignal::new(),
            backoff,
            consecutive_errors: 0,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn GameObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn config(&self) -> &ArbiterConfig {
        &self.config
    }

    /// Consecutive agent failures in the current game.
    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    pub fn player_name(&self, side: Color) -> &str {
        self.source(side).name()
    }

    /// A game from `start` carrying the configured move limit.
    pub fn new_game(&self, start: Position) -> Game {
        Game::new(start).with_move_limit(self.config.max_moves)
    }

    /// Play turns until the game reaches a terminal status.
    pub async fn play(&mut self, game: &mut Game) -> TerminationStatus {
        self.consecutive_errors = 0;
        let (white, black) = (self.white.name().to_string(), self.black.name().to_string());
        info!(%white, %black, fen = %game.position().to_fen(), "game started");
        self.observer.game_started(game, &white, &black);

        while !game.is_over() {
            let side = game.side_to_move();
            let outcome = self.play_turn(game).await;
            if matches!(outcome, TurnOutcome::Applied(_)) && self.source(side).is_agent() && !game.is_over() {
                self.pause_after_agent_move().await;
            }
        }

        let status = game.status().clone();
        info!(
            %status,
            result = status.result(),
            plies = game.ply_count(),
            "game finished"
        );
        self.observer.game_finished(game, &status);
        status
    }

    /// Negotiate one move for the side to move.
    pub async fn play_turn(&mut self, game: &mut Game) -> TurnOutcome {
        if game.is_over() {
            return TurnOutcome::GameOver;
        }
        let side = game.side_to_move();
        let mut state = TurnState::RequestMove;

        loop {
            state = match state {
                TurnState::RequestMove => self.request_move(game, side).await,
                TurnState::Validate(token) => match resolve_move(game.position(), token) {
                    Ok(mv) => TurnState::Apply(mv),
                    Err(e) => TurnState::Retry(e.into()),
                },
                TurnState::Apply(mv) => match game.apply(mv) {
                    Ok(_) => {
                        info!(
                            side = %side,
                            mv = %mv,
                            status = %game.status(),
                            ply = game.ply_count(),
                            "move applied"
                        );
                        self.consecutive_errors = 0;
                        self.observer.move_applied(game, mv);
                        return TurnOutcome::Applied(mv);
                    }
                    Err(GameError::Over(_)) => return TurnOutcome::GameOver,
                    Err(GameError::Illegal(e)) => TurnState::Retry(e.into()),
                    Err(GameError::Parse(e)) => TurnState::Retry(e.into()),
                },
                TurnState::Retry(error) => self.retry(side, error).await,
                TurnState::Abort(reason) => {
                    warn!(side = %side, %reason, ply = game.ply_count(), "game aborted");
                    // Only fails if the game is already over, which was checked above.
                    let _ = game.abort(reason.clone());
                    return TurnOutcome::Aborted(reason);
                }
            };
        }
    }

    fn source(&self, side: Color) -> &MoveSource {
        match side {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    async fn request_move(&mut self, game: &Game, side: Color) -> TurnState {
        if self.stop.is_stopped() {
            return TurnState::Abort(REASON_INTERRUPT.to_string());
        }
        let source = match side {
            Color::White => &self.white,
            Color::Black => &self.black,
        };
        self.observer
            .turn_started(game, side, source.name(), source.is_agent());

        match self.request(game, side).await {
            Ok(Proposal::Move(token)) => TurnState::Validate(token),
            Ok(Proposal::Command(HumanCommand::Help)) => {
                self.observer.help_requested();
                TurnState::RequestMove
            }
            Ok(Proposal::Command(HumanCommand::Legal)) => {
                self.observer.legal_moves_requested(game.legal_moves());
                TurnState::RequestMove
            }
            Ok(Proposal::Command(HumanCommand::Quit)) => TurnState::Abort(REASON_QUIT.to_string()),
            Err(RequestError::Stopped) => TurnState::Abort(REASON_INTERRUPT.to_string()),
            Err(RequestError::RateLimited(e)) => TurnState::Abort(e.to_string()),
            Err(RequestError::Proposal(e)) => TurnState::Retry(e),
        }
    }

    /// Ask the source once, racing the request against the stop signal.
    /// Agent requests first wait for rate-limit capacity and are bounded by
    /// the request timeout.
    async fn request(&mut self, game: &Game, side: Color) -> Result<Proposal, RequestError> {
        let ctx = TurnContext::from_game(game);
        let timeout = self.config.request_timeout();
        let stop = self.stop.clone();
        let source = match side {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        };
        let limiter = source.rate_limiter().cloned();

        let work = async {
            let Some(limiter) = limiter else {
                return source.propose_move(&ctx).await.map_err(RequestError::Proposal);
            };
            limiter.acquire().await.map_err(RequestError::RateLimited)?;
            let usage = limiter.usage().await;
            debug!(
                player = source.name(),
                short_used = usage.short_used,
                short_max = usage.short_max,
                long_used = usage.long_used,
                long_max = usage.long_max,
                "requesting move"
            );
            match tokio::time::timeout(timeout, source.propose_move(&ctx)).await {
                Ok(result) => result.map_err(RequestError::Proposal),
                Err(_) => Err(RequestError::Proposal(ProposalError::Timeout(timeout))),
            }
        };

        tokio::select! {
            biased;
            _ = stop.stopped() => Err(RequestError::Stopped),
            result = work => result,
        }
    }

    async fn retry(&mut self, side: Color, error: ProposalError) -> TurnState {
        let is_agent = self.source(side).is_agent();
        let player = self.source(side).name().to_string();

        if !is_agent {
            return match error {
                ProposalError::InputClosed => TurnState::Abort(REASON_INPUT_ENDED.to_string()),
                ProposalError::Input(e) => TurnState::Abort(format!("{REASON_INPUT_ENDED}: {e}")),
                error => {
                    debug!(%player, %error, "human move rejected");
                    self.observer.proposal_rejected(&player, &error, 0);
                    TurnState::RequestMove
                }
            };
        }

        self.consecutive_errors += 1;
        let attempt = self.consecutive_errors;
        warn!(%player, %error, attempt, max = self.config.max_consecutive_errors, "agent proposal rejected");
        self.observer.proposal_rejected(&player, &error, attempt);

        if attempt > self.config.max_consecutive_errors || !error.is_retryable() {
            return TurnState::Abort(REASON_NEGOTIATION_FAILED.to_string());
        }

        let delay = self.backoff.delay(attempt);
        debug!(%player, delay_ms = delay.as_millis() as u64, "backing off before retry");
        tokio::select! {
            biased;
            _ = self.stop.stopped() => TurnState::Abort(REASON_INTERRUPT.to_string()),
            _ = tokio::time::sleep(delay) => TurnState::RequestMove,
        }
    }

    async fn pause_after_agent_move(&self) {
        let delay = self.config.agent_move_delay();
        if delay.is_zero() {
            return;
        }
        tokio::select! {
            biased;
            _ = self.stop.stopped() => {}
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod orchestrator_tests;
