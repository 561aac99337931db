//! Arbiter CLI
//!
//! Play one game between humans and/or random-move agents.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use arbiter::{
    agent_name, limiters_for, AgentSource, ArbiterConfig, ConsoleInput, GameObserver, GameSummary,
    HumanSource, MoveSource, Orchestrator, ProposalError, RandomMoveService, RateLimiter, StopSignal,
    HELP_TEXT,
};
use chess_core::{Color, Game, Move, Position, TerminationStatus};
use tracing_subscriber::EnvFilter;

fn print_usage() {
    println!("ML-chess Arbiter");
    println!();
    println!("Usage:");
    println!("  arbiter [ai-vs-ai|human-vs-ai|human-vs-human] [options]");
    println!();
    println!("Options:");
    println!("  --color white|black   Your colour in human-vs-ai (default white)");
    println!("  --config PATH         TOML configuration file");
    println!("  --fen FEN             Start from this position");
    println!("  --max-moves N         Plies before the game is called");
    println!();
    println!("Examples:");
    println!("  arbiter ai-vs-ai --max-moves 80");
    println!("  arbiter human-vs-ai --color black");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    AiVsAi,
    HumanVsAi,
    HumanVsHuman,
}

#[derive(Debug)]
struct Args {
    mode: Mode,
    human_color: Color,
    config: Option<PathBuf>,
    fen: Option<String>,
    max_moves: Option<u32>,
}

/// Returns `None` when only help was asked for.
fn parse_args(args: &[String]) -> Result<Option<Args>> {
    let mut parsed = Args {
        mode: Mode::AiVsAi,
        human_color: Color::White,
        config: None,
        fen: None,
        max_moves: None,
    };

    let mut i = 0;
    while i < args.len() {
        let value = |i: usize| {
            args.get(i + 1)
                .with_context(|| format!("{} needs a value", args[i]))
        };
        match args[i].as_str() {
            "ai-vs-ai" => parsed.mode = Mode::AiVsAi,
            "human-vs-ai" => parsed.mode = Mode::HumanVsAi,
            "human-vs-human" => parsed.mode = Mode::HumanVsHuman,
            "help" | "--help" | "-h" => return Ok(None),
            "--color" | "-c" => {
                parsed.human_color = match value(i)?.to_lowercase().as_str() {
                    "white" | "w" => Color::White,
                    "black" | "b" => Color::Black,
                    other => bail!("unknown colour {other:?}"),
                };
                i += 1;
            }
            "--config" => {
                parsed.config = Some(PathBuf::from(value(i)?));
                i += 1;
            }
            "--fen" => {
                parsed.fen = Some(value(i)?.clone());
                i += 1;
            }
            "--max-moves" | "-m" => {
                let n = value(i)?;
                parsed.max_moves = Some(n.parse().with_context(|| format!("invalid --max-moves {n:?}"))?);
                i += 1;
            }
            other => bail!("unknown argument {other:?}"),
        }
        i += 1;
    }
    Ok(Some(parsed))
}

/// Prints the board and game events for a person at the terminal.
struct TerminalObserver;

impl GameObserver for TerminalObserver {
    fn game_started(&mut self, game: &Game, white: &str, black: &str) {
        println!("=== {white} (White) vs {black} (Black) ===");
        println!();
        println!("{}", game.position());
        println!();
    }

    fn turn_started(&mut self, game: &Game, side: Color, player: &str, is_agent: bool) {
        if !is_agent {
            let preview: Vec<String> = game.legal_moves().iter().take(12).map(|m| m.to_string()).collect();
            println!("{player} ({side}) to move. Legal moves: {}", preview.join(", "));
            if game.legal_moves().len() > preview.len() {
                println!("... and {} more", game.legal_moves().len() - preview.len());
            }
            println!("Type a move like e2e4, 'help' for the format, 'legal' for all moves, 'quit' to exit");
        } else {
            println!("{player} ({side}) is thinking...");
        }
    }

    fn help_requested(&mut self) {
        println!("{HELP_TEXT}");
    }

    fn legal_moves_requested(&mut self, legal: &[Move]) {
        println!("All {} legal moves:", legal.len());
        for row in legal.chunks(8) {
            let row: Vec<String> = row.iter().map(|m| format!("{:6}", m.to_string())).collect();
            println!("  {}", row.join(" "));
        }
    }

    fn proposal_rejected(&mut self, player: &str, error: &ProposalError, attempt: u32) {
        if attempt == 0 {
            println!("Rejected: {error}");
        } else {
            println!("{player}: {error} (attempt {attempt})");
        }
    }

    fn move_applied(&mut self, game: &Game, last_move: Move) {
        println!();
        println!("Move {}: {last_move}", game.ply_count());
        println!("{}", game.position());
        if game.position().in_check(game.side_to_move()) && !game.is_over() {
            println!("Check!");
        }
        println!();
    }

    fn game_finished(&mut self, _game: &Game, status: &TerminationStatus) {
        println!("Game over: {status}");
    }
}

fn agent(color: Color, limiter: &RateLimiter, config: &ArbiterConfig) -> MoveSource {
    MoveSource::Agent(AgentSource::new(
        agent_name(color),
        Arc::new(RandomMoveService::new()),
        limiter.clone(),
        config.prompt_legal_move_limit,
    ))
}

fn human(color: Color, console: &ConsoleInput) -> MoveSource {
    MoveSource::Human(HumanSource::new(format!("Human_{color}"), console.clone()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let raw: Vec<String> = env::args().skip(1).collect();
    let Some(args) = parse_args(&raw)? else {
        print_usage();
        return Ok(());
    };

    let mut config = match &args.config {
        Some(path) => ArbiterConfig::load(path)?,
        None => ArbiterConfig::default(),
    };
    if let Some(max_moves) = args.max_moves {
        config.max_moves = max_moves;
    }
    config.validate()?;

    let start = match &args.fen {
        Some(fen) => Position::from_fen(fen).with_context(|| format!("invalid --fen {fen:?}"))?,
        None => Position::startpos(),
    };

    let (white_limiter, black_limiter) = limiters_for(&config);
    let console = ConsoleInput::stdin();
    let (white, black) = match args.mode {
        Mode::AiVsAi => (
            agent(Color::White, &white_limiter, &config),
            agent(Color::Black, &black_limiter, &config),
        ),
        Mode::HumanVsAi => match args.human_color {
            Color::White => (human(Color::White, &console), agent(Color::Black, &black_limiter, &config)),
            Color::Black => (agent(Color::White, &white_limiter, &config), human(Color::Black, &console)),
        },
        Mode::HumanVsHuman => (human(Color::White, &console), human(Color::Black, &console)),
    };

    let stop = StopSignal::new();
    stop.install_ctrl_c();

    let fen_output = config.fen_output.clone();
    let record_output = config.record_output.clone();
    let mut orchestrator = Orchestrator::new(config, white, black)
        .with_observer(Box::new(TerminalObserver))
        .with_stop_signal(stop);
    let white_name = orchestrator.player_name(Color::White).to_string();
    let black_name = orchestrator.player_name(Color::Black).to_string();

    let mut game = orchestrator.new_game(start);
    let started = Instant::now();
    orchestrator.play(&mut game).await;

    let summary = GameSummary::from_game(&game, &white_name, &black_name, started.elapsed());
    println!();
    println!("{}", summary.report());

    summary
        .write_fen(&fen_output)
        .with_context(|| format!("failed to write {}", fen_output.display()))?;
    println!("Final position saved to {}", fen_output.display());

    if let Some(path) = record_output {
        summary
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Game summary saved to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_defaults_and_flags() {
        let parsed = parse_args(&args(&[])).unwrap().unwrap();
        assert_eq!(parsed.mode, Mode::AiVsAi);
        assert_eq!(parsed.human_color, Color::White);

        let parsed = parse_args(&args(&[
            "human-vs-ai",
            "--color",
            "Black",
            "--max-moves",
            "60",
            "--fen",
            "8/8/8/4k3/8/4K3/8/R7 w - - 0 1",
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(parsed.mode, Mode::HumanVsAi);
        assert_eq!(parsed.human_color, Color::Black);
        assert_eq!(parsed.max_moves, Some(60));
        assert_eq!(parsed.fen.as_deref(), Some("8/8/8/4k3/8/4K3/8/R7 w - - 0 1"));
    }

    #[test]
    fn test_parse_errors_and_help() {
        assert!(parse_args(&args(&["--help"])).unwrap().is_none());
        assert!(parse_args(&args(&["--color"])).is_err());
        assert!(parse_args(&args(&["--color", "red"])).is_err());
        assert!(parse_args(&args(&["--max-moves", "lots"])).is_err());
        assert!(parse_args(&args(&["blitz"])).is_err());
    }
}
