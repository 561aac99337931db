use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::sync::Mutex;

use super::{HumanCommand, Proposal, TurnContext};
use crate::error::ProposalError;

pub const HELP_TEXT: &str = "\
UCI move format:
  normal move      e2e4   (from e2 to e4)
  knight move      g1f3
  castling         e1g1   (king side) or e1c1 (queen side)
  promotion        a7a8q  (q=queen, r=rook, b=bishop, n=knight)
  en passant       e5d6   (written like a normal capture)
Commands: help, legal (list every legal move), quit";

type LineReader = Lines<BufReader<Box<dyn AsyncRead + Send + Unpin>>>;

/// One buffered line reader over an input stream.
///
/// Clones share the buffer, so two players at the same terminal read their
/// lines in turn instead of each draining the stream into its own buffer.
#[derive(Clone)]
pub struct ConsoleInput {
    lines: Arc<Mutex<LineReader>>,
}

impl ConsoleInput {
    pub fn stdin() -> Self {
        Self::from_reader(tokio::io::stdin())
    }

    pub fn from_reader(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        let reader: Box<dyn AsyncRead + Send + Unpin> = Box::new(reader);
        Self {
            lines: Arc::new(Mutex::new(BufReader::new(reader).lines())),
        }
    }

    async fn next_line(&self) -> io::Result<Option<String>> {
        self.lines.lock().await.next_line().await
    }
}

/// A person typing moves, one per line.
pub struct HumanSource {
    name: String,
    input: ConsoleInput,
}

impl HumanSource {
    pub fn new(name: impl Into<String>, input: ConsoleInput) -> Self {
        Self {
            name: name.into(),
            input,
        }
    }

    /// A source with a private reader.
    pub fn from_reader(name: impl Into<String>, reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self::new(name, ConsoleInput::from_reader(reader))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the next non-blank line. Input is matched case-insensitively.
    pub async fn propose_move(&mut self, _ctx: &TurnContext<'_>) -> Result<Proposal, ProposalError> {
        loop {
            let line = self
                .input
                .next_line()
                .await
                .map_err(|e| ProposalError::Input(e.to_string()))?
                .ok_or(ProposalError::InputClosed)?;
            let input = line.trim().to_ascii_lowercase();
            if input.is_empty() {
                continue;
            }
            return match input.as_str() {
                "help" => Ok(Proposal::Command(HumanCommand::Help)),
                "legal" => Ok(Proposal::Command(HumanCommand::Legal)),
                "quit" => Ok(Proposal::Command(HumanCommand::Quit)),
                token => Ok(Proposal::Move(token.parse()?)),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{Game, ParseError};

    fn human(input: &'static str) -> HumanSource {
        HumanSource::from_reader("Human", input.as_bytes())
    }

    async fn next_move(source: &mut HumanSource, ctx: &TurnContext<'_>) -> String {
        match source.propose_move(ctx).await.unwrap() {
            Proposal::Move(mv) => mv.to_string(),
            other => panic!("expected a move, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reads_moves_and_commands() {
        let game = Game::startpos();
        let ctx = TurnContext::from_game(&game);
        let mut source = human("\n  \nHELP\nlegal\n E2E4 \nquit\n");

        assert_eq!(
            source.propose_move(&ctx).await.unwrap(),
            Proposal::Command(HumanCommand::Help)
        );
        assert_eq!(
            source.propose_move(&ctx).await.unwrap(),
            Proposal::Command(HumanCommand::Legal)
        );
        match source.propose_move(&ctx).await.unwrap() {
            Proposal::Move(mv) => assert_eq!(mv.to_string(), "e2e4"),
            other => panic!("expected a move, got {other:?}"),
        }
        assert_eq!(
            source.propose_move(&ctx).await.unwrap(),
            Proposal::Command(HumanCommand::Quit)
        );
        assert!(matches!(
            source.propose_move(&ctx).await,
            Err(ProposalError::InputClosed)
        ));
    }

    #[tokio::test]
    async fn test_sources_sharing_input_take_lines_in_turn() {
        let game = Game::startpos();
        let ctx = TurnContext::from_game(&game);
        let input = ConsoleInput::from_reader("e2e4\ne7e5\ng1f3\n".as_bytes());
        let mut white = HumanSource::new("Human_White", input.clone());
        let mut black = HumanSource::new("Human_Black", input);

        assert_eq!(next_move(&mut white, &ctx).await, "e2e4");
        assert_eq!(next_move(&mut black, &ctx).await, "e7e5");
        assert_eq!(next_move(&mut white, &ctx).await, "g1f3");
        assert!(matches!(
            black.propose_move(&ctx).await,
            Err(ProposalError::InputClosed)
        ));
    }

    #[tokio::test]
    async fn test_malformed_input_is_a_parse_error() {
        let game = Game::startpos();
        let ctx = TurnContext::from_game(&game);
        let mut source = human("Nf3\n");
        assert!(matches!(
            source.propose_move(&ctx).await,
            Err(ProposalError::Parse(ParseError::Length(_)))
        ));
    }
}
