//! Game summary storage and reporting

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use chess_core::{Game, TerminationStatus};

use crate::error::SummaryError;

/// Everything worth keeping about a finished game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub white: String,
    pub black: String,
    /// PGN-style result: `1-0`, `0-1`, `1/2-1/2` or `*`
    pub result: String,
    /// Human-readable termination reason
    pub reason: String,
    pub moves: Vec<String>,
    pub plies: usize,
    pub initial_fen: String,
    pub final_fen: String,
    pub duration_seconds: f64,
}

impl GameSummary {
    pub fn from_game(game: &Game, white: &str, black: &str, duration: Duration) -> Self {
        let record = game.record();
        let status = record.status();
        Self {
            white: white.to_string(),
            black: black.to_string(),
            result: status.result().to_string(),
            reason: reason(status),
            moves: record.uci_moves(),
            plies: record.plies().len(),
            initial_fen: record.initial().to_fen(),
            final_fen: record.current().to_fen(),
            duration_seconds: duration.as_secs_f64(),
        }
    }

    /// Save summary to JSON file
    pub fn save(&self, path: &Path) -> Result<(), SummaryError> {
        let json = serde_json::to_string_pretty(self)?;
        write(path, json)
    }

    /// Load summary from JSON file
    pub fn load(path: &Path) -> Result<Self, SummaryError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SummaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write the final position as a single FEN line
    pub fn write_fen(&self, path: &Path) -> Result<(), SummaryError> {
        write(path, format!("{}\n", self.final_fen))
    }

    /// Generate a text report
    pub fn report(&self) -> String {
        let mut report = String::new();
        report.push_str(&format!("=== Game: {} vs {} ===\n\n", self.white, self.black));
        report.push_str(&format!("Result:      {}\n", self.result));
        report.push_str(&format!("Reason:      {}\n", self.reason));
        report.push_str(&format!(
            "Moves:       {} plies ({} full moves)\n",
            self.plies,
            self.plies.div_ceil(2)
        ));
        report.push_str(&format!("Duration:    {:.1}s\n", self.duration_seconds));
        report.push_str(&format!("Final FEN:   {}\n", self.final_fen));

        if !self.moves.is_empty() {
            report.push_str("\nHistory:\n");
            for (i, pair) in self.moves.chunks(2).enumerate() {
                report.push_str(&format!("{:>4}. {}\n", i + 1, pair.join(" ")));
            }
        }
        report
    }
}

fn reason(status: &TerminationStatus) -> String {
    match status {
        TerminationStatus::Aborted { reason } => reason.clone(),
        other => other.to_string(),
    }
}

fn write(path: &Path, contents: String) -> Result<(), SummaryError> {
    std::fs::write(path, contents).map_err(|source| SummaryError::Io {
        path: path.to_path_buf(),
        source,
    })
}
