// Replay tooling for recorded decision logs.
//
// Parses the JSONL decision log, re-runs the move selector on each recorded
// snapshot, and reports where the recomputed move diverges from the recorded
// one. Useful both for regression-hunting after weight changes and for
// post-mortems on lost games.

use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::bot;
use crate::config::Config;
use crate::debug_logger::DecisionLogEntry;
use crate::sim::{BoardState, StandardRules};
use crate::types::{Board, Direction};

/// Result of replaying a single recorded turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub turn: i32,
    pub original_move: Direction,
    pub replayed_move: Direction,
    pub matches: bool,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing decision logs
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
}

impl ReplayEngine {
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine { config, verbose }
    }

    /// Loads all entries from a JSONL decision log
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<DecisionLogEntry>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;
            if line.trim().is_empty() {
                continue;
            }

            let entry: DecisionLogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;
            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Runs the selector on one recorded snapshot
    pub fn replay_turn(&self, board: &Board, you_id: &str) -> Result<(Direction, u128), String> {
        if board.snakes.iter().all(|s| s.id != you_id) {
            return Err(format!("snake '{}' not found in board state", you_id));
        }

        let sim_board = BoardState::from_api(board);
        let start_time = Instant::now();
        let deadline = start_time + Duration::from_millis(self.config.timing.search_budget_ms());

        let chosen = bot::select_move(&sim_board, you_id, &StandardRules, &self.config, deadline);
        Ok((chosen, start_time.elapsed().as_millis()))
    }

    /// Replays a single log entry and compares the result to the record
    pub fn replay_entry(&self, entry: &DecisionLogEntry) -> Result<ReplayResult, String> {
        let original_move = Direction::parse(&entry.chosen_move)?;
        let (replayed_move, computation_time_ms) =
            self.replay_turn(&entry.board, &entry.you_id)?;

        let matches = original_move == replayed_move;
        if self.verbose {
            if matches {
                info!(
                    "Turn {}: MATCH - {} ({}ms)",
                    entry.turn,
                    replayed_move.as_str(),
                    computation_time_ms
                );
            } else {
                warn!(
                    "Turn {}: MISMATCH - recorded {}, replayed {} ({}ms)",
                    entry.turn,
                    original_move.as_str(),
                    replayed_move.as_str(),
                    computation_time_ms
                );
            }
        }

        Ok(ReplayResult {
            turn: entry.turn,
            original_move,
            replayed_move,
            matches,
            computation_time_ms,
        })
    }

    /// Replays every entry in the log
    pub fn replay_all(&self, entries: &[DecisionLogEntry]) -> Vec<ReplayResult> {
        let mut results = Vec::new();
        for entry in entries {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => warn!("Failed to replay turn {}: {}", entry.turn, e),
            }
        }
        results
    }

    /// Replays only the listed turn numbers
    pub fn replay_turns(
        &self,
        entries: &[DecisionLogEntry],
        turn_numbers: &[i32],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();
        for turn_num in turn_numbers {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn_num)
                .ok_or_else(|| format!("Turn {} not found in log file", turn_num))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => warn!("Failed to replay turn {}: {}", turn_num, e),
            }
        }
        Ok(results)
    }

    /// Aggregates replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a summary report with mismatch details
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("================ REPLAY REPORT ================");
        println!("Total Turns:    {}", stats.total_turns);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("===============================================");

        if !results.is_empty() {
            let avg_time: f64 = results
                .iter()
                .map(|r| r.computation_time_ms as f64)
                .sum::<f64>()
                / results.len() as f64;
            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        for result in results.iter().filter(|r| !r.matches) {
            println!(
                "Turn {}: recorded {} -> replayed {} ({}ms)",
                result.turn,
                result.original_move.as_str(),
                result.replayed_move.as_str(),
                result.computation_time_ms
            );
        }
    }

    /// Checks that recorded moves match an expected list of (turn, moves)
    pub fn validate_expected_moves(
        &self,
        entries: &[DecisionLogEntry],
        expected_moves: &[(i32, Vec<Direction>)],
    ) -> Result<(), String> {
        for (turn, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn)
                .ok_or_else(|| format!("Turn {} not found in log", turn))?;

            let actual_move = Direction::parse(&entry.chosen_move)?;
            if !acceptable.contains(&actual_move) {
                return Err(format!(
                    "Turn {}: Expected one of {:?}, but got {}",
                    turn,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    actual_move.as_str()
                ));
            }
        }
        Ok(())
    }
}
