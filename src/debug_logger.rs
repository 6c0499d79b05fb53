// Per-decision JSONL logging.
//
// The logger is injected into the Bot and scoped to one decision per call;
// writes are fire-and-forget so the request cycle never blocks on disk IO.
// Each line records enough of the snapshot for the replay tool to re-run
// the selector on it.

use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::types::{Board, Direction};

/// One recorded decision, one JSON line
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DecisionLogEntry {
    pub turn: i32,
    pub game_id: String,
    pub you_id: String,
    pub chosen_move: String,
    pub board: Board,
    pub timestamp: String,
}

/// Shared decision logger; cloneable so each request can hold a handle
#[derive(Clone)]
pub struct DecisionLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl DecisionLogger {
    /// Creates a new logger, truncating the log file if logging is enabled.
    /// IO errors degrade to a disabled logger rather than failing startup.
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("decision logging enabled: {}", log_file_path);
                DecisionLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("failed to create decision log '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a no-op logger
    pub fn disabled() -> Self {
        DecisionLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    /// Records one decision asynchronously (fire-and-forget)
    pub fn log_decision(
        &self,
        turn: i32,
        game_id: &str,
        you_id: &str,
        board: Board,
        chosen: Direction,
    ) {
        if !self.enabled {
            return;
        }

        let entry = DecisionLogEntry {
            turn,
            game_id: game_id.to_string(),
            you_id: you_id.to_string(),
            chosen_move: chosen.as_str().to_string(),
            board,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let file_handle = self.file.clone();

        tokio::spawn(async move {
            Self::write_entry(file_handle, entry).await;
        });
    }

    async fn write_entry(file_handle: Arc<Mutex<Option<File>>>, entry: DecisionLogEntry) {
        let mut guard = file_handle.lock().await;
        let Some(file) = guard.as_mut() else {
            return;
        };

        match serde_json::to_string(&entry) {
            Ok(line) => {
                let line = format!("{}\n", line);
                if let Err(e) = file.write_all(line.as_bytes()).await {
                    error!("failed to write decision log entry: {}", e);
                } else if let Err(e) = file.flush().await {
                    error!("failed to flush decision log: {}", e);
                }
            }
            Err(e) => error!("failed to serialize decision log entry: {}", e),
        }
    }
}
