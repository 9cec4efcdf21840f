// Debug logging module for asynchronous game state logging
//
// This module provides fire-and-forget async logging to avoid delaying the
// answer for the current turn. Each decided turn is written as one JSONL line
// that the replay tool can read back. Records go through a channel to a single
// writer task, so they land in the file in the order they were logged.

use log::error;
use serde::{Deserialize, Serialize};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot};

use crate::bot::{Decision, Opponent};
use crate::types::{Board, Coord};

/// A single logged turn
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TurnRecord {
    pub turn: u32,
    /// Action name, absent when the agent had no legal move
    pub chosen_move: Option<String>,
    pub score: i32,
    pub depth: u8,
    pub me_index: u8,
    pub me: Coord,
    pub opponent: Option<Opponent>,
    pub board: Board,
    pub timestamp: String,
}

enum LogCommand {
    Record(Box<TurnRecord>),
    /// Acknowledged once every record queued before it is on disk
    Flush(oneshot::Sender<()>),
}

/// Shared debug logger handle
/// Clones share one writer task; a disabled logger has no sender
#[derive(Clone)]
pub struct DebugLogger {
    sender: Option<mpsc::UnboundedSender<LogCommand>>,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    /// and starts the writer task on the current runtime
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
                log::info!("Debug logging enabled: {}", log_file_path);
                let (sender, receiver) = mpsc::unbounded_channel();
                tokio::spawn(Self::run_writer(file, receiver));
                DebugLogger {
                    sender: Some(sender),
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger { sender: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Queues a decided turn for writing (fire-and-forget)
    /// Never waits on the file; the writer task does the I/O
    pub fn log_turn(
        &self,
        turn: u32,
        me_index: u8,
        me: Coord,
        opponent: Option<Opponent>,
        board: Board,
        decision: &Decision,
    ) {
        let sender = match &self.sender {
            Some(sender) => sender,
            None => return,
        };

        let record = TurnRecord {
            turn,
            chosen_move: decision.direction.map(|d| d.as_str().to_string()),
            score: decision.score,
            depth: decision.depth,
            me_index,
            me,
            opponent,
            board,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        if sender.send(LogCommand::Record(Box::new(record))).is_err() {
            error!("Debug log writer has stopped, dropping turn {}", turn);
        }
    }

    async fn run_writer(mut file: File, mut receiver: mpsc::UnboundedReceiver<LogCommand>) {
        while let Some(command) = receiver.recv().await {
            match command {
                LogCommand::Record(record) => Self::write_record(&mut file, &record).await,
                LogCommand::Flush(done) => {
                    if let Err(e) = file.flush().await {
                        error!("Failed to flush debug log: {}", e);
                    }
                    let _ = done.send(());
                }
            }
        }
    }

    /// Performs the actual file write
    async fn write_record(file: &mut File, record: &TurnRecord) {
        match serde_json::to_string(record) {
            Ok(json_line) => {
                let line_with_newline = format!("{}\n", json_line);
                if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                    error!("Failed to write debug log entry: {}", e);
                } else if let Err(e) = file.flush().await {
                    error!("Failed to flush debug log: {}", e);
                }
            }
            Err(e) => {
                error!("Failed to serialize debug log entry: {}", e);
            }
        }
    }

    /// Waits until every turn logged so far has been written.
    /// Used before shutdown so the last turns are not lost.
    pub async fn flush(&self) {
        let sender = match &self.sender {
            Some(sender) => sender,
            None => return,
        };

        let (done, written) = oneshot::channel();
        if sender.send(LogCommand::Flush(done)).is_err() || written.await.is_err() {
            error!("Debug log writer stopped before flushing");
        }
    }
}
