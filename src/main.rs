use log::{error, info, warn};
use std::env;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use tron_bot::bot::Bot;
use tron_bot::config::Config;
use tron_bot::debug_logger::DebugLogger;
use tron_bot::protocol::{self, GameState};

#[tokio::main]
async fn main() {
    // Default to 'info' logging unless RUST_LOG says otherwise.
    // Logs go to stderr; stdout carries only the chosen actions.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    info!("Starting tron bot...");

    // Load configuration once at startup
    let config = Config::load_or_default();
    let logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path).await;
    let mut state = GameState::new(config.board.width, config.board.height);
    let bot = Bot::new(config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let turn = match protocol::read_turn(&mut lines).await {
            Ok(Some(turn)) => turn,
            Ok(None) => {
                info!("End of input, shutting down");
                break;
            }
            Err(e) => {
                error!("Invalid turn input: {}", e);
                std::process::exit(1);
            }
        };

        if let Err(e) = state.apply_turn(&turn.agents) {
            error!("Could not apply turn: {}", e);
            std::process::exit(1);
        }

        let direction = match bot.get_move(&state, turn.me, &logger).await {
            Ok(decision) => decision.direction,
            Err(e) => {
                warn!("{}", e);
                None
            }
        };

        let action = direction.unwrap_or_else(|| {
            warn!("Turn {}: no legal move, submitting fallback", state.turn());
            match state.position(turn.me) {
                Some(me) => Bot::fallback_direction(state.board(), me),
                None => tron_bot::types::Direction::Up,
            }
        });

        println!("{}", action.as_str());
        if let Err(e) = std::io::stdout().flush() {
            error!("Failed to flush stdout: {}", e);
            break;
        }
    }

    if logger.is_enabled() {
        info!("Writing remaining debug log entries");
        logger.flush().await;
    }
}
