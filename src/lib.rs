// Library exports for the tron bot
// This allows the replay tool and integration tests to use the core decision logic

pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod protocol;
pub mod replay;
pub mod search;
pub mod simple_profiler;
pub mod space;
pub mod types;
