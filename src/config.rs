// Configuration module for reading Tron.toml
// All tunable search and driver parameters live here rather than as constants in the bot

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::space::FloodFillParams;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub timing: TimingConfig,
    pub flood_fill: FloodFillConfig,
    pub board: BoardConfig,
    pub debug: DebugConfig,
}

/// Per-turn time budget and search depth
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    /// Time allowed for the first turn, which usually gets a larger budget
    pub first_turn_budget_ms: u64,
    pub turn_budget_ms: u64,
    /// Reserved for reading input and printing the answer
    pub io_overhead_ms: u64,
    pub max_search_depth: u8,
    /// Expected ratio between the cost of depth d+1 and depth d; a deeper
    /// iteration is not started when its estimate exceeds the remaining time
    pub depth_growth_factor: f64,
    /// Deepen from 1 up to `max_search_depth` under a deadline instead of a
    /// single unbounded search at `max_search_depth`
    pub iterative_deepening: bool,
}

impl TimingConfig {
    /// Computes the search budget for a turn
    pub fn effective_budget_ms(&self, turn: u32) -> u64 {
        let budget = if turn == 0 {
            self.first_turn_budget_ms
        } else {
            self.turn_budget_ms
        };
        budget.saturating_sub(self.io_overhead_ms)
    }
}

/// Leaf heuristic flood-fill settings
#[derive(Debug, Deserialize, Clone)]
pub struct FloodFillConfig {
    pub scale_factor: f64,
    pub bounded: bool,
}

impl FloodFillConfig {
    pub fn params(&self) -> FloodFillParams {
        FloodFillParams {
            scale_factor: self.scale_factor,
            bounded: self.bounded,
        }
    }
}

/// Arena dimensions
#[derive(Debug, Deserialize, Clone)]
pub struct BoardConfig {
    pub width: i32,
    pub height: i32,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Tron.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed and validated configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        let config: Config =
            toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Tron.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Tron.toml")
    }

    /// Rejects values the search cannot run with
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.flood_fill.scale_factor) {
            return Err(format!(
                "flood_fill.scale_factor must be within [0, 1], got {}",
                self.flood_fill.scale_factor
            ));
        }
        if self.board.width <= 0 || self.board.height <= 0 {
            return Err(format!(
                "board dimensions must be positive, got {}x{}",
                self.board.width, self.board.height
            ));
        }
        if self.timing.depth_growth_factor < 1.0 {
            return Err(format!(
                "timing.depth_growth_factor must be at least 1.0, got {}",
                self.timing.depth_growth_factor
            ));
        }
        if self.timing.max_search_depth == 0 {
            return Err("timing.max_search_depth must be at least 1".to_string());
        }
        Ok(())
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Tron.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                first_turn_budget_ms: 1000,
                turn_budget_ms: 100,
                io_overhead_ms: 15,
                max_search_depth: 5,
                depth_growth_factor: 2.5,
                iterative_deepening: true,
            },
            flood_fill: FloodFillConfig {
                scale_factor: 0.1,
                bounded: true,
            },
            board: BoardConfig {
                width: 30,
                height: 20,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "tron_debug.jsonl".to_string(),
            },
        }
    }

    /// Loads configuration from Tron.toml, falling back to hardcoded defaults
    pub fn load_or_default() -> Self {
        match Self::load_default() {
            Ok(config) => {
                log::info!("Loaded configuration from Tron.toml");
                config
            }
            Err(e) => {
                log::warn!("Failed to load Tron.toml: {}. Using hardcoded defaults.", e);
                Self::default_hardcoded()
            }
        }
    }
}
