// Configuration module for reading Snake.toml
// All tunable engine constants live here so weight tuning never requires a
// recompile.

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub timing: TimingConfig,
    pub search: SearchConfig,
    pub scores: ScoresConfig,
    pub fallback: FallbackConfig,
    pub debug: DebugConfig,
}

/// Timing and performance constants
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    pub response_time_budget_ms: u64,
    pub network_overhead_ms: u64,
    pub polling_interval_ms: u64,
    pub deadline_margin_ms: u64,
}

impl TimingConfig {
    /// Computes the effective computation budget
    pub fn effective_budget_ms(&self) -> u64 {
        self.response_time_budget_ms
            .saturating_sub(self.network_overhead_ms)
    }

    /// Budget for the search itself, leaving a margin to assemble the response
    pub fn search_budget_ms(&self) -> u64 {
        self.effective_budget_ms()
            .saturating_sub(self.deadline_margin_ms)
    }
}

/// Alpha-beta search constants
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Node-depth allowance per live snake; total depth = this * live snakes
    pub depth_per_snake: u8,
    /// Hard cap on node depth regardless of snake count
    pub max_search_depth: u8,
    /// An opponent whose head is within this Manhattan distance of ours gets
    /// a length-biased synthesized move instead of a neutral one
    pub aggression_distance: i32,
}

impl SearchConfig {
    /// Depth bound for a board with the given number of live snakes
    pub fn depth_for(&self, num_alive_snakes: usize) -> u8 {
        let scaled = self.depth_per_snake as usize * num_alive_snakes.max(1);
        scaled.min(self.max_search_depth as usize) as u8
    }
}

/// Evaluation weights. The required invariant is relative ordering, not the
/// absolute magnitudes.
#[derive(Debug, Deserialize, Clone)]
pub struct ScoresConfig {
    // Food seeking
    pub food_proximity_base: i32,
    pub food_on_cell_bonus: i32,
    pub growth_bonus: i32,

    // Tail-chase positioning
    pub tail_proximity_bonus: i32,
    pub tail_proximity_distance: i32,

    // Head-to-head risk
    pub threat_distance: i32,
    pub threat_two_exits: i32,
    pub threat_three_exits: i32,

    // Mobility and starvation
    pub no_safe_moves_penalty: i32,
    pub low_health_threshold: i32,
    pub low_health_penalty: i32,
}

/// Desirability map and flood-fill constants for the fallback planner
#[derive(Debug, Deserialize, Clone)]
pub struct FallbackConfig {
    pub body_weight: i32,
    pub hazard_weight: i32,
    pub food_weight: i32,
    pub food_halo_weight: i32,
    pub food_halo_radius: i32,
    pub head_halo_weight: i32,
    pub flood_fill_depth: u32,
    /// Reachable-area contribution is capped at this multiple of our length
    pub area_cap_per_length: i32,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Snake.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                response_time_budget_ms: 400,
                network_overhead_ms: 50,
                polling_interval_ms: 10,
                deadline_margin_ms: 30,
            },
            search: SearchConfig {
                depth_per_snake: 4,
                max_search_depth: 16,
                aggression_distance: 4,
            },
            scores: ScoresConfig {
                food_proximity_base: 1000,
                food_on_cell_bonus: 500,
                growth_bonus: 500,
                tail_proximity_bonus: 250,
                tail_proximity_distance: 3,
                threat_distance: 2,
                threat_two_exits: 500,
                threat_three_exits: 250,
                no_safe_moves_penalty: 1000,
                low_health_threshold: 20,
                low_health_penalty: 100,
            },
            fallback: FallbackConfig {
                body_weight: -10,
                hazard_weight: -10,
                food_weight: 5,
                food_halo_weight: 3,
                food_halo_radius: 2,
                head_halo_weight: -4,
                flood_fill_depth: 12,
                area_cap_per_length: 2,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "decisions.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!(
                "Could not load Snake.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_budget_calculation() {
        let config = Config::default_hardcoded();
        assert_eq!(config.timing.effective_budget_ms(), 350);
        assert_eq!(config.timing.search_budget_ms(), 320);
    }

    #[test]
    fn test_depth_scales_with_snake_count() {
        let config = Config::default_hardcoded();
        assert_eq!(config.search.depth_for(1), 4);
        assert_eq!(config.search.depth_for(2), 8);
        // Capped at max_search_depth
        assert_eq!(config.search.depth_for(8), 16);
        // Degenerate snake count still yields a usable depth
        assert_eq!(config.search.depth_for(0), 4);
    }

    #[test]
    fn test_snake_toml_can_be_parsed() {
        let result = Config::from_file("Snake.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Snake.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_snake_toml_matches_hardcoded_defaults() {
        let file_config = Config::from_file("Snake.toml").expect("Snake.toml should be parseable");
        let hardcoded = Config::default_hardcoded();

        // Timing
        assert_eq!(
            file_config.timing.response_time_budget_ms,
            hardcoded.timing.response_time_budget_ms
        );
        assert_eq!(
            file_config.timing.network_overhead_ms,
            hardcoded.timing.network_overhead_ms
        );

        // Search
        assert_eq!(
            file_config.search.depth_per_snake,
            hardcoded.search.depth_per_snake
        );
        assert_eq!(
            file_config.search.max_search_depth,
            hardcoded.search.max_search_depth
        );

        // Scores
        assert_eq!(
            file_config.scores.food_proximity_base,
            hardcoded.scores.food_proximity_base
        );
        assert_eq!(
            file_config.scores.threat_two_exits,
            hardcoded.scores.threat_two_exits
        );
        assert_eq!(
            file_config.scores.low_health_threshold,
            hardcoded.scores.low_health_threshold
        );

        // Fallback
        assert_eq!(file_config.fallback.body_weight, hardcoded.fallback.body_weight);
        assert_eq!(
            file_config.fallback.flood_fill_depth,
            hardcoded.fallback.flood_fill_depth
        );
    }

    #[test]
    fn test_score_weights_are_sane() {
        let config = Config::default_hardcoded();
        assert!(config.scores.food_proximity_base > 0);
        assert!(config.scores.growth_bonus > 0);
        assert!(config.scores.threat_two_exits > config.scores.threat_three_exits);
        assert!(config.scores.low_health_threshold > 0);
        assert!(config.fallback.body_weight < 0);
        assert!(config.fallback.food_weight > 0);
        assert!(!config.debug.log_file_path.is_empty());
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
    }
}
