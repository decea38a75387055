use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use validator::Validate;

use crate::core::frontier::SearchBudget;
use crate::models::{CostWeights, MatchStrategy};

/// Matching core configuration
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct Settings {
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    #[validate(nested)]
    pub cost: CostSettings,
    #[serde(default)]
    #[validate(nested)]
    pub search: SearchSettings,
    #[serde(default)]
    pub rating: RatingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default)]
    pub strategy: MatchStrategy,
    #[serde(default = "default_max_goal_size")]
    pub max_goal_size: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            strategy: MatchStrategy::default(),
            max_goal_size: default_max_goal_size(),
        }
    }
}

fn default_max_goal_size() -> usize { 16 }

// Search relies on every edge cost being finite and non-negative
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CostSettings {
    #[serde(default = "default_skill_scale")]
    #[validate(range(exclusive_min = 0.0))]
    pub skill_scale: f64,
    #[serde(default = "default_latency_scale")]
    #[validate(range(exclusive_min = 0.0))]
    pub latency_scale: f64,
    #[serde(default = "default_mode_mismatch_penalty")]
    #[validate(range(min = 0.0))]
    pub mode_mismatch_penalty: f64,
}

impl Default for CostSettings {
    fn default() -> Self {
        Self {
            skill_scale: default_skill_scale(),
            latency_scale: default_latency_scale(),
            mode_mismatch_penalty: default_mode_mismatch_penalty(),
        }
    }
}

impl CostSettings {
    pub fn weights(&self) -> CostWeights {
        CostWeights {
            skill_scale: self.skill_scale,
            latency_scale: self.latency_scale,
            mode_mismatch_penalty: self.mode_mismatch_penalty,
        }
    }
}

fn default_skill_scale() -> f64 { 100.0 }
fn default_latency_scale() -> f64 { 1000.0 }
fn default_mode_mismatch_penalty() -> f64 { 0.5 }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchSettings {
    #[serde(default = "default_max_frontier")]
    pub max_frontier: usize,
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,
    /// Wall-clock limit per search; 0 disables it
    #[serde(default = "default_max_duration_ms")]
    pub max_duration_ms: u64,
    #[serde(default = "default_avg_step_cost")]
    #[validate(range(min = 0.0))]
    pub avg_step_cost: f64,
    #[serde(default = "default_candidate_count")]
    pub candidate_count: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_frontier: default_max_frontier(),
            max_expansions: default_max_expansions(),
            max_duration_ms: default_max_duration_ms(),
            avg_step_cost: default_avg_step_cost(),
            candidate_count: default_candidate_count(),
        }
    }
}

impl SearchSettings {
    pub fn budget(&self) -> SearchBudget {
        SearchBudget {
            max_frontier: self.max_frontier,
            max_expansions: self.max_expansions,
            max_duration: (self.max_duration_ms > 0)
                .then(|| Duration::from_millis(self.max_duration_ms)),
        }
    }
}

fn default_max_frontier() -> usize { 200_000 }
fn default_max_expansions() -> usize { 50_000 }
fn default_max_duration_ms() -> u64 { 250 }
fn default_avg_step_cost() -> f64 { 0.5 }
fn default_candidate_count() -> usize { 3 }

#[derive(Debug, Clone, Deserialize)]
pub struct RatingSettings {
    #[serde(default = "default_k_factor")]
    pub k_factor: f64,
    /// How long a reported match id is remembered for de-duplication
    #[serde(default = "default_outcome_ttl_secs")]
    pub outcome_ttl_secs: u64,
    /// Bound on matches awaiting an outcome and on remembered reports.
    /// Under pressure entries can be evicted before the TTL; an evicted
    /// pending match can no longer be reported, an evicted report is
    /// still rejected because its match was already claimed.
    #[serde(default = "default_outcome_capacity")]
    pub outcome_capacity: u64,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            k_factor: default_k_factor(),
            outcome_ttl_secs: default_outcome_ttl_secs(),
            outcome_capacity: default_outcome_capacity(),
        }
    }
}

fn default_k_factor() -> f64 { 32.0 }
fn default_outcome_ttl_secs() -> u64 { 86_400 }
fn default_outcome_capacity() -> u64 { 100_000 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with COHORT_)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., COHORT__SEARCH__MAX_FRONTIER -> search.max_frontier
            .add_source(environment())
            .build()?
            .try_deserialize::<Settings>()?
            .checked()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize::<Settings>()?
            .checked()
    }

    /// Reject weights that would produce negative or NaN edge costs
    pub fn checked(self) -> Result<Self, ConfigError> {
        self.validate()
            .map_err(|e| ConfigError::Message(format!("invalid settings: {}", e)))?;
        Ok(self)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("COHORT")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
