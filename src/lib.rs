//! Cohort Match - skill and latency aware matchmaking core
//!
//! Builds a compatibility graph over a pool of registered players and forms
//! a single cohort through uniform-cost search, A* or a stable-pairing merge,
//! with a greedy nearest-neighbour fallback. Reported outcomes feed an Elo
//! rating update.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;

// Re-export commonly used types
pub use config::Settings;
pub use core::{CostModel, Matcher, RatingUpdater, SearchBudget};
pub use error::MatchError;
pub use models::{
    CostWeights, MatchRequest, MatchResult, MatchStrategy, OutcomeReport, PlayerId, PlayerProfile,
    RatingChange, RegisterPlayerRequest, Resolution,
};
pub use services::{MatchService, PlayerRegistry};
pub use telemetry::init_tracing;
