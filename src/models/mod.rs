// Model exports
pub mod domain;
pub mod requests;

pub use domain::{
    CostWeights, MatchResult, MatchStrategy, PlayerId, PlayerProfile, Preferences, RatingChange,
    Resolution,
};
pub use requests::{MatchRequest, OutcomeReport, RegisterPlayerRequest};
