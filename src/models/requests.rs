use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{PlayerId, PlayerProfile, Preferences};

/// Request to add a player to the live table
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterPlayerRequest {
    #[validate(length(min = 1, max = 128))]
    #[serde(alias = "player_id", rename = "playerId")]
    pub player_id: String,
    #[serde(default = "default_skill")]
    pub skill: i32,
    // Anything above ten seconds is a broken measurement
    #[validate(range(max = 10000))]
    #[serde(alias = "latency_ms", rename = "latencyMs")]
    pub latency_ms: u32,
    #[validate(length(min = 1))]
    pub mode: String,
    #[validate(length(min = 1))]
    pub region: String,
}

fn default_skill() -> i32 {
    1500
}

impl RegisterPlayerRequest {
    pub fn into_profile(self) -> PlayerProfile {
        PlayerProfile {
            id: PlayerId::new(self.player_id),
            skill: self.skill,
            latency_ms: self.latency_ms,
            preferences: Preferences {
                mode: self.mode,
                region: self.region,
            },
        }
    }
}

/// Request to form one cohort out of a pool of registered players
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchRequest {
    #[serde(alias = "player_pool", rename = "playerPool")]
    pub player_pool: Vec<String>,
    #[validate(range(min = 1))]
    #[serde(alias = "goal_size", rename = "goalSize")]
    pub goal_size: usize,
}

/// Outcome of a played match, reported once per match id
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OutcomeReport {
    #[serde(alias = "match_id", rename = "matchId")]
    pub match_id: uuid::Uuid,
    #[validate(length(min = 1))]
    #[serde(alias = "winner_id", rename = "winnerId")]
    pub winner_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "loser_id", rename = "loserId")]
    pub loser_id: String,
}
