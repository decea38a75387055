use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque player identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Game mode and region a player queued for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub mode: String,
    pub region: String,
}

/// Player profile as seen by the matching core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    #[serde(rename = "playerId")]
    pub id: PlayerId,
    pub skill: i32,
    #[serde(rename = "latencyMs")]
    pub latency_ms: u32,
    pub preferences: Preferences,
}

impl PlayerProfile {
    pub fn new(
        id: impl Into<PlayerId>,
        skill: i32,
        latency_ms: u32,
        mode: &str,
        region: &str,
    ) -> Self {
        Self {
            id: id.into(),
            skill,
            latency_ms,
            preferences: Preferences {
                mode: mode.to_string(),
                region: region.to_string(),
            },
        }
    }

    /// Partitioning attribute: only players sharing it are connected
    pub fn region(&self) -> &str {
        &self.preferences.region
    }

    pub fn mode(&self) -> &str {
        &self.preferences.mode
    }
}

/// Tunables of the pairwise cost function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostWeights {
    /// Skill points that cost 1.0
    pub skill_scale: f64,
    /// Combined latency in ms that costs 1.0
    pub latency_scale: f64,
    pub mode_mismatch_penalty: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            skill_scale: 100.0,
            latency_scale: 1000.0,
            mode_mismatch_penalty: 0.5,
        }
    }
}

/// Which primary strategy the orchestrator runs before falling back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    #[default]
    UniformCost,
    AStar,
    Stable,
}

/// The stage that produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    UniformCost,
    AStar,
    Stable,
    Greedy,
}

/// A formed cohort
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "matchId")]
    pub match_id: uuid::Uuid,
    pub players: Vec<PlayerId>,
    /// Sequential cost of the cohort in member order
    #[serde(rename = "totalCost")]
    pub total_cost: f64,
    #[serde(rename = "resolvedBy")]
    pub resolved_by: Resolution,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl MatchResult {
    pub fn new(players: Vec<PlayerId>, total_cost: f64, resolved_by: Resolution) -> Self {
        Self {
            match_id: uuid::Uuid::new_v4(),
            players,
            total_cost,
            resolved_by,
            created_at: chrono::Utc::now(),
        }
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.players.contains(id)
    }
}

/// Result of a single Elo update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingChange {
    pub winner: PlayerId,
    pub loser: PlayerId,
    pub winner_delta: i32,
    pub loser_delta: i32,
    pub winner_skill: i32,
    pub loser_skill: i32,
}
