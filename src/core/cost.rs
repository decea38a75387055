use crate::models::{CostWeights, PlayerProfile};

/// Pairwise compatibility cost between two players
///
/// Cost formula:
/// cost = (
///     |skill_a - skill_b| / skill_scale +          # Skill gap
///     (latency_a + latency_b) / latency_scale +    # Combined ping
///     mode_mismatch_penalty if modes differ        # Preference clash
/// )
///
/// Lower is better. The function is symmetric and never negative.
#[derive(Debug, Clone, Copy, Default)]
pub struct CostModel {
    weights: CostWeights,
}

impl CostModel {
    pub fn new(weights: CostWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &CostWeights {
        &self.weights
    }

    #[inline]
    pub fn cost(&self, a: &PlayerProfile, b: &PlayerProfile) -> f64 {
        skill_cost(a.skill, b.skill, self.weights.skill_scale)
            + latency_cost(a.latency_ms, b.latency_ms, self.weights.latency_scale)
            + mode_cost(a.mode(), b.mode(), self.weights.mode_mismatch_penalty)
    }

    /// Sum of edge costs along `members` in order
    pub fn sequential_cost(&self, members: &[&PlayerProfile]) -> f64 {
        members
            .windows(2)
            .map(|pair| self.cost(pair[0], pair[1]))
            .sum()
    }
}

#[inline]
fn skill_cost(a: i32, b: i32, scale: f64) -> f64 {
    // i64 so extreme ratings cannot overflow the difference
    (a as i64 - b as i64).abs() as f64 / scale
}

#[inline]
fn latency_cost(a: u32, b: u32, scale: f64) -> f64 {
    (a as f64 + b as f64) / scale
}

#[inline]
fn mode_cost(a: &str, b: &str, penalty: f64) -> f64 {
    if a != b {
        penalty
    } else {
        0.0
    }
}
