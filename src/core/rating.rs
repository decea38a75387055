use crate::models::{PlayerProfile, RatingChange};

/// Standard Elo K-factor
pub const DEFAULT_K_FACTOR: f64 = 32.0;

/// Elo rating update applied after a reported win
///
/// Applying the same outcome twice applies it twice; de-duplication is the
/// caller's job (see `PlayerRegistry::report_outcome`).
#[derive(Debug, Clone, Copy)]
pub struct RatingUpdater {
    k_factor: f64,
}

impl Default for RatingUpdater {
    fn default() -> Self {
        Self::new(DEFAULT_K_FACTOR)
    }
}

impl RatingUpdater {
    pub fn new(k_factor: f64) -> Self {
        Self { k_factor }
    }

    pub fn k_factor(&self) -> f64 {
        self.k_factor
    }

    /// Winner's expected score against the loser
    #[inline]
    pub fn expected_win(winner_skill: i32, loser_skill: i32) -> f64 {
        let gap = (loser_skill as f64 - winner_skill as f64) / 400.0;
        1.0 / (1.0 + 10f64.powf(gap))
    }

    /// Rating deltas `(winner, loser)`; they always sum to zero
    pub fn deltas(&self, winner_skill: i32, loser_skill: i32) -> (i32, i32) {
        let surprise = 1.0 - Self::expected_win(winner_skill, loser_skill);
        let winner_delta = (self.k_factor * surprise).round() as i32;
        let loser_delta = (self.k_factor * -surprise).round() as i32;
        (winner_delta, loser_delta)
    }

    /// Update both profiles in place
    pub fn apply(&self, winner: &mut PlayerProfile, loser: &mut PlayerProfile) -> RatingChange {
        let (winner_delta, loser_delta) = self.deltas(winner.skill, loser.skill);
        winner.skill = winner.skill.saturating_add(winner_delta);
        loser.skill = loser.skill.saturating_add(loser_delta);

        tracing::debug!(
            "Elo update: {} {:+} -> {}, {} {:+} -> {}",
            winner.id,
            winner_delta,
            winner.skill,
            loser.id,
            loser_delta,
            loser.skill
        );

        RatingChange {
            winner: winner.id.clone(),
            loser: loser.id.clone(),
            winner_delta,
            loser_delta,
            winner_skill: winner.skill,
            loser_skill: loser.skill,
        }
    }
}
