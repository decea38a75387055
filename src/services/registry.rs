use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

use crate::config::RatingSettings;
use crate::core::RatingUpdater;
use crate::error::MatchError;
use crate::models::{
    MatchResult, OutcomeReport, PlayerId, PlayerProfile, RatingChange, RegisterPlayerRequest,
};

type ProfileHandle = Arc<Mutex<PlayerProfile>>;

/// Live player table
///
/// Each profile sits behind its own lock so rating updates for different
/// players never contend. Matching only ever reads cloned snapshots.
pub struct PlayerRegistry {
    players: DashMap<PlayerId, ProfileHandle>,
    // Formed matches still waiting for an outcome, with their members
    issued: moka::sync::Cache<uuid::Uuid, Arc<Vec<PlayerId>>>,
    // Match ids whose outcome was already applied
    reported: moka::sync::Cache<uuid::Uuid, ()>,
    updater: RatingUpdater,
}

impl PlayerRegistry {
    pub fn new(updater: RatingUpdater, outcome_ttl: Duration, outcome_capacity: u64) -> Self {
        let issued = moka::sync::Cache::builder()
            .max_capacity(outcome_capacity)
            .time_to_live(outcome_ttl)
            .build();
        let reported = moka::sync::Cache::builder()
            .max_capacity(outcome_capacity)
            .time_to_live(outcome_ttl)
            .build();

        Self {
            players: DashMap::new(),
            issued,
            reported,
            updater,
        }
    }

    pub fn from_settings(settings: &RatingSettings) -> Self {
        Self::new(
            RatingUpdater::new(settings.k_factor),
            Duration::from_secs(settings.outcome_ttl_secs),
            settings.outcome_capacity,
        )
    }

    /// Add a new player; an id can only be registered once
    pub fn register(&self, profile: PlayerProfile) -> Result<(), MatchError> {
        match self.players.entry(profile.id.clone()) {
            Entry::Occupied(_) => Err(MatchError::DuplicatePlayer(profile.id)),
            Entry::Vacant(slot) => {
                tracing::debug!(
                    "Registered player {} (skill {}, {} ms, {}/{})",
                    profile.id,
                    profile.skill,
                    profile.latency_ms,
                    profile.mode(),
                    profile.region()
                );
                slot.insert(Arc::new(Mutex::new(profile)));
                Ok(())
            }
        }
    }

    /// Validate a registration request and add the player
    pub fn register_request(
        &self,
        request: RegisterPlayerRequest,
    ) -> Result<PlayerProfile, MatchError> {
        request.validate()?;
        let profile = request.into_profile();
        self.register(profile.clone())?;
        Ok(profile)
    }

    /// Drop a player who left the pool
    pub fn remove(&self, id: &PlayerId) -> Option<PlayerProfile> {
        self.players
            .remove(id)
            .map(|(_, handle)| handle.lock().clone())
    }

    /// Copy of the player's current profile
    pub fn get(&self, id: &PlayerId) -> Option<PlayerProfile> {
        self.players.get(id).map(|handle| handle.lock().clone())
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// By-value copies of the given players, in the given order
    pub fn snapshot(&self, ids: &[PlayerId]) -> Result<Vec<PlayerProfile>, MatchError> {
        ids.iter()
            .map(|id| {
                self.get(id)
                    .ok_or_else(|| MatchError::UnknownPlayer(id.clone()))
            })
            .collect()
    }

    /// Apply an Elo update for `winner` beating `loser`
    ///
    /// Not idempotent: calling this twice for the same game applies the
    /// update twice. Use [`report_outcome`](Self::report_outcome) when the
    /// game has a match id.
    pub fn update_ratings(
        &self,
        winner: &PlayerId,
        loser: &PlayerId,
    ) -> Result<RatingChange, MatchError> {
        if winner == loser {
            return Err(MatchError::SelfMatch(winner.clone()));
        }

        let winner_handle = self.handle(winner)?;
        let loser_handle = self.handle(loser)?;

        // Lock in id order so two concurrent updates over the same pair
        // cannot deadlock
        let (mut w, mut l) = if winner < loser {
            let w = winner_handle.lock();
            let l = loser_handle.lock();
            (w, l)
        } else {
            let l = loser_handle.lock();
            let w = winner_handle.lock();
            (w, l)
        };

        Ok(self.updater.apply(&mut w, &mut l))
    }

    /// Remember a formed match so its outcome can be reported later
    pub fn record_match(&self, result: &MatchResult) {
        self.issued
            .insert(result.match_id, Arc::new(result.players.clone()));
    }

    /// Apply a reported outcome once per match id
    ///
    /// The match must have been recorded with [`record_match`](Self::record_match)
    /// and both players must have been part of it. Reporting claims the
    /// match, so a second report is rejected even after the de-duplication
    /// window has forgotten it (`DuplicateOutcome` while remembered,
    /// `UnknownMatch` afterwards).
    pub fn report_outcome(&self, report: &OutcomeReport) -> Result<RatingChange, MatchError> {
        report.validate()?;

        let match_id = report.match_id;
        let winner = PlayerId::from(report.winner_id.as_str());
        let loser = PlayerId::from(report.loser_id.as_str());
        if winner == loser {
            return Err(MatchError::SelfMatch(winner));
        }

        if self.reported.contains_key(&match_id) {
            tracing::warn!("Ignoring duplicate outcome for match {}", match_id);
            return Err(MatchError::DuplicateOutcome(match_id));
        }

        let members = self
            .issued
            .get(&match_id)
            .ok_or(MatchError::UnknownMatch(match_id))?;
        for id in [&winner, &loser] {
            if !members.contains(id) {
                return Err(MatchError::InvalidRequest(format!(
                    "player {} did not play in match {}",
                    id, match_id
                )));
            }
        }
        self.handle(&winner)?;
        self.handle(&loser)?;

        // Only one concurrent report can take the match out
        if self.issued.remove(&match_id).is_none() {
            tracing::warn!("Ignoring duplicate outcome for match {}", match_id);
            return Err(MatchError::DuplicateOutcome(match_id));
        }
        self.reported.insert(match_id, ());

        match self.update_ratings(&winner, &loser) {
            Ok(change) => {
                tracing::info!(
                    "Outcome for match {}: {} beat {} ({:+}/{:+})",
                    match_id,
                    winner,
                    loser,
                    change.winner_delta,
                    change.loser_delta
                );
                Ok(change)
            }
            Err(e) => {
                // Player left in between; let a retry through
                self.reported.invalidate(&match_id);
                self.issued.insert(match_id, members);
                Err(e)
            }
        }
    }

    fn handle(&self, id: &PlayerId) -> Result<ProfileHandle, MatchError> {
        self.players
            .get(id)
            .map(|handle| Arc::clone(handle.value()))
            .ok_or_else(|| MatchError::UnknownPlayer(id.clone()))
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::from_settings(&RatingSettings::default())
    }
}
