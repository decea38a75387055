use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use validator::Validate;

use crate::config::Settings;
use crate::core::Matcher;
use crate::error::MatchError;
use crate::models::{
    MatchRequest, MatchResult, OutcomeReport, PlayerId, PlayerProfile, RatingChange,
    RegisterPlayerRequest,
};
use crate::services::registry::PlayerRegistry;

/// Async entry point shared by every caller
///
/// Cloning is cheap; all clones see the same registry.
#[derive(Clone)]
pub struct MatchService {
    registry: Arc<PlayerRegistry>,
    matcher: Arc<Matcher>,
}

impl MatchService {
    pub fn new(registry: Arc<PlayerRegistry>, matcher: Matcher) -> Self {
        Self {
            registry,
            matcher: Arc::new(matcher),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        tracing::info!(
            "Match service configured: strategy {:?}, max goal {}, k-factor {}",
            settings.matching.strategy,
            settings.matching.max_goal_size,
            settings.rating.k_factor
        );

        Self::new(
            Arc::new(PlayerRegistry::from_settings(&settings.rating)),
            Matcher::from_settings(settings),
        )
    }

    pub fn registry(&self) -> &Arc<PlayerRegistry> {
        &self.registry
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn register_player(
        &self,
        request: RegisterPlayerRequest,
    ) -> Result<PlayerProfile, MatchError> {
        self.registry.register_request(request)
    }

    pub fn remove_player(&self, id: &PlayerId) -> Option<PlayerProfile> {
        self.registry.remove(id)
    }

    /// Form one cohort out of the requested pool
    ///
    /// The pool is snapshotted up front, so rating updates that land while
    /// the search runs are not seen by it. The search itself runs on the
    /// blocking pool and stops at its next step once `cancel` fires.
    pub async fn match_players(
        &self,
        request: MatchRequest,
        cancel: CancellationToken,
    ) -> Result<MatchResult, MatchError> {
        if let Err(errors) = request.validate() {
            tracing::info!("Validation failed for match request: {:?}", errors);
            return Err(errors.into());
        }

        let ids: Vec<PlayerId> = request.player_pool.into_iter().map(PlayerId::from).collect();
        let pool = self.registry.snapshot(&ids)?;
        let goal_size = request.goal_size;

        tracing::debug!("Snapshotted {} players for cohort of {}", pool.len(), goal_size);

        let matcher = Arc::clone(&self.matcher);
        let result =
            tokio::task::spawn_blocking(move || matcher.match_players(&pool, goal_size, &cancel))
                .await??;

        self.registry.record_match(&result);
        Ok(result)
    }

    /// Apply an outcome once per match id
    pub fn report_outcome(&self, report: &OutcomeReport) -> Result<RatingChange, MatchError> {
        self.registry.report_outcome(report)
    }

    /// Apply an outcome without de-duplication
    pub fn update_ratings(
        &self,
        winner: &PlayerId,
        loser: &PlayerId,
    ) -> Result<RatingChange, MatchError> {
        self.registry.update_ratings(winner, loser)
    }
}

impl Default for MatchService {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Resolution;

    fn register(service: &MatchService, id: &str, skill: i32, latency: u32, mode: &str) {
        service
            .register_player(RegisterPlayerRequest {
                player_id: id.to_string(),
                skill,
                latency_ms: latency,
                mode: mode.to_string(),
                region: "US".to_string(),
            })
            .unwrap();
    }

    fn scenario_service() -> MatchService {
        let service = MatchService::default();
        register(&service, "P1", 1500, 50, "race");
        register(&service, "P2", 1550, 60, "race");
        register(&service, "P3", 1450, 70, "race");
        register(&service, "P4", 1600, 80, "battle");
        service
    }

    fn request(pool: &[&str], goal_size: usize) -> MatchRequest {
        MatchRequest {
            player_pool: pool.iter().map(|s| s.to_string()).collect(),
            goal_size,
        }
    }

    #[tokio::test]
    async fn test_match_players_scenario() {
        let service = scenario_service();
        let result = service
            .match_players(request(&["P1", "P2", "P3", "P4"], 3), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.resolved_by, Resolution::UniformCost);
        assert!(!result.contains(&"P4".into()));
        assert!((result.total_cost - 1.74).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_unknown_player_in_pool() {
        let service = scenario_service();
        let err = service
            .match_players(request(&["P1", "ghost"], 2), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, MatchError::UnknownPlayer(id) if id.as_str() == "ghost"));
    }

    #[tokio::test]
    async fn test_zero_goal_fails_validation() {
        let service = scenario_service();
        let err = service
            .match_players(request(&["P1", "P2"], 0), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, MatchError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_cancelled_before_search() {
        let service = scenario_service();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = service
            .match_players(request(&["P1", "P2", "P3"], 3), cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, MatchError::Cancelled));
    }

    #[tokio::test]
    async fn test_outcome_needs_issued_match() {
        let service = scenario_service();
        let report = OutcomeReport {
            match_id: uuid::Uuid::new_v4(),
            winner_id: "P1".to_string(),
            loser_id: "P2".to_string(),
        };

        assert!(matches!(
            service.report_outcome(&report),
            Err(MatchError::UnknownMatch(_))
        ));
        assert_eq!(service.registry().get(&"P1".into()).unwrap().skill, 1500);
    }

    #[tokio::test]
    async fn test_report_outcome_through_service() {
        let service = scenario_service();
        let result = service
            .match_players(request(&["P1", "P2"], 2), CancellationToken::new())
            .await
            .unwrap();

        let report = OutcomeReport {
            match_id: result.match_id,
            winner_id: "P1".to_string(),
            loser_id: "P2".to_string(),
        };
        let change = service.report_outcome(&report).unwrap();

        assert_eq!(change.winner_delta + change.loser_delta, 0);
        assert!(matches!(
            service.report_outcome(&report),
            Err(MatchError::DuplicateOutcome(_))
        ));
    }
}
