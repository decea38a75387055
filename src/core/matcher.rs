use std::collections::HashSet;

use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::core::{
    astar::{cheapest, AStarSearch},
    cost::CostModel,
    frontier::{PartialGroup, SearchBudget, SearchReport},
    graph::{CompatibilityGraph, Node},
    greedy::greedy_cohort,
    stable::{candidate_pool, stable_cohort},
    ucs::uniform_cost_search,
};
use crate::error::MatchError;
use crate::models::{CostWeights, MatchResult, MatchStrategy, PlayerProfile, Resolution};

/// Search always starts from the first player in the caller's pool
const START: Node = 0;

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Request validation (goal size, pool size, duplicate ids)
/// 2. Compatibility graph over the pool snapshot (same-region edges)
/// 3. Primary strategy: uniform-cost search, A* or A* + stable merge
/// 4. Greedy fallback per region when the search finds nothing or runs
///    out of budget
#[derive(Debug, Clone)]
pub struct Matcher {
    cost_model: CostModel,
    astar: AStarSearch,
    budget: SearchBudget,
    strategy: MatchStrategy,
    max_goal_size: usize,
}

impl Matcher {
    pub fn new(weights: CostWeights) -> Self {
        Self {
            cost_model: CostModel::new(weights),
            astar: AStarSearch::default(),
            budget: SearchBudget::default(),
            strategy: MatchStrategy::default(),
            max_goal_size: 16,
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(CostWeights::default())
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            cost_model: CostModel::new(settings.cost.weights()),
            astar: AStarSearch::new(settings.search.avg_step_cost, settings.search.candidate_count),
            budget: settings.search.budget(),
            strategy: settings.matching.strategy,
            max_goal_size: settings.matching.max_goal_size,
        }
    }

    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_astar(mut self, astar: AStarSearch) -> Self {
        self.astar = astar;
        self
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.cost_model
    }

    /// Form one cohort of `goal_size` players out of `pool`
    ///
    /// `pool` is a by-value snapshot; nothing here writes player state.
    ///
    /// # Errors
    /// * `InvalidRequest` - zero or oversized goal, duplicate ids
    /// * `InsufficientPlayers` - pool smaller than the goal
    /// * `NoCompatibleGroup` - every strategy came up empty
    /// * `Cancelled` - the token fired during the search
    pub fn match_players(
        &self,
        pool: &[PlayerProfile],
        goal_size: usize,
        cancel: &CancellationToken,
    ) -> Result<MatchResult, MatchError> {
        self.validate(pool, goal_size)?;

        tracing::info!(
            "Matching cohort of {} from pool of {} ({:?})",
            goal_size,
            pool.len(),
            self.strategy
        );

        let graph = CompatibilityGraph::build(pool.to_vec(), self.cost_model);

        match self.primary(&graph, goal_size, cancel) {
            Ok((group, resolution)) => return Ok(self.to_result(&graph, group, resolution)),
            Err(MatchError::SearchBudgetExceeded { expansions }) => {
                tracing::warn!(
                    "Search budget exceeded after {} expansions, falling back to greedy",
                    expansions
                );
            }
            Err(e) if e.is_recoverable() => {
                tracing::debug!("{:?} search found no cohort, falling back to greedy", self.strategy);
            }
            Err(e) => return Err(e),
        }

        if cancel.is_cancelled() {
            return Err(MatchError::Cancelled);
        }

        match self.greedy_fallback(&graph, goal_size) {
            Some(group) => Ok(self.to_result(&graph, group, Resolution::Greedy)),
            None => {
                tracing::info!("No compatible group of {} in pool of {}", goal_size, pool.len());
                Err(MatchError::NoCompatibleGroup { goal_size })
            }
        }
    }

    /// A* candidate cohorts in discovery order, without any fallback
    ///
    /// The first candidate is not necessarily the cheapest.
    pub fn candidate_groups(
        &self,
        pool: &[PlayerProfile],
        goal_size: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<MatchResult>, MatchError> {
        self.validate(pool, goal_size)?;

        let graph = CompatibilityGraph::build(pool.to_vec(), self.cost_model);
        let candidates = self.astar_candidates(&graph, goal_size, cancel)?;

        Ok(candidates
            .into_iter()
            .map(|group| self.to_result(&graph, group, Resolution::AStar))
            .collect())
    }

    fn validate(&self, pool: &[PlayerProfile], goal_size: usize) -> Result<(), MatchError> {
        if goal_size == 0 {
            return Err(MatchError::InvalidRequest("goal size must be at least 1".to_string()));
        }
        if goal_size > self.max_goal_size {
            return Err(MatchError::InvalidRequest(format!(
                "goal size {} exceeds maximum of {}",
                goal_size, self.max_goal_size
            )));
        }
        if pool.len() < goal_size {
            return Err(MatchError::InsufficientPlayers {
                available: pool.len(),
                required: goal_size,
            });
        }

        let mut seen = HashSet::with_capacity(pool.len());
        for player in pool {
            if !seen.insert(&player.id) {
                return Err(MatchError::InvalidRequest(format!(
                    "player {} appears twice in the pool",
                    player.id
                )));
            }
        }

        Ok(())
    }

    fn primary(
        &self,
        graph: &CompatibilityGraph,
        goal_size: usize,
        cancel: &CancellationToken,
    ) -> Result<(PartialGroup, Resolution), MatchError> {
        match self.strategy {
            MatchStrategy::UniformCost => {
                let report = uniform_cost_search(graph, START, goal_size, self.budget, cancel);
                log_report("uniform-cost", &report);

                let group = report
                    .outcome
                    .into_result(goal_size)?
                    .into_iter()
                    .next()
                    .ok_or(MatchError::NoCompatibleGroup { goal_size })?;
                Ok((group, Resolution::UniformCost))
            }
            MatchStrategy::AStar => {
                let candidates = self.astar_candidates(graph, goal_size, cancel)?;
                let best = cheapest(&candidates)
                    .cloned()
                    .ok_or(MatchError::NoCompatibleGroup { goal_size })?;
                Ok((best, Resolution::AStar))
            }
            MatchStrategy::Stable => {
                let candidates = self.astar_candidates(graph, goal_size, cancel)?;
                let pool = candidate_pool(&candidates);
                tracing::debug!(
                    "Stable merge over {} players from {} candidates",
                    pool.len(),
                    candidates.len()
                );

                let group = stable_cohort(graph, &pool, START, goal_size)
                    .ok_or(MatchError::NoCompatibleGroup { goal_size })?;
                Ok((group, Resolution::Stable))
            }
        }
    }

    fn astar_candidates(
        &self,
        graph: &CompatibilityGraph,
        goal_size: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<PartialGroup>, MatchError> {
        let report = self.astar.search(graph, START, goal_size, self.budget, cancel);
        log_report("a-star", &report);
        report.outcome.into_result(goal_size)
    }

    /// Greedy per region partition, start player's region first
    fn greedy_fallback(&self, graph: &CompatibilityGraph, goal_size: usize) -> Option<PartialGroup> {
        graph
            .region_partitions()
            .iter()
            .find_map(|partition| greedy_cohort(graph, partition, goal_size))
    }

    fn to_result(
        &self,
        graph: &CompatibilityGraph,
        group: PartialGroup,
        resolution: Resolution,
    ) -> MatchResult {
        let result = MatchResult::new(graph.ids(&group.members), group.path_cost, resolution);

        tracing::info!(
            "Formed match {} via {:?}: {} players, cost {:.2}",
            result.match_id,
            resolution,
            result.players.len(),
            result.total_cost
        );

        result
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

fn log_report(name: &str, report: &SearchReport) {
    tracing::debug!(
        "{} search: {} pops, {} expansions, {} pushes, peak frontier {}",
        name,
        report.stats.pops,
        report.stats.expansions,
        report.stats.pushes,
        report.stats.peak_frontier
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlayerId;

    fn create_player(id: &str, skill: i32, latency: u32, mode: &str, region: &str) -> PlayerProfile {
        PlayerProfile::new(id, skill, latency, mode, region)
    }

    fn scenario_pool() -> Vec<PlayerProfile> {
        vec![
            create_player("P1", 1500, 50, "race", "US"),
            create_player("P2", 1550, 60, "race", "US"),
            create_player("P3", 1450, 70, "race", "US"),
            create_player("P4", 1600, 80, "battle", "US"),
        ]
    }

    fn ids(result: &MatchResult) -> Vec<&str> {
        let mut ids: Vec<&str> = result.players.iter().map(PlayerId::as_str).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_scenario_uniform_cost() {
        let matcher = Matcher::with_default_weights();
        let result = matcher
            .match_players(&scenario_pool(), 3, &CancellationToken::new())
            .unwrap();

        assert_eq!(ids(&result), vec!["P1", "P2", "P3"]);
        assert_eq!(result.resolved_by, Resolution::UniformCost);
        assert!((result.total_cost - 1.74).abs() < 1e-9);
    }

    #[test]
    fn test_goal_size_one() {
        let matcher = Matcher::with_default_weights();
        let result = matcher
            .match_players(&scenario_pool(), 1, &CancellationToken::new())
            .unwrap();

        assert_eq!(result.players, vec![PlayerId::from("P1")]);
        assert_eq!(result.total_cost, 0.0);
    }

    #[test]
    fn test_empty_pool_is_insufficient() {
        let matcher = Matcher::with_default_weights();
        let err = matcher
            .match_players(&[], 2, &CancellationToken::new())
            .unwrap_err();

        assert!(matches!(
            err,
            MatchError::InsufficientPlayers { available: 0, required: 2 }
        ));
    }

    #[test]
    fn test_zero_goal_rejected() {
        let matcher = Matcher::with_default_weights();
        let err = matcher
            .match_players(&scenario_pool(), 0, &CancellationToken::new())
            .unwrap_err();

        assert!(matches!(err, MatchError::InvalidRequest(_)));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let matcher = Matcher::with_default_weights();
        let mut pool = scenario_pool();
        pool.push(create_player("P2", 1500, 10, "race", "US"));

        let err = matcher
            .match_players(&pool, 2, &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, MatchError::InvalidRequest(_)));
    }

    #[test]
    fn test_split_regions_have_no_group() {
        let matcher = Matcher::with_default_weights();
        let pool = vec![
            create_player("a", 1500, 50, "race", "US"),
            create_player("b", 1510, 50, "race", "US"),
            create_player("c", 1500, 50, "race", "EU"),
            create_player("d", 1510, 50, "race", "EU"),
        ];

        let err = matcher
            .match_players(&pool, 3, &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, MatchError::NoCompatibleGroup { goal_size: 3 }));
    }

    #[test]
    fn test_isolated_start_uses_greedy_in_other_region() {
        let matcher = Matcher::with_default_weights();
        let pool = vec![
            create_player("lonely", 1500, 50, "race", "APAC"),
            create_player("b", 1510, 50, "race", "EU"),
            create_player("c", 1900, 50, "race", "EU"),
            create_player("d", 1520, 50, "race", "EU"),
        ];

        let result = matcher
            .match_players(&pool, 2, &CancellationToken::new())
            .unwrap();

        assert_eq!(result.resolved_by, Resolution::Greedy);
        assert_eq!(ids(&result), vec!["b", "d"]);
    }

    #[test]
    fn test_budget_exhaustion_falls_back_to_greedy() {
        let budget = SearchBudget {
            max_frontier: usize::MAX,
            max_expansions: 1,
            max_duration: None,
        };
        let matcher = Matcher::with_default_weights().with_budget(budget);

        let result = matcher
            .match_players(&scenario_pool(), 3, &CancellationToken::new())
            .unwrap();

        assert_eq!(result.resolved_by, Resolution::Greedy);
        assert_eq!(result.players.len(), 3);
        assert_eq!(result.players[0].as_str(), "P1");
    }

    #[test]
    fn test_cancelled_request_does_not_fall_back() {
        let matcher = Matcher::with_default_weights();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = matcher.match_players(&scenario_pool(), 3, &cancel).unwrap_err();
        assert!(matches!(err, MatchError::Cancelled));
    }

    #[test]
    fn test_astar_strategy_returns_cheapest_candidate() {
        let matcher = Matcher::with_default_weights().with_strategy(MatchStrategy::AStar);
        let result = matcher
            .match_players(&scenario_pool(), 3, &CancellationToken::new())
            .unwrap();

        let candidates = matcher
            .candidate_groups(&scenario_pool(), 3, &CancellationToken::new())
            .unwrap();
        let min = candidates
            .iter()
            .map(|c| c.total_cost)
            .fold(f64::INFINITY, f64::min);

        assert_eq!(result.resolved_by, Resolution::AStar);
        assert_eq!(result.total_cost, min);
    }

    #[test]
    fn test_stable_strategy_forms_full_cohort() {
        let matcher = Matcher::with_default_weights().with_strategy(MatchStrategy::Stable);
        let result = matcher
            .match_players(&scenario_pool(), 3, &CancellationToken::new())
            .unwrap();

        assert_eq!(result.resolved_by, Resolution::Stable);
        assert_eq!(result.players.len(), 3);
        assert_eq!(result.players[0].as_str(), "P1");
    }

    #[test]
    fn test_oversized_goal_rejected() {
        let matcher = Matcher::with_default_weights();
        let pool: Vec<PlayerProfile> = (0..20)
            .map(|i| create_player(&format!("p{}", i), 1500, 40, "race", "US"))
            .collect();

        let err = matcher
            .match_players(&pool, 17, &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, MatchError::InvalidRequest(_)));
    }
}
