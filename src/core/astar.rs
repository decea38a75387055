use tokio_util::sync::CancellationToken;

use crate::core::frontier::{BestFirst, PartialGroup, SearchBudget, SearchReport};
use crate::core::graph::{CompatibilityGraph, Node};

/// Informed best-first search that collects several candidate cohorts
///
/// Frontier key is `path_cost + (goal_size - |group|) * avg_step_cost`.
/// The estimate is not a proven lower bound: once real edge costs exceed
/// `avg_step_cost` the search may return a group that is not the cheapest.
/// Treat the results as good candidates, not as an optimum. Candidates come
/// back in discovery order, which is not necessarily cost order.
#[derive(Debug, Clone, Copy)]
pub struct AStarSearch {
    pub avg_step_cost: f64,
    pub max_candidates: usize,
}

impl Default for AStarSearch {
    fn default() -> Self {
        Self {
            avg_step_cost: 0.5,
            max_candidates: 3,
        }
    }
}

impl AStarSearch {
    pub fn new(avg_step_cost: f64, max_candidates: usize) -> Self {
        Self {
            avg_step_cost,
            max_candidates,
        }
    }

    #[inline]
    pub fn heuristic(&self, group: &PartialGroup, goal_size: usize) -> f64 {
        goal_size.saturating_sub(group.len()) as f64 * self.avg_step_cost
    }

    pub fn search(
        &self,
        graph: &CompatibilityGraph,
        start: Node,
        goal_size: usize,
        budget: SearchBudget,
        cancel: &CancellationToken,
    ) -> SearchReport {
        let search = BestFirst {
            graph,
            goal_size,
            max_results: self.max_candidates,
            budget,
            cancel,
        };

        search.run(start, |group| self.heuristic(group, goal_size), |_, _| {})
    }
}

/// Cheapest of a candidate list; ties keep discovery order
pub fn cheapest(candidates: &[PartialGroup]) -> Option<&PartialGroup> {
    candidates
        .iter()
        .reduce(|best, group| {
            if group.path_cost < best.path_cost {
                group
            } else {
                best
            }
        })
}
