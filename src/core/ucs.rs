use tokio_util::sync::CancellationToken;

use crate::core::frontier::{BestFirst, SearchBudget, SearchReport};
use crate::core::graph::{CompatibilityGraph, Node};

/// Uniform-cost search for a cohort of exactly `goal_size` players
///
/// The frontier is keyed by path cost alone, so the first goal-size group
/// popped is the cheapest one the search can reach from `start`. On success
/// the outcome holds exactly one group.
pub fn uniform_cost_search(
    graph: &CompatibilityGraph,
    start: Node,
    goal_size: usize,
    budget: SearchBudget,
    cancel: &CancellationToken,
) -> SearchReport {
    let search = BestFirst {
        graph,
        goal_size,
        max_results: 1,
        budget,
        cancel,
    };

    search.run(start, |_| 0.0, |_, _| {})
}
