use crate::core::frontier::PartialGroup;
use crate::core::graph::{CompatibilityGraph, Node};

/// Nearest-neighbour cohort builder
///
/// Starts from the first candidate and keeps appending the unclaimed
/// candidate closest to the last member. Ties go to the earlier candidate.
/// Needs no edges, only the cost model, so it works where graph search
/// found nothing. Returns `None` only when there are too few candidates.
pub fn greedy_cohort(
    graph: &CompatibilityGraph,
    candidates: &[Node],
    goal_size: usize,
) -> Option<PartialGroup> {
    if goal_size == 0 || candidates.len() < goal_size {
        return None;
    }

    let mut group = PartialGroup::singleton(candidates[0]);
    let mut remaining: Vec<Node> = candidates[1..].to_vec();

    while group.len() < goal_size {
        let last = group.last()?;

        let mut best: Option<(usize, f64)> = None;
        for (pos, &node) in remaining.iter().enumerate() {
            let cost = graph.cost(last, node);
            if best.map_or(true, |(_, best_cost)| cost < best_cost) {
                best = Some((pos, cost));
            }
        }

        let (pos, cost) = best?;
        let node = remaining.remove(pos);
        group = group.extended(node, cost);
    }

    Some(group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cost::CostModel;
    use crate::models::PlayerProfile;

    fn graph() -> CompatibilityGraph {
        CompatibilityGraph::new(
            vec![
                PlayerProfile::new("a", 1500, 0, "race", "US"),
                PlayerProfile::new("b", 1900, 0, "race", "US"),
                PlayerProfile::new("c", 1600, 0, "race", "US"),
                PlayerProfile::new("d", 1400, 0, "race", "US"),
                PlayerProfile::new("e", 1700, 0, "race", "US"),
            ],
            CostModel::default(),
        )
    }

    #[test]
    fn test_greedy_follows_nearest_neighbour() {
        let graph = graph();
        let group = greedy_cohort(&graph, &[0, 1, 2, 3, 4], 4).unwrap();

        // a(1500) -> c(1600), d(1400) tie at 1.0 and c comes first in input order
        // c(1600) -> e(1700) -> b(1900)
        assert_eq!(group.members, vec![0, 2, 4, 1]);
        assert!((group.path_cost - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_greedy_ignores_missing_edges() {
        let graph = graph();
        assert_eq!(graph.edge_count(), 0);

        let group = greedy_cohort(&graph, &[3, 0], 2).unwrap();
        assert_eq!(group.members, vec![3, 0]);
    }

    #[test]
    fn test_greedy_needs_enough_candidates() {
        let graph = graph();

        assert!(greedy_cohort(&graph, &[0, 1], 3).is_none());
        assert!(greedy_cohort(&graph, &[], 1).is_none());
        assert!(greedy_cohort(&graph, &[0, 1], 0).is_none());
    }

    #[test]
    fn test_greedy_goal_one_is_first_candidate() {
        let graph = graph();
        let group = greedy_cohort(&graph, &[4, 1], 1).unwrap();

        assert_eq!(group.members, vec![4]);
        assert_eq!(group.path_cost, 0.0);
    }
}
