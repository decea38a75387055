use std::collections::VecDeque;

use crate::core::frontier::PartialGroup;
use crate::core::graph::{CompatibilityGraph, Node};

/// Tentative engagement produced by deferred acceptance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StablePair {
    pub receiver: Node,
    pub proposer: Node,
    pub cost: f64,
}

/// Union of candidate groups, in order of first appearance
pub fn candidate_pool(groups: &[PartialGroup]) -> Vec<Node> {
    let mut pool = Vec::new();
    for node in groups.iter().flat_map(|g| g.members.iter().copied()) {
        if !pool.contains(&node) {
            pool.push(node);
        }
    }
    pool
}

/// For each pool member, every other member ordered by ascending cost
///
/// Entries are positions into `pool`. Ties keep pool order.
pub fn preference_lists(graph: &CompatibilityGraph, pool: &[Node]) -> Vec<Vec<usize>> {
    (0..pool.len())
        .map(|me| {
            let mut prefs: Vec<usize> = (0..pool.len()).filter(|&other| other != me).collect();
            prefs.sort_by(|&a, &b| {
                graph
                    .cost(pool[me], pool[a])
                    .total_cmp(&graph.cost(pool[me], pool[b]))
            });
            prefs
        })
        .collect()
}

/// Deferred acceptance over a single pool
///
/// Every member proposes down its preference list; every member also holds
/// the best proposal it has received so far. A proposer that runs out of
/// options stays unpaired, which bounds the run at `n * (n - 1)` proposals.
/// Pairs come back in receiver pool order.
pub fn stable_pairs(graph: &CompatibilityGraph, pool: &[Node]) -> Vec<StablePair> {
    let n = pool.len();
    let prefs = preference_lists(graph, pool);

    // rank[r][p]: how much receiver r likes proposer p, lower is better
    let mut rank = vec![vec![usize::MAX; n]; n];
    for (r, list) in prefs.iter().enumerate() {
        for (position, &p) in list.iter().enumerate() {
            rank[r][p] = position;
        }
    }

    let mut next_choice = vec![0usize; n];
    let mut held: Vec<Option<usize>> = vec![None; n];
    let mut free: VecDeque<usize> = (0..n).collect();

    while let Some(proposer) = free.pop_front() {
        while next_choice[proposer] < prefs[proposer].len() {
            let receiver = prefs[proposer][next_choice[proposer]];
            next_choice[proposer] += 1;

            match held[receiver] {
                None => {
                    held[receiver] = Some(proposer);
                    break;
                }
                Some(current) if rank[receiver][proposer] < rank[receiver][current] => {
                    held[receiver] = Some(proposer);
                    free.push_back(current);
                    break;
                }
                Some(_) => {}
            }
        }
    }

    held.iter()
        .enumerate()
        .filter_map(|(receiver, proposer)| {
            proposer.map(|p| StablePair {
                receiver: pool[receiver],
                proposer: pool[p],
                cost: graph.cost(pool[receiver], pool[p]),
            })
        })
        .collect()
}

/// Merge stable pairs into a cohort of `goal_size` around `anchor`
///
/// Pairs touching the cohort are taken cheapest first and contribute their
/// missing members (receiver first). When no such pair is left, the pool
/// member closest to the last cohort member joins, ties in pool order.
pub fn stable_cohort(
    graph: &CompatibilityGraph,
    pool: &[Node],
    anchor: Node,
    goal_size: usize,
) -> Option<PartialGroup> {
    if goal_size == 0 || pool.len() < goal_size || !pool.contains(&anchor) {
        return None;
    }

    let mut pairs = stable_pairs(graph, pool);
    pairs.sort_by(|a, b| a.cost.total_cmp(&b.cost));

    let mut cohort = vec![anchor];
    let mut used = vec![false; pairs.len()];

    while cohort.len() < goal_size {
        let pick = (0..pairs.len()).find(|&i| {
            let (r, p) = (pairs[i].receiver, pairs[i].proposer);
            !used[i]
                && (cohort.contains(&r) || cohort.contains(&p))
                && !(cohort.contains(&r) && cohort.contains(&p))
        });

        if let Some(i) = pick {
            used[i] = true;
            for member in [pairs[i].receiver, pairs[i].proposer] {
                if cohort.len() < goal_size && !cohort.contains(&member) {
                    cohort.push(member);
                }
            }
            continue;
        }

        let last = *cohort.last()?;
        let nearest = pool
            .iter()
            .copied()
            .filter(|node| !cohort.contains(node))
            .reduce(|best, node| {
                if graph.cost(last, node) < graph.cost(last, best) {
                    node
                } else {
                    best
                }
            })?;
        cohort.push(nearest);
    }

    let path_cost = cohort.windows(2).map(|w| graph.cost(w[0], w[1])).sum();
    Some(PartialGroup {
        members: cohort,
        path_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cost::CostModel;
    use crate::models::PlayerProfile;

    fn graph(skills: &[i32]) -> CompatibilityGraph {
        let players = skills
            .iter()
            .enumerate()
            .map(|(i, &skill)| PlayerProfile::new(format!("p{}", i), skill, 40, "race", "US"))
            .collect();
        CompatibilityGraph::build(players, CostModel::default())
    }

    #[test]
    fn test_candidate_pool_dedupes_in_order() {
        let groups = vec![
            PartialGroup {
                members: vec![0, 2, 1],
                path_cost: 1.0,
            },
            PartialGroup {
                members: vec![0, 3, 2],
                path_cost: 2.0,
            },
        ];
        assert_eq!(candidate_pool(&groups), vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_preferences_sorted_by_cost() {
        let graph = graph(&[1500, 1900, 1550, 1300]);
        let prefs = preference_lists(&graph, &[0, 1, 2, 3]);

        assert_eq!(prefs[0], vec![2, 3, 1]);
        assert_eq!(prefs[1], vec![2, 0, 3]);
    }

    #[test]
    fn test_pairing_is_stable() {
        let skills = [1500, 1910, 1540, 1320, 1705, 1490, 1650];
        let graph = graph(&skills);
        let pool: Vec<Node> = (0..skills.len()).collect();
        let prefs = preference_lists(&graph, &pool);
        let pairs = stable_pairs(&graph, &pool);

        let rank = |who: usize, other: usize| prefs[who].iter().position(|&x| x == other).unwrap();
        let receiver_of = |p: usize| pairs.iter().find(|pair| pair.proposer == p).map(|pair| pair.receiver);
        let proposer_of = |r: usize| pairs.iter().find(|pair| pair.receiver == r).map(|pair| pair.proposer);

        for p in 0..pool.len() {
            for r in 0..pool.len() {
                if p == r || receiver_of(p) == Some(r) {
                    continue;
                }
                let p_prefers = receiver_of(p).map_or(true, |cur| rank(p, r) < rank(p, cur));
                let r_prefers = proposer_of(r).map_or(true, |cur| rank(r, p) < rank(r, cur));
                assert!(!(p_prefers && r_prefers), "blocking pair ({}, {})", p, r);
            }
        }
    }

    #[test]
    fn test_pairing_is_one_to_one() {
        let graph = graph(&[1500, 1910, 1540, 1320, 1705]);
        let pairs = stable_pairs(&graph, &[0, 1, 2, 3, 4]);

        let mut proposers: Vec<Node> = pairs.iter().map(|p| p.proposer).collect();
        proposers.sort_unstable();
        proposers.dedup();
        assert_eq!(proposers.len(), pairs.len());
        assert!(pairs.iter().all(|p| p.proposer != p.receiver));
    }

    #[test]
    fn test_two_players_pair_up() {
        let graph = graph(&[1500, 1600]);
        let pairs = stable_pairs(&graph, &[0, 1]);

        assert_eq!(pairs.len(), 2);
        assert_eq!((pairs[0].receiver, pairs[0].proposer), (0, 1));
    }

    #[test]
    fn test_stable_cohort_grows_from_anchor() {
        let graph = graph(&[1500, 1900, 1520, 1480, 1950]);
        let cohort = stable_cohort(&graph, &[0, 1, 2, 3, 4], 0, 3).unwrap();

        assert_eq!(cohort.len(), 3);
        assert_eq!(cohort.members[0], 0);
        let mut sorted = cohort.signature();
        sorted.dedup();
        assert_eq!(sorted.len(), 3);
        // Pair (0, 2) first, then the unpaired 1480 player as nearest to 1520
        assert_eq!(cohort.members, vec![0, 2, 3]);
    }

    #[test]
    fn test_stable_cohort_rejects_bad_input() {
        let graph = graph(&[1500, 1600, 1700]);

        assert!(stable_cohort(&graph, &[0, 1], 0, 3).is_none());
        assert!(stable_cohort(&graph, &[1, 2], 0, 2).is_none());
        assert_eq!(stable_cohort(&graph, &[0, 1], 0, 1).unwrap().members, vec![0]);
    }
}
