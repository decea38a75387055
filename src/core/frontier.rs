use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::core::graph::{CompatibilityGraph, Node};
use crate::error::MatchError;

/// A cohort under construction
///
/// `path_cost` is the sum of the edges added in construction order, not
/// the full pairwise cost of the member set.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialGroup {
    pub members: Vec<Node>,
    pub path_cost: f64,
}

impl PartialGroup {
    pub fn singleton(start: Node) -> Self {
        Self {
            members: vec![start],
            path_cost: 0.0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[inline]
    pub fn last(&self) -> Option<Node> {
        self.members.last().copied()
    }

    #[inline]
    pub fn contains(&self, node: Node) -> bool {
        self.members.contains(&node)
    }

    pub fn extended(&self, node: Node, edge_cost: f64) -> Self {
        let mut members = Vec::with_capacity(self.members.len() + 1);
        members.extend_from_slice(&self.members);
        members.push(node);

        Self {
            members,
            path_cost: self.path_cost + edge_cost,
        }
    }

    /// Order-independent membership key
    pub fn signature(&self) -> Vec<Node> {
        let mut signature = self.members.clone();
        signature.sort_unstable();
        signature
    }
}

/// Resource bounds for a single search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchBudget {
    pub max_frontier: usize,
    pub max_expansions: usize,
    pub max_duration: Option<Duration>,
}

impl SearchBudget {
    pub fn unlimited() -> Self {
        Self {
            max_frontier: usize::MAX,
            max_expansions: usize::MAX,
            max_duration: None,
        }
    }
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self {
            max_frontier: 200_000,
            max_expansions: 50_000,
            max_duration: Some(Duration::from_millis(250)),
        }
    }
}

/// How a search ended
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Goal-size groups in discovery order
    Found(Vec<PartialGroup>),
    Exhausted,
    BudgetExceeded { expansions: usize },
    Cancelled,
}

impl SearchOutcome {
    pub fn into_result(self, goal_size: usize) -> Result<Vec<PartialGroup>, MatchError> {
        match self {
            SearchOutcome::Found(groups) => Ok(groups),
            SearchOutcome::Exhausted => Err(MatchError::NoCompatibleGroup { goal_size }),
            SearchOutcome::BudgetExceeded { expansions } => {
                Err(MatchError::SearchBudgetExceeded { expansions })
            }
            SearchOutcome::Cancelled => Err(MatchError::Cancelled),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub pops: usize,
    pub expansions: usize,
    pub pushes: usize,
    pub peak_frontier: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
}

/// Heap entry; ordered so that `BinaryHeap` pops the lowest priority first
///
/// Ties on priority fall back to the canonical signature and then to the
/// insertion sequence, which keeps the pop order total and deterministic.
#[derive(Debug)]
struct FrontierEntry {
    priority: f64,
    signature: Vec<Node>,
    seq: u64,
    group: PartialGroup,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.signature.cmp(&self.signature))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

/// Parameters shared by the uniform-cost and A* searches
pub(crate) struct BestFirst<'a> {
    pub graph: &'a CompatibilityGraph,
    pub goal_size: usize,
    pub max_results: usize,
    pub budget: SearchBudget,
    pub cancel: &'a CancellationToken,
}

impl BestFirst<'_> {
    /// Best-first search over partial groups grown from `start`
    ///
    /// `heuristic` is added to the path cost to form the frontier key.
    /// `on_pop` sees every popped key, including discarded duplicates.
    pub fn run<H, O>(&self, start: Node, heuristic: H, mut on_pop: O) -> SearchReport
    where
        H: Fn(&PartialGroup) -> f64,
        O: FnMut(f64, &PartialGroup),
    {
        let mut stats = SearchStats::default();

        if self.goal_size == 0 || start >= self.graph.len() || self.max_results == 0 {
            return SearchReport {
                outcome: SearchOutcome::Exhausted,
                stats,
            };
        }

        let started = Instant::now();
        let mut frontier = BinaryHeap::new();
        // Membership plus end player fully determines how a group can grow
        let mut closed: HashSet<(Vec<Node>, Node)> = HashSet::new();
        let mut collected: HashSet<Vec<Node>> = HashSet::new();
        let mut results = Vec::new();
        let mut seq = 0u64;

        let root = PartialGroup::singleton(start);
        frontier.push(FrontierEntry {
            priority: heuristic(&root),
            signature: root.signature(),
            seq,
            group: root,
        });
        stats.pushes = 1;
        stats.peak_frontier = 1;

        let outcome = 'search: loop {
            let Some(entry) = frontier.pop() else {
                break 'search SearchOutcome::Exhausted;
            };

            if self.cancel.is_cancelled() {
                break 'search SearchOutcome::Cancelled;
            }

            stats.pops += 1;
            on_pop(entry.priority, &entry.group);

            let Some(last) = entry.group.last() else {
                continue;
            };

            // Complete cohorts are collected even when the budget just ran out
            if entry.group.len() == self.goal_size {
                if collected.insert(entry.signature) {
                    results.push(entry.group);
                    if results.len() >= self.max_results {
                        break 'search SearchOutcome::Found(Vec::new());
                    }
                }
                continue;
            }

            if !closed.insert((entry.signature, last)) {
                continue;
            }

            if self.out_of_budget(stats.expansions, started) {
                break 'search SearchOutcome::BudgetExceeded {
                    expansions: stats.expansions,
                };
            }

            let group = entry.group;
            stats.expansions += 1;

            for edge in self.graph.neighbors(last) {
                if group.contains(edge.to) {
                    continue;
                }
                let next = group.extended(edge.to, edge.cost);
                let signature = next.signature();
                let done = if next.len() == self.goal_size {
                    collected.contains(&signature)
                } else {
                    closed.contains(&(signature.clone(), edge.to))
                };
                if done {
                    continue;
                }

                seq += 1;
                frontier.push(FrontierEntry {
                    priority: next.path_cost + heuristic(&next),
                    signature,
                    seq,
                    group: next,
                });
                stats.pushes += 1;
            }

            stats.peak_frontier = stats.peak_frontier.max(frontier.len());
            if frontier.len() > self.budget.max_frontier {
                break 'search SearchOutcome::BudgetExceeded {
                    expansions: stats.expansions,
                };
            }
        };

        // Groups already collected outrank an early stop
        let outcome = match outcome {
            SearchOutcome::Cancelled => SearchOutcome::Cancelled,
            _ if !results.is_empty() => SearchOutcome::Found(results),
            other => other,
        };

        SearchReport { outcome, stats }
    }

    fn out_of_budget(&self, expansions: usize, started: Instant) -> bool {
        expansions >= self.budget.max_expansions
            || self
                .budget
                .max_duration
                .is_some_and(|limit| started.elapsed() >= limit)
    }
}
