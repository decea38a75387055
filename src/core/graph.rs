use std::collections::HashMap;

use crate::core::cost::CostModel;
use crate::error::MatchError;
use crate::models::{PlayerId, PlayerProfile};

/// Index of a player inside a graph snapshot
pub type Node = usize;

/// Weighted adjacency entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: Node,
    pub cost: f64,
}

/// Undirected compatibility graph over one request's pool snapshot
///
/// Nodes are the pool's players in caller order. Edge weights are computed
/// once from the snapshot, so they always agree with the profiles the
/// search reads; a later rating change only affects the next request.
#[derive(Debug, Clone)]
pub struct CompatibilityGraph {
    players: Vec<PlayerProfile>,
    index: HashMap<PlayerId, Node>,
    adjacency: Vec<Vec<Edge>>,
    cost_model: CostModel,
}

impl CompatibilityGraph {
    /// Graph with every player as an isolated node
    pub fn new(players: Vec<PlayerProfile>, cost_model: CostModel) -> Self {
        let index = players
            .iter()
            .enumerate()
            .map(|(node, p)| (p.id.clone(), node))
            .collect();
        let adjacency = vec![Vec::new(); players.len()];

        Self {
            players,
            index,
            adjacency,
            cost_model,
        }
    }

    /// Connect every same-region pair, in pool order
    ///
    /// Players with no same-region partner stay isolated and are
    /// unreachable for graph search.
    pub fn build(players: Vec<PlayerProfile>, cost_model: CostModel) -> Self {
        let mut graph = Self::new(players, cost_model);

        for a in 0..graph.len() {
            for b in (a + 1)..graph.len() {
                if graph.players[a].region() == graph.players[b].region() {
                    graph.add_edge(a, b);
                }
            }
        }

        tracing::debug!(
            "Built compatibility graph: {} players, {} edges",
            graph.len(),
            graph.edge_count()
        );

        graph
    }

    /// Insert both directions with the cost model weight
    pub fn add_edge(&mut self, a: Node, b: Node) {
        if a == b {
            return;
        }
        let cost = self.cost_model.cost(&self.players[a], &self.players[b]);
        self.adjacency[a].push(Edge { to: b, cost });
        self.adjacency[b].push(Edge { to: a, cost });
    }

    /// Id-based variant of [`add_edge`](Self::add_edge) for callers outside the search
    pub fn add_edge_by_id(&mut self, a: &PlayerId, b: &PlayerId) -> Result<(), MatchError> {
        let a = self.node(a)?;
        let b = self.node(b)?;
        self.add_edge(a, b);
        Ok(())
    }

    #[inline]
    pub fn neighbors(&self, node: Node) -> &[Edge] {
        &self.adjacency[node]
    }

    /// Adjacent players and costs, looked up by id
    pub fn neighbors_of(&self, id: &PlayerId) -> Result<Vec<(&PlayerId, f64)>, MatchError> {
        let node = self.node(id)?;
        Ok(self.adjacency[node]
            .iter()
            .map(|edge| (&self.players[edge.to].id, edge.cost))
            .collect())
    }

    pub fn node(&self, id: &PlayerId) -> Result<Node, MatchError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| MatchError::UnknownPlayer(id.clone()))
    }

    #[inline]
    pub fn player(&self, node: Node) -> &PlayerProfile {
        &self.players[node]
    }

    pub fn players(&self) -> &[PlayerProfile] {
        &self.players
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.cost_model
    }

    /// Direct cost between two nodes, regardless of whether an edge exists
    #[inline]
    pub fn cost(&self, a: Node, b: Node) -> f64 {
        self.cost_model.cost(&self.players[a], &self.players[b])
    }

    pub fn ids(&self, nodes: &[Node]) -> Vec<PlayerId> {
        nodes.iter().map(|&n| self.players[n].id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Nodes grouped by region, groups in order of first appearance
    pub fn region_partitions(&self) -> Vec<Vec<Node>> {
        let mut order: Vec<&str> = Vec::new();
        let mut groups: HashMap<&str, Vec<Node>> = HashMap::new();

        for (node, player) in self.players.iter().enumerate() {
            let region = player.region();
            groups
                .entry(region)
                .or_insert_with(|| {
                    order.push(region);
                    Vec::new()
                })
                .push(node);
        }

        order
            .into_iter()
            .filter_map(|region| groups.remove(region))
            .collect()
    }
}
