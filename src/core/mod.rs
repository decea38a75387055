// Core algorithm exports
pub mod astar;
pub mod cost;
pub mod frontier;
pub mod graph;
pub mod greedy;
pub mod matcher;
pub mod rating;
pub mod stable;
pub mod ucs;

pub use astar::AStarSearch;
pub use cost::CostModel;
pub use frontier::{PartialGroup, SearchBudget, SearchOutcome, SearchReport, SearchStats};
pub use graph::{CompatibilityGraph, Edge, Node};
pub use greedy::greedy_cohort;
pub use matcher::Matcher;
pub use rating::RatingUpdater;
pub use stable::{stable_cohort, stable_pairs, StablePair};
pub use ucs::uniform_cost_search;
