// Service exports
pub mod matchmaker;
pub mod registry;

pub use matchmaker::MatchService;
pub use registry::PlayerRegistry;
