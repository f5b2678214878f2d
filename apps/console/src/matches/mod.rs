//! Match entity family: wire DTOs, normalized view models, and the store.

pub mod dto;
pub mod model;
pub mod store;

pub use model::{
    MatchCandidate, MatchDetail, MatchResult, MatchSummary, RequirementAnalysis,
    RequirementCoverage,
};
pub use store::MatchStore;
