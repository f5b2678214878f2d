//! Resume entity family: wire DTOs, normalized view models, and the store.

pub mod dto;
pub mod model;
pub mod store;

pub use model::{CandidateSkill, ResumeDetail, ResumeParsedSummary, ResumeSummary};
pub use store::ResumeStore;
