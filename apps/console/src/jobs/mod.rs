//! Job entity family: wire DTOs, normalized view models, and the store.

pub mod dto;
pub mod model;
pub mod store;

pub use model::{JobDetail, JobParsedSummary, JobRequirement, JobSource, JobSummary, SoftSkill};
pub use store::{JobStore, JobTextDraft};
