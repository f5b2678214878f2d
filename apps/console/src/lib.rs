//! Data-sync core of the Layer1 console: authenticated transport to the
//! matching backend, a shared realtime channel, shape-tolerant payload
//! normalization, per-entity caches with status-gated polling, and the
//! reconciliation rules that bound refetch traffic.
//!
//! The view layer is external; this crate exposes stores and view models
//! and never renders anything.

pub mod backend;
pub mod config;
pub mod errors;
pub mod format;
pub mod jobs;
pub mod matches;
pub mod normalize;
pub mod realtime;
pub mod resumes;
pub mod selection;
pub mod session;
pub mod state;
pub mod subscription;
pub mod sync;
pub mod types;

pub use backend::{BackendClient, FileUpload};
pub use config::Config;
pub use errors::{ConsoleError, Result};
pub use session::Session;
pub use state::ConsoleState;
