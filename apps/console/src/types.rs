use std::fmt;

use serde::{Deserialize, Serialize};

/// Processing state of a resume or job. Unrecognized wire values decode to
/// `Unknown` instead of failing the whole payload, and `Unknown` is treated
/// as still-in-progress so polling keeps watching it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Queued,
    Processing,
    Ready,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

impl EntityStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, EntityStatus::Ready | EntityStatus::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityStatus::Queued => "queued",
            EntityStatus::Processing => "processing",
            EntityStatus::Ready => "ready",
            EntityStatus::Error => "error",
            EntityStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a match computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Queued,
    Running,
    Completed,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl MatchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Queued => "queued",
            MatchStatus::Running => "running",
            MatchStatus::Completed => "completed",
            MatchStatus::Failed => "failed",
            MatchStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything with a terminal/non-terminal distinction. Poll scheduling only
/// needs this one bit.
pub trait StatusLike {
    fn is_terminal(&self) -> bool;
}

impl StatusLike for EntityStatus {
    fn is_terminal(&self) -> bool {
        EntityStatus::is_terminal(*self)
    }
}

impl StatusLike for MatchStatus {
    fn is_terminal(&self) -> bool {
        MatchStatus::is_terminal(*self)
    }
}

impl<T: StatusLike> StatusLike for &T {
    fn is_terminal(&self) -> bool {
        (*self).is_terminal()
    }
}

/// Cache entries addressable by backend id.
pub trait HasId {
    fn id(&self) -> &str;
}

/// List-row view model. Exposes the metadata the sync layer needs:
/// identity for selection, terminality for polling, and the
/// `(updated_at, status, title)` triple for freshness comparison
/// against realtime events.
pub trait SummaryRow: HasId + StatusLike {
    fn status_str(&self) -> &'static str;
    fn updated_at(&self) -> Option<&str>;
    fn title(&self) -> Option<&str> {
        None
    }
}

/// Acknowledgment returned by create endpoints (upload, job submission,
/// match request). The full record arrives later through list refreshes.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReceipt {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}
