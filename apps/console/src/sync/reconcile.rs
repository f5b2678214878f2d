//! Reconciliation rules for realtime events and overlapping fetches.
//!
//! Two independent pieces:
//! * [`FetchMachine`] serializes refetches for one watched key. A burst of N
//!   events while a fetch is in flight collapses into at most one catch-up
//!   fetch, so the in-flight window never costs more than 2 fetches total.
//! * [`event_is_fresh`] decides whether an event says anything the cache does
//!   not already know. Stale events are discarded silently.

use chrono::{DateTime, FixedOffset};

use crate::realtime::UpdatePayload;
use crate::types::SummaryRow;

/// Refetch state for one watched key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Fetching,
    /// A fetch is in flight and at least one fresh event arrived since it
    /// started. Exactly one more fetch is owed when it completes.
    StaleWhileFetching,
}

/// The per-key state machine. Callers report inputs (`note_event`,
/// `note_fetch_complete`) and act on the returned decision; the machine
/// itself never issues fetches.
#[derive(Debug, Default)]
pub struct FetchMachine {
    state: FetchState,
}

impl FetchMachine {
    pub fn new() -> Self {
        FetchMachine::default()
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    /// A fresh event (or poll tick) arrived. Returns `true` when the caller
    /// should start a fetch now; `false` means one is already in flight and
    /// the event has been folded into the owed catch-up.
    pub fn note_event(&mut self) -> bool {
        match self.state {
            FetchState::Idle => {
                self.state = FetchState::Fetching;
                true
            }
            FetchState::Fetching => {
                self.state = FetchState::StaleWhileFetching;
                false
            }
            FetchState::StaleWhileFetching => false,
        }
    }

    /// The in-flight fetch completed (the result has been applied or
    /// discarded). Returns `true` when the caller owes the one catch-up fetch.
    pub fn note_fetch_complete(&mut self) -> bool {
        match self.state {
            FetchState::StaleWhileFetching => {
                self.state = FetchState::Fetching;
                true
            }
            _ => {
                self.state = FetchState::Idle;
                false
            }
        }
    }
}

/// Cached metadata an event is compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMeta {
    pub status: String,
    pub updated_at: Option<String>,
    pub title: Option<String>,
}

impl RowMeta {
    pub fn of_row<S: SummaryRow>(row: &S) -> Self {
        RowMeta {
            status: row.status_str().to_string(),
            updated_at: row.updated_at().map(str::to_string),
            title: row.title().map(str::to_string),
        }
    }
}

/// Whether an event carries news relative to the cached row.
///
/// Fresh when the cache has no row for the id, when the event's status or
/// title differs from the cached one, or when its timestamp is strictly
/// newer. Equal timestamps do not make an event stale on their own (some
/// event sources omit monotonic timestamps), but an event whose timestamp,
/// status and title all match the cache says nothing new. Timestamps that
/// are absent or unparseable are treated as fresh.
pub fn event_is_fresh(event: &UpdatePayload, cached: Option<&RowMeta>) -> bool {
    let Some(cached) = cached else {
        // Unknown id: a row the cache has never seen. Fetch.
        return true;
    };
    if let Some(status) = &event.status {
        if *status != cached.status {
            return true;
        }
    }
    if let Some(title) = &event.title {
        if Some(title) != cached.title.as_ref() {
            return true;
        }
    }
    match (parse_ts(event.updated_at.as_deref()), parse_ts(cached.updated_at.as_deref())) {
        (Some(event_ts), Some(cached_ts)) => event_ts > cached_ts,
        // Either side lacks a usable timestamp: err on the side of fetching.
        _ => true,
    }
}

fn parse_ts(value: Option<&str>) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value?).ok()
}
