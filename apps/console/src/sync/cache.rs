//! Shared cache shape for one entity family: the latest list snapshot plus a
//! small per-id detail map, with fetch sequencing and selection tracking.
//!
//! All updates are synchronous critical sections under one mutex; the lock is
//! never held across an await. Issue order and completion order of fetches
//! can differ, so every fetch takes a ticket at issue time and a completion
//! is applied only if no later-issued fetch has been applied already
//! (last-fetch-wins by completion).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::selection;
use crate::sync::poll::next_poll_delay;
use crate::sync::reconcile::RowMeta;
use crate::types::{StatusLike, SummaryRow};

/// Issue-order ticket for one fetch. Obtained before the request goes out,
/// redeemed when the response arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug)]
struct Sequenced<T> {
    value: Option<T>,
    issued: u64,
    applied: u64,
}

impl<T> Default for Sequenced<T> {
    fn default() -> Self {
        Sequenced {
            value: None,
            issued: 0,
            applied: 0,
        }
    }
}

impl<T> Sequenced<T> {
    fn issue(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    fn apply(&mut self, ticket: FetchTicket, value: T) -> bool {
        if ticket.0 <= self.applied {
            return false;
        }
        self.applied = ticket.0;
        self.value = Some(value);
        true
    }
}

#[derive(Debug)]
struct Inner<S, D> {
    list: Sequenced<Vec<S>>,
    details: HashMap<String, Sequenced<D>>,
    selected: Option<String>,
}

pub struct EntityCache<S, D> {
    inner: Mutex<Inner<S, D>>,
}

impl<S, D> Default for EntityCache<S, D> {
    fn default() -> Self {
        EntityCache {
            inner: Mutex::new(Inner {
                list: Sequenced::default(),
                details: HashMap::new(),
                selected: None,
            }),
        }
    }
}

impl<S, D> EntityCache<S, D>
where
    S: SummaryRow + Clone,
    D: StatusLike + Clone,
{
    pub fn new() -> Self {
        EntityCache::default()
    }

    pub fn begin_list_fetch(&self) -> FetchTicket {
        self.lock().list.issue()
    }

    /// Apply a completed list fetch. Returns `false` when a later-issued
    /// fetch was already applied and this result must be discarded. An
    /// applied list also re-reconciles the selection against the new rows.
    pub fn apply_list(&self, ticket: FetchTicket, rows: Vec<S>) -> bool {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if !inner.list.apply(ticket, rows) {
            return false;
        }
        let current = inner.selected.take();
        let rows = inner.list.value.as_deref().unwrap_or(&[]);
        inner.selected = selection::reconcile_selection(current.as_deref(), rows);
        true
    }

    pub fn cached_list(&self) -> Option<Vec<S>> {
        self.lock().list.value.clone()
    }

    pub fn begin_detail_fetch(&self, id: &str) -> FetchTicket {
        self.lock().details.entry(id.to_string()).or_default().issue()
    }

    pub fn apply_detail(&self, id: &str, ticket: FetchTicket, detail: D) -> bool {
        self.lock()
            .details
            .entry(id.to_string())
            .or_default()
            .apply(ticket, detail)
    }

    pub fn cached_detail(&self, id: &str) -> Option<D> {
        self.lock().details.get(id).and_then(|slot| slot.value.clone())
    }

    /// Drop the list snapshot after a successful mutation; the next read
    /// refetches. Details and sequencing survive.
    pub fn invalidate_list(&self) {
        self.lock().list.value = None;
    }

    /// Remove one id after a successful delete: out of the list, out of the
    /// detail map, and off the selection (which then falls back per the
    /// selection rules).
    pub fn remove(&self, id: &str) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if let Some(rows) = inner.list.value.as_mut() {
            rows.retain(|row| row.id() != id);
        }
        inner.details.remove(id);
        if inner.selected.as_deref() == Some(id) {
            let rows = inner.list.value.as_deref().unwrap_or(&[]);
            inner.selected = selection::reconcile_selection(None, rows);
        }
    }

    /// Select an id. Resolved against the cached list when one exists (an
    /// absent id resolves to no selection); accepted as-is on a cold cache.
    pub fn select(&self, id: Option<&str>) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.selected = match (id, inner.list.value.as_deref()) {
            (Some(id), Some(rows)) => selection::resolve_requested(id, rows),
            (Some(id), None) => Some(id.to_string()),
            (None, _) => None,
        };
    }

    pub fn selected_id(&self) -> Option<String> {
        self.lock().selected.clone()
    }

    /// Freshness metadata for the cached list row with this id.
    pub fn row_meta(&self, id: &str) -> Option<RowMeta> {
        self.lock()
            .list
            .value
            .as_deref()?
            .iter()
            .find(|row| row.id() == id)
            .map(RowMeta::of_row)
    }

    /// True when the cached detail for this id is absent or still moving.
    pub fn detail_pending(&self, id: &str) -> bool {
        match self.lock().details.get(id).and_then(|slot| slot.value.as_ref()) {
            Some(detail) => !detail.is_terminal(),
            None => true,
        }
    }

    /// Poll delay over everything this cache watches: the list rows plus the
    /// selected detail. A cold or invalidated list counts as pending, so a
    /// mutation that dropped the snapshot gets refetched on the next tick.
    pub fn poll_delay(&self, interval: Duration) -> Option<Duration> {
        let inner = self.lock();
        let Some(rows) = inner.list.value.as_deref() else {
            return Some(interval);
        };
        let list_delay = next_poll_delay(rows.iter(), interval);
        let detail_pending = inner
            .selected
            .as_deref()
            .map(|id| match inner.details.get(id).and_then(|slot| slot.value.as_ref()) {
                Some(detail) => !detail.is_terminal(),
                None => false,
            })
            .unwrap_or(false);
        if detail_pending {
            Some(interval)
        } else {
            list_delay
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<S, D>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
