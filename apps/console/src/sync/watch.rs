//! Per-family watcher task: subscribes to the realtime channel, drives the
//! reconciliation machine, and schedules polls when nothing is pushed.
//!
//! At most one fetch per family is in flight at any time; the machine folds
//! event bursts into a single owed catch-up fetch. A cancelled watcher drops
//! its in-flight fetch before the result is applied, so unmount-style
//! teardown never writes the cache.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::realtime::{EntityKind, RealtimeManager};
use crate::session::Session;
use crate::sync::reconcile::{event_is_fresh, FetchMachine, RowMeta};

/// What a watcher needs from an entity store.
#[async_trait]
pub trait WatchTarget: Send + Sync + 'static {
    fn kind(&self) -> EntityKind;

    /// Freshness metadata of the cached list row for an id, if any.
    fn row_meta(&self, id: &str) -> Option<RowMeta>;

    fn selected_id(&self) -> Option<String>;

    /// True when the cached detail for this id is absent or non-terminal.
    fn detail_pending(&self, id: &str) -> bool;

    /// Poll delay from the current cache contents.
    fn poll_delay(&self, interval: Duration) -> Option<Duration>;

    /// Refetch the list and apply it to the cache.
    async fn refresh_list(&self, session: &Session) -> Result<()>;

    /// Refetch one detail and apply it to the cache.
    async fn refresh_detail(&self, id: &str, session: &Session) -> Result<()>;
}

/// Spawn the watcher for one entity family. Runs until the token fires.
pub fn spawn_watcher<T: WatchTarget>(
    target: Arc<T>,
    realtime: Arc<RealtimeManager>,
    session: Session,
    poll_interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let events = realtime.subscribe();
    tokio::spawn(run(target, events, session, poll_interval, cancel))
}

async fn run<T: WatchTarget>(
    target: Arc<T>,
    mut events: broadcast::Receiver<crate::realtime::UpdateEvent>,
    session: Session,
    poll_interval: Duration,
    cancel: CancellationToken,
) {
    let kind = target.kind();
    let mut machine = FetchMachine::new();
    let mut inflight: Option<JoinHandle<()>> = None;
    // Detail refetch owed by events folded into the catch-up fetch.
    let mut owed_detail: Option<String> = None;
    let mut events_open = true;

    // Initial refresh so the cache is warm before the first event.
    if machine.note_event() {
        inflight = Some(start_fetch(&target, &session, &cancel, None));
    }

    let mut next_poll = tokio::time::Instant::now() + poll_interval;
    loop {
        let fetch_running = inflight.is_some();
        tokio::select! {
            _ = cancel.cancelled() => break,

            _ = async { inflight.as_mut().expect("inflight checked").await.ok() },
                if fetch_running =>
            {
                inflight = None;
                if machine.note_fetch_complete() {
                    inflight = Some(start_fetch(&target, &session, &cancel, owed_detail.take()));
                }
            }

            event = events.recv(), if events_open => match event {
                Ok(event) if event.kind == kind => {
                    let meta = target.row_meta(&event.payload.id);
                    if !event_is_fresh(&event.payload, meta.as_ref()) {
                        debug!(?kind, id = %event.payload.id, "stale event discarded");
                        continue;
                    }
                    let detail = target
                        .selected_id()
                        .filter(|selected| *selected == event.payload.id);
                    if machine.note_event() {
                        inflight = Some(start_fetch(&target, &session, &cancel, detail));
                    } else if detail.is_some() {
                        owed_detail = detail;
                    }
                }
                Ok(_) => {} // another family's event
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Events were dropped; whatever they said, a refetch
                    // covers it.
                    warn!(?kind, skipped, "realtime receiver lagged");
                    if machine.note_event() {
                        let detail = target.selected_id();
                        inflight = Some(start_fetch(&target, &session, &cancel, detail));
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(?kind, "realtime channel closed; polling only");
                    events_open = false;
                }
            },

            // The deadline survives unrelated wakeups (another family's
            // event must not reset the countdown), and the policy is
            // re-consulted on every tick so a cache that became pending
            // again without an event resumes refreshing.
            _ = tokio::time::sleep_until(next_poll), if !fetch_running => {
                next_poll = tokio::time::Instant::now() + poll_interval;
                if target.poll_delay(poll_interval).is_some() && machine.note_event() {
                    let detail = target
                        .selected_id()
                        .filter(|id| target.detail_pending(id));
                    inflight = Some(start_fetch(&target, &session, &cancel, detail));
                }
            }
        }
    }

    if let Some(task) = inflight {
        task.abort();
    }
}

fn start_fetch<T: WatchTarget>(
    target: &Arc<T>,
    session: &Session,
    cancel: &CancellationToken,
    detail: Option<String>,
) -> JoinHandle<()> {
    let target = Arc::clone(target);
    let session = session.clone();
    let cancel = cancel.clone();
    tokio::spawn(async move {
        let work = async {
            if let Err(err) = target.refresh_list(&session).await {
                warn!(kind = ?target.kind(), error = %err, "list refresh failed");
            }
            if let Some(id) = detail {
                if let Err(err) = target.refresh_detail(&id, &session).await {
                    warn!(kind = ?target.kind(), %id, error = %err, "detail refresh failed");
                }
            }
        };
        tokio::select! {
            // Cancellation drops the refresh mid-flight; nothing is applied.
            _ = cancel.cancelled() => {}
            _ = work => {}
        }
    })
}
