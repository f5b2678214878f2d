//! Data synchronization policy: when to fetch, what to keep, what to throw
//! away. The entity stores own the fetching itself; everything here is the
//! rule set around it.

pub mod cache;
pub mod poll;
pub mod reconcile;
pub mod watch;

pub use cache::{EntityCache, FetchTicket};
pub use poll::next_poll_delay;
pub use reconcile::{event_is_fresh, FetchMachine, FetchState, RowMeta};
pub use watch::{spawn_watcher, WatchTarget};
