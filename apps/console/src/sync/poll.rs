//! Polling policy. The scheduling mechanism lives in the watcher loop; this
//! module only answers "is another poll due, and when".

use std::time::Duration;

use crate::types::StatusLike;

/// Next poll delay for a set of statuses: the configured interval while any
/// status can still change, nothing once every status is terminal. An empty
/// set has nothing to watch and does not poll. The same rule applies to a
/// single detail by passing its status alone.
pub fn next_poll_delay<S, I>(statuses: I, interval: Duration) -> Option<Duration>
where
    S: StatusLike,
    I: IntoIterator<Item = S>,
{
    let pending = statuses.into_iter().any(|status| !status.is_terminal());
    if pending {
        Some(interval)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntityStatus, MatchStatus};

    const INTERVAL: Duration = Duration::from_secs(5);

    #[test]
    fn all_terminal_means_no_further_poll() {
        let statuses = [EntityStatus::Ready, EntityStatus::Error];
        assert_eq!(next_poll_delay(statuses, INTERVAL), None);
        let statuses = [MatchStatus::Completed, MatchStatus::Failed];
        assert_eq!(next_poll_delay(statuses, INTERVAL), None);
    }

    #[test]
    fn one_pending_entry_keeps_polling() {
        let statuses = [
            EntityStatus::Ready,
            EntityStatus::Processing,
            EntityStatus::Error,
        ];
        assert_eq!(next_poll_delay(statuses, INTERVAL), Some(INTERVAL));
        let statuses = [MatchStatus::Completed, MatchStatus::Queued];
        assert_eq!(next_poll_delay(statuses, INTERVAL), Some(INTERVAL));
    }

    #[test]
    fn unknown_status_counts_as_pending() {
        assert_eq!(
            next_poll_delay([EntityStatus::Unknown], INTERVAL),
            Some(INTERVAL)
        );
    }

    #[test]
    fn empty_list_does_not_poll() {
        let statuses: [EntityStatus; 0] = [];
        assert_eq!(next_poll_delay(statuses, INTERVAL), None);
    }

    #[test]
    fn single_detail_status_follows_the_same_rule() {
        assert_eq!(
            next_poll_delay([MatchStatus::Running], INTERVAL),
            Some(INTERVAL)
        );
        assert_eq!(next_poll_delay([MatchStatus::Completed], INTERVAL), None);
    }
}
