//! Sliding-window action counters.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;

use crate::server::model::antinuke::{ActionKind, Threshold};

/// Who an action is attributed to.
///
/// Audit log entries without a user are counted together per guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Executor {
    User(u64),
    Unknown,
}

impl Executor {
    pub fn user_id(&self) -> Option<u64> {
        match self {
            Self::User(id) => Some(*id),
            Self::Unknown => None,
        }
    }

    pub fn mention(&self) -> String {
        match self {
            Self::User(id) => format!("<@{}> ({})", id, id),
            Self::Unknown => "Unknown executor".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed { count: u32 },
    Breach { count: u32 },
}

type Windows = HashMap<ActionKind, VecDeque<DateTime<Utc>>>;

/// Per (guild, executor) timestamps of recent actions, one deque per kind.
///
/// Cheap to clone; all clones share the same counters.
#[derive(Clone, Default)]
pub struct ActionTracker {
    windows: Arc<DashMap<(u64, Executor), Windows>>,
}

impl ActionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one action at `at` and checks it against `threshold`.
    ///
    /// Timestamps at or before `at - window` are dropped first, so the deque only ever
    /// holds actions inside the window.
    pub fn record(
        &self,
        guild_id: u64,
        executor: Executor,
        kind: ActionKind,
        at: DateTime<Utc>,
        threshold: Threshold,
    ) -> Verdict {
        let mut windows = self.windows.entry((guild_id, executor)).or_default();
        let timestamps = windows.entry(kind).or_default();

        prune(timestamps, at - threshold.window);
        timestamps.push_back(at);

        let count = timestamps.len() as u32;
        if count >= threshold.limit {
            Verdict::Breach { count }
        } else {
            Verdict::Allowed { count }
        }
    }

    /// Current number of tracked actions of `kind`, without pruning.
    pub fn count(&self, guild_id: u64, executor: Executor, kind: ActionKind) -> usize {
        self.windows
            .get(&(guild_id, executor))
            .and_then(|windows| windows.get(&kind).map(VecDeque::len))
            .unwrap_or(0)
    }

    /// Forgets every window of an executor in one guild.
    pub fn reset(&self, guild_id: u64, executor: Executor) {
        self.windows.remove(&(guild_id, executor));
    }

    /// Drops windows whose newest action is older than `max_age`.
    pub fn prune_idle(&self, now: DateTime<Utc>, max_age: TimeDelta) {
        let cutoff = now - max_age;

        self.windows.retain(|_, windows| {
            windows.retain(|_, timestamps| timestamps.back().is_some_and(|last| *last > cutoff));
            !windows.is_empty()
        });
    }

    pub fn tracked_executors(&self) -> usize {
        self.windows.len()
    }
}

fn prune(timestamps: &mut VecDeque<DateTime<Utc>>, cutoff: DateTime<Utc>) {
    while timestamps.front().is_some_and(|first| *first <= cutoff) {
        timestamps.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + seconds, 0).unwrap()
    }

    #[test]
    fn breaches_when_limit_is_reached_inside_window() {
        let tracker = ActionTracker::new();
        let threshold = Threshold::new(3, 10);
        let executor = Executor::User(5);

        let verdicts: Vec<Verdict> = (0..3)
            .map(|i| tracker.record(1, executor, ActionKind::ChannelDelete, at(i), threshold))
            .collect();

        assert_eq!(
            verdicts,
            vec![
                Verdict::Allowed { count: 1 },
                Verdict::Allowed { count: 2 },
                Verdict::Breach { count: 3 },
            ]
        );
    }

    #[test]
    fn old_actions_fall_out_of_the_window() {
        let tracker = ActionTracker::new();
        let threshold = Threshold::new(3, 10);
        let executor = Executor::User(5);

        tracker.record(1, executor, ActionKind::RoleDelete, at(0), threshold);
        tracker.record(1, executor, ActionKind::RoleDelete, at(5), threshold);
        let verdict = tracker.record(1, executor, ActionKind::RoleDelete, at(10), threshold);

        assert_eq!(verdict, Verdict::Allowed { count: 2 });
        assert_eq!(tracker.count(1, executor, ActionKind::RoleDelete), 2);
    }

    #[test]
    fn counts_are_isolated_by_guild_executor_and_kind() {
        let tracker = ActionTracker::new();
        let threshold = Threshold::new(2, 10);

        tracker.record(1, Executor::User(5), ActionKind::MemberBan, at(0), threshold);
        let other_guild = tracker.record(2, Executor::User(5), ActionKind::MemberBan, at(1), threshold);
        let other_user = tracker.record(1, Executor::User(6), ActionKind::MemberBan, at(1), threshold);
        let other_kind = tracker.record(1, Executor::User(5), ActionKind::MemberKick, at(1), threshold);
        let unknown = tracker.record(1, Executor::Unknown, ActionKind::MemberBan, at(1), threshold);

        for verdict in [other_guild, other_user, other_kind, unknown] {
            assert_eq!(verdict, Verdict::Allowed { count: 1 });
        }
    }

    #[test]
    fn reset_clears_executor_windows() {
        let tracker = ActionTracker::new();
        let threshold = Threshold::new(2, 10);
        let executor = Executor::User(9);

        tracker.record(1, executor, ActionKind::WebhookCreate, at(0), threshold);
        tracker.record(1, executor, ActionKind::WebhookCreate, at(1), threshold);
        tracker.reset(1, executor);

        assert_eq!(
            tracker.record(1, executor, ActionKind::WebhookCreate, at(2), threshold),
            Verdict::Allowed { count: 1 }
        );
    }

    #[test]
    fn prune_idle_drops_stale_executors() {
        let tracker = ActionTracker::new();
        let threshold = Threshold::new(5, 10);

        tracker.record(1, Executor::User(1), ActionKind::EmojiCreate, at(0), threshold);
        tracker.record(1, Executor::User(2), ActionKind::EmojiCreate, at(100), threshold);

        tracker.prune_idle(at(120), TimeDelta::seconds(60));

        assert_eq!(tracker.tracked_executors(), 1);
        assert_eq!(tracker.count(1, Executor::User(2), ActionKind::EmojiCreate), 1);
    }
}
