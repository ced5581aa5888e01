//! Known emoji and webhook sets, used to turn Discord's "something changed" events into
//! individual create/delete events.
//!
//! `guild_emojis_update` carries the full emoji list and `webhook_update` only names the
//! channel, so both are diffed against the last list seen for that guild or channel.

use std::{collections::HashMap, sync::Arc};

use dashmap::DashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownItem {
    pub id: u64,
    pub name: String,
}

impl KnownItem {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    pub created: Vec<KnownItem>,
    pub deleted: Vec<KnownItem>,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty()
    }
}

/// Cheap to clone; clones share the same sets.
#[derive(Clone, Default)]
pub struct LifecycleTracker {
    /// Emojis per guild.
    emojis: Arc<DashMap<u64, HashMap<u64, String>>>,
    /// Webhooks per channel.
    webhooks: Arc<DashMap<u64, HashMap<u64, String>>>,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_emojis(&self, guild_id: u64, emojis: Vec<KnownItem>) {
        self.emojis.insert(guild_id, to_map(emojis));
    }

    pub fn seed_webhooks(&self, channel_id: u64, webhooks: Vec<KnownItem>) {
        self.webhooks.insert(channel_id, to_map(webhooks));
    }

    /// Replaces the guild's emoji set and returns what changed.
    ///
    /// The first list seen for a guild only seeds the set.
    pub fn diff_emojis(&self, guild_id: u64, current: Vec<KnownItem>) -> Diff {
        replace_and_diff(&self.emojis, guild_id, current)
    }

    /// Replaces the channel's webhook set and returns what changed.
    pub fn diff_webhooks(&self, channel_id: u64, current: Vec<KnownItem>) -> Diff {
        replace_and_diff(&self.webhooks, channel_id, current)
    }

    /// Drops the webhook set of a deleted channel.
    pub fn forget_channel(&self, channel_id: u64) {
        self.webhooks.remove(&channel_id);
    }

    pub fn tracked_channels(&self) -> usize {
        self.webhooks.len()
    }

    pub fn forget_guild(&self, guild_id: u64, channel_ids: &[u64]) {
        self.emojis.remove(&guild_id);
        for channel_id in channel_ids {
            self.webhooks.remove(channel_id);
        }
    }
}

fn to_map(items: Vec<KnownItem>) -> HashMap<u64, String> {
    items.into_iter().map(|item| (item.id, item.name)).collect()
}

fn replace_and_diff(
    sets: &DashMap<u64, HashMap<u64, String>>,
    key: u64,
    current: Vec<KnownItem>,
) -> Diff {
    let current = to_map(current);
    let Some(previous) = sets.insert(key, current.clone()) else {
        return Diff::default();
    };

    let mut created: Vec<KnownItem> = current
        .iter()
        .filter(|(id, _)| !previous.contains_key(id))
        .map(|(id, name)| KnownItem::new(*id, name.clone()))
        .collect();
    let mut deleted: Vec<KnownItem> = previous
        .iter()
        .filter(|(id, _)| !current.contains_key(id))
        .map(|(id, name)| KnownItem::new(*id, name.clone()))
        .collect();

    created.sort_by_key(|item| item.id);
    deleted.sort_by_key(|item| item.id);

    Diff { created, deleted }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_list_only_seeds() {
        let tracker = LifecycleTracker::new();

        let diff = tracker.diff_emojis(1, vec![KnownItem::new(10, "pepe")]);

        assert!(diff.is_empty());
    }

    #[test]
    fn reports_created_and_deleted_emojis() {
        let tracker = LifecycleTracker::new();
        tracker.seed_emojis(
            1,
            vec![KnownItem::new(10, "pepe"), KnownItem::new(11, "kekw")],
        );

        let diff = tracker.diff_emojis(
            1,
            vec![KnownItem::new(11, "kekw"), KnownItem::new(12, "pog")],
        );

        assert_eq!(diff.created, vec![KnownItem::new(12, "pog")]);
        assert_eq!(diff.deleted, vec![KnownItem::new(10, "pepe")]);
    }

    #[test]
    fn webhook_sets_are_per_channel() {
        let tracker = LifecycleTracker::new();
        tracker.seed_webhooks(100, vec![KnownItem::new(1, "Captain Hook")]);
        tracker.seed_webhooks(200, Vec::new());

        let diff = tracker.diff_webhooks(200, vec![KnownItem::new(2, "Spidey")]);

        assert_eq!(diff.created, vec![KnownItem::new(2, "Spidey")]);
        assert!(diff.deleted.is_empty());
        assert!(tracker
            .diff_webhooks(100, vec![KnownItem::new(1, "Captain Hook")])
            .is_empty());
    }

    #[test]
    fn forgotten_guild_is_reseeded() {
        let tracker = LifecycleTracker::new();
        tracker.seed_emojis(1, vec![KnownItem::new(10, "pepe")]);
        tracker.forget_guild(1, &[]);

        assert!(tracker.diff_emojis(1, Vec::new()).is_empty());
    }

    #[test]
    fn deleted_channel_is_dropped() {
        let tracker = LifecycleTracker::new();
        tracker.seed_webhooks(100, vec![KnownItem::new(1, "Captain Hook")]);
        tracker.seed_webhooks(200, Vec::new());

        tracker.forget_channel(100);

        assert_eq!(tracker.tracked_channels(), 1);
        assert!(tracker
            .diff_webhooks(100, vec![KnownItem::new(1, "Captain Hook")])
            .is_empty());
    }
}
