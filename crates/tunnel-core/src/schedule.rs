//! Deferred one-shot tasks keyed by kind.
//!
//! At most one deadline exists per key. Scheduling a key that is already
//! pending replaces its deadline, so the most recent request always wins.

use fnv::FnvHashMap;
use smallvec::SmallVec;
use std::hash::Hash;
use std::time::Duration;

/// The timed follow-ups the coordinator issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskKey {
    BurstEnd,
    GlitchEnd,
    AudioReap,
    Navigate,
}

#[derive(Debug)]
pub struct TaskTable<K> {
    pending: FnvHashMap<K, Duration>,
}

impl<K> Default for TaskTable<K> {
    fn default() -> Self {
        Self {
            pending: FnvHashMap::default(),
        }
    }
}

impl<K: Copy + Eq + Hash> TaskTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if an earlier deadline for `key` was replaced.
    pub fn schedule(&mut self, key: K, deadline: Duration) -> bool {
        self.pending.insert(key, deadline).is_some()
    }

    pub fn cancel(&mut self, key: K) -> bool {
        self.pending.remove(&key).is_some()
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.pending.contains_key(&key)
    }

    pub fn deadline(&self, key: K) -> Option<Duration> {
        self.pending.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every task due at `now`, earliest first.
    pub fn drain_due(&mut self, now: Duration) -> SmallVec<[K; 4]> {
        let mut due: SmallVec<[(Duration, K); 4]> = self
            .pending
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(k, at)| (*at, *k))
            .collect();
        due.sort_by_key(|(at, _)| *at);
        for (_, k) in &due {
            self.pending.remove(k);
        }
        due.into_iter().map(|(_, k)| k).collect()
    }
}
