//! Recently evicted transaction ids.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    time::{Duration, Instant},
};

use laneway_chain::transaction;

/// A bounded list of evicted transaction ids, which forgets each id after a
/// fixed time.
///
/// The mempool reports these ids to the consensus engine, so it can stop
/// rebroadcasting transactions that were pushed out by better ones.
pub struct EvictionList {
    /// The latest eviction time of each id.
    evicted_at: HashMap<transaction::Hash, Instant>,

    /// Each eviction, oldest first.
    ///
    /// An id that is evicted again has a stale entry here, which is skipped
    /// when its time doesn't match `evicted_at`. Stale entries are dropped once
    /// the queue is twice as long as the list.
    queue: VecDeque<(transaction::Hash, Instant)>,

    max_entries: usize,
    memory_time: Duration,
}

impl EvictionList {
    /// Returns an empty list that holds up to `max_entries` ids, for `memory_time` each.
    pub fn new(max_entries: usize, memory_time: Duration) -> Self {
        Self {
            evicted_at: HashMap::new(),
            queue: VecDeque::new(),
            max_entries,
            memory_time,
        }
    }

    /// Records the eviction of `id`, or refreshes it if it was already evicted.
    ///
    /// Forgets the oldest id if the list is full.
    pub fn insert(&mut self, id: transaction::Hash) {
        self.prune();

        let now = Instant::now();
        let refreshed = self.evicted_at.insert(id, now).is_some();
        self.queue.push_back((id, now));

        if !refreshed && self.evicted_at.len() > self.max_entries {
            self.pop_oldest();
        }

        if self.queue.len() > 2 * self.max_entries.max(1) {
            self.compact();
        }
    }

    /// Returns `true` if `id` was evicted within the memory time.
    pub fn contains_key(&self, id: &transaction::Hash) -> bool {
        self.evicted_at
            .get(id)
            .is_some_and(|evicted_at| !self.is_expired(*evicted_at))
    }

    /// Returns the number of queued evictions, including stale ones.
    #[cfg(test)]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Returns the number of remembered ids.
    pub fn len(&mut self) -> usize {
        self.prune();
        self.evicted_at.len()
    }

    /// Forgets every id.
    pub fn clear(&mut self) {
        self.evicted_at.clear();
        self.queue.clear();
    }

    /// Forgets ids evicted more than the memory time ago.
    fn prune(&mut self) {
        while let Some(&(id, evicted_at)) = self.queue.front() {
            if !self.is_expired(evicted_at) {
                break;
            }

            self.queue.pop_front();
            if self.evicted_at.get(&id) == Some(&evicted_at) {
                self.evicted_at.remove(&id);
            }
        }
    }

    /// Drops every stale queue entry, keeping the latest entry of each id.
    fn compact(&mut self) {
        let evicted_at = &self.evicted_at;
        let mut seen = HashSet::new();
        let mut live = VecDeque::with_capacity(evicted_at.len());

        for (id, queued_at) in self.queue.drain(..).rev() {
            if evicted_at.get(&id) == Some(&queued_at) && seen.insert(id) {
                live.push_front((id, queued_at));
            }
        }

        self.queue = live;
    }

    /// Removes the oldest live eviction, skipping stale queue entries.
    fn pop_oldest(&mut self) {
        while let Some((id, evicted_at)) = self.queue.pop_front() {
            if self.evicted_at.get(&id) == Some(&evicted_at) {
                self.evicted_at.remove(&id);
                return;
            }
        }
    }

    fn is_expired(&self, evicted_at: Instant) -> bool {
        evicted_at.elapsed() > self.memory_time
    }
}
