//! Cancellation scope.
//!
//! A scope owns the handles (timers, listeners) started on behalf of one
//! owner, grouped by key. Handles cancel themselves on drop, so releasing a
//! key stops that group and cancelling the scope stops everything exactly
//! once. Released handles are handed back to the caller so they can be
//! dropped after any surrounding `RefCell` borrow has ended.
use std::collections::BTreeMap;

pub struct Scope<K: Ord, H> {
    tasks: BTreeMap<K, Vec<H>>,
    cancelled: bool,
}

impl<K: Ord, H> Default for Scope<K, H> {
    fn default() -> Self {
        Self {
            tasks: BTreeMap::new(),
            cancelled: false,
        }
    }
}

impl<K: Ord + Clone, H> Scope<K, H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `handle` under `key`. A cancelled scope refuses new work and
    /// returns the handle so the caller drops (and thereby stops) it.
    pub fn register(&mut self, key: K, handle: H) -> Result<(), H> {
        if self.cancelled {
            return Err(handle);
        }
        self.tasks.entry(key).or_default().push(handle);
        Ok(())
    }

    pub fn release(&mut self, key: &K) -> Vec<H> {
        self.tasks.remove(key).unwrap_or_default()
    }

    pub fn release_where(&mut self, mut pred: impl FnMut(&K) -> bool) -> Vec<H> {
        let doomed: Vec<K> = self.tasks.keys().filter(|k| pred(k)).cloned().collect();
        doomed
            .iter()
            .flat_map(|k| self.tasks.remove(k).unwrap_or_default())
            .collect()
    }

    /// Stop everything. Idempotent; later calls return nothing.
    pub fn cancel(&mut self) -> Vec<H> {
        self.cancelled = true;
        std::mem::take(&mut self.tasks)
            .into_values()
            .flatten()
            .collect()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn contains(&self, key: &K) -> bool {
        self.tasks.contains_key(key)
    }

    pub fn live(&self) -> usize {
        self.tasks.values().map(Vec::len).sum()
    }
}
