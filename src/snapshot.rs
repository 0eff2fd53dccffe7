// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Lock-free snapshot reader over a `Store`, built on the RCU cell. Every
// read is a single atomic load followed by a map lookup on the snapshot —
// wait-free, with no coherence promised across separate calls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{CoreError, StoreResult};
use crate::rcu::RcuCell;
use crate::store::Store;
use crate::value::Value;

/// An immutable copy of a [`Store`]'s contents plus a `name -> positions`
/// lookup index, suitable for publishing through an [`RcuCell`].
///
/// This is also what [`Store::snapshot`] returns for ad hoc "give me a cheap
/// copy right now" callers that don't need the lock-free reader machinery.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    values: Vec<Value>,
    index: HashMap<String, Vec<usize>>,
}

impl StoreSnapshot {
    /// Copy `store`'s current contents under its reader lock.
    pub fn from_store(store: &Store) -> Self {
        let guard = store.read();
        let values: Vec<Value> = guard.to_vec();
        drop(guard);
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (pos, v) in values.iter().enumerate() {
            index.entry(v.name().to_string()).or_default().push(pos);
        }
        Self { values, index }
    }

    /// An empty snapshot, useful as a reader's initial state before the
    /// first `refresh()`.
    pub fn empty() -> Self {
        Self {
            values: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// The first entry named `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.index
            .get(name)
            .and_then(|positions| positions.first())
            .map(|&pos| &self.values[pos])
    }

    /// Every entry named `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> Vec<&Value> {
        match self.index.get(name) {
            Some(positions) => positions.iter().map(|&pos| &self.values[pos]).collect(),
            None => Vec::new(),
        }
    }

    /// Whether any entry named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of entries in this snapshot.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether this snapshot has no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Call `f` for every value in insertion order.
    pub fn for_each(&self, mut f: impl FnMut(&Value)) {
        for v in &self.values {
            f(v);
        }
    }
}

/// A lock-free reader over a [`Store`], backed by an [`RcuCell`] of
/// [`StoreSnapshot`].
///
/// Reads (`get`, `contains`, `len`, `for_each`) are wait-free: a single
/// atomic load followed by a map lookup on whichever snapshot was most
/// recently published. Concurrent mutations on the source store are
/// invisible until the next [`SnapshotReader::refresh`].
pub struct SnapshotReader {
    cell: RcuCell<StoreSnapshot>,
}

impl SnapshotReader {
    /// Build a reader over `store`, taking an initial snapshot immediately.
    pub fn new(store: &Store) -> Self {
        Self {
            cell: RcuCell::new(StoreSnapshot::from_store(store)),
        }
    }

    /// Build a reader holding an empty snapshot (no `refresh()` has run yet).
    pub fn empty() -> Self {
        Self {
            cell: RcuCell::new(StoreSnapshot::empty()),
        }
    }

    /// Re-copy `store`'s current contents and publish a new snapshot. Not
    /// wait-free: this blocks on `store`'s reader lock and on allocating the
    /// new snapshot.
    pub fn refresh(&self, store: &Store) -> StoreResult<()> {
        self.cell.update(StoreSnapshot::from_store(store));
        Ok(())
    }

    /// Like [`SnapshotReader::refresh`], but abandons the refresh and
    /// returns `Cancelled` instead of publishing if `cancelled` is observed
    /// set after the copy is taken. Used by [`crate::AutoRefreshReader`]'s
    /// worker so a `stop()` racing a slow copy never publishes a snapshot
    /// nobody asked for anymore.
    pub fn refresh_unless_cancelled(&self, store: &Store, cancelled: &AtomicBool) -> StoreResult<()> {
        let snapshot = StoreSnapshot::from_store(store);
        if cancelled.load(Ordering::Acquire) {
            return Err(CoreError::Cancelled);
        }
        self.cell.update(snapshot);
        Ok(())
    }

    /// The currently published snapshot, kept alive independent of further
    /// `refresh()` calls via the returned `Arc`.
    pub fn current(&self) -> Arc<StoreSnapshot> {
        self.cell.read()
    }

    /// The first entry named `name` in the currently published snapshot.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.current().get(name).cloned()
    }

    /// Every entry named `name` in the currently published snapshot.
    pub fn get_all(&self, name: &str) -> Vec<Value> {
        self.current().get_all(name).into_iter().cloned().collect()
    }

    /// Whether any entry named `name` exists in the currently published
    /// snapshot.
    pub fn contains(&self, name: &str) -> bool {
        self.current().contains(name)
    }

    /// Number of entries in the currently published snapshot.
    pub fn len(&self) -> usize {
        self.current().len()
    }

    /// Whether the currently published snapshot has no entries.
    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }

    /// Call `f` for every value in the currently published snapshot, in
    /// insertion order.
    pub fn for_each(&self, f: impl FnMut(&Value)) {
        self.current().for_each(f);
    }

    /// Monotonic count of successful `refresh()` publications.
    pub fn refresh_count(&self) -> u64 {
        self.cell.update_count()
    }
}
