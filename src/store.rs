// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// The keyed store: an ordered multi-map of name -> value, single-writer /
// many-reader. Concurrency is provided by the crate's own atomic rw_lock
// (see `crate::rw_lock`) guarding an `UnsafeCell`, the same construction
// `parking_lot`-style locks use — the mutex member that would otherwise make
// this type non-`Copy`/non-`Send` stays internal, and the store is exposed
// only through shared references plus `clone_contents`/`Clone` (which
// snapshot under the reader lock and build a fresh store), never a bitwise
// copy of a live lock.

use std::cell::UnsafeCell;
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::config::StoreOptions;
use crate::rw_lock::RwLock;
use crate::value::Value;

struct StoreData {
    values: Vec<Value>,
    index: HashMap<String, Vec<usize>>,
}

impl StoreData {
    fn new() -> Self {
        Self {
            values: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (pos, v) in self.values.iter().enumerate() {
            self.index.entry(v.name().to_string()).or_default().push(pos);
        }
    }

    fn push(&mut self, value: Value) {
        let pos = self.values.len();
        self.index
            .entry(value.name().to_string())
            .or_default()
            .push(pos);
        self.values.push(value);
    }
}

/// An ordered, multi-valued `name -> value` container with single-writer /
/// many-reader semantics.
///
/// Multiple entries may share a name; they are returned in insertion order.
/// All operations take `&self` — concurrent access is mediated by an
/// internal reader-writer lock (bypassed entirely when the store is built
/// with `StoreOptions { thread_safe: false, .. }` for single-threaded callers
/// that don't want to pay for synchronization).
pub struct Store {
    lock: RwLock,
    thread_safe: bool,
    data: UnsafeCell<StoreData>,
}

// SAFETY: every access to `data` goes through `read()`/`write()`, which
// acquire `lock` first when `thread_safe` is set. The single-threaded
// (`thread_safe: false`) mode is an explicit opt-in by a caller asserting
// exclusive ownership, matching `crate::rw_lock::RwLock`'s own contract.
unsafe impl Send for Store {}
unsafe impl Sync for Store {}

/// RAII shared-read guard. Derefs to the store's data; holding one across
/// multiple reads lets the caller iterate without re-acquiring the lock.
pub struct StoreRead<'a> {
    store: &'a Store,
}

impl Deref for StoreRead<'_> {
    type Target = [Value];
    fn deref(&self) -> &[Value] {
        // SAFETY: shared lock (or single-threaded bypass) held for `'a`.
        unsafe { &(*self.store.data.get()).values }
    }
}

impl Drop for StoreRead<'_> {
    fn drop(&mut self) {
        if self.store.thread_safe {
            self.store.lock.unlock_shared();
        }
    }
}

struct StoreWrite<'a> {
    store: &'a Store,
}

impl Deref for StoreWrite<'_> {
    type Target = StoreData;
    fn deref(&self) -> &StoreData {
        unsafe { &*self.store.data.get() }
    }
}

impl DerefMut for StoreWrite<'_> {
    fn deref_mut(&mut self) -> &mut StoreData {
        unsafe { &mut *self.store.data.get() }
    }
}

impl Drop for StoreWrite<'_> {
    fn drop(&mut self) {
        if self.store.thread_safe {
            self.store.lock.unlock();
        }
    }
}

impl Store {
    /// An empty store with default options (`thread_safe: true`).
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// An empty store built with explicit options.
    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            lock: RwLock::new(),
            thread_safe: options.thread_safe,
            data: UnsafeCell::new(StoreData::new()),
        }
    }

    /// Acquire a shared-read guard over the value sequence.
    pub fn read(&self) -> StoreRead<'_> {
        if self.thread_safe {
            self.lock.lock_shared();
        }
        StoreRead { store: self }
    }

    fn write(&self) -> StoreWrite<'_> {
        if self.thread_safe {
            self.lock.lock();
        }
        StoreWrite { store: self }
    }

    /// Borrow the data while a read or write guard for `self` is alive.
    ///
    /// # Safety (not `unsafe fn`, but a private invariant)
    /// Callers must hold `self.lock` (or rely on `!self.thread_safe`) for the
    /// lifetime of the returned reference, which every call site below
    /// ensures by taking a guard first.
    fn data(&self) -> &StoreData {
        unsafe { &*self.data.get() }
    }

    /// Append `value` to the ordered sequence. Duplicate names are permitted.
    pub fn insert(&self, value: Value) {
        self.write().push(value);
    }

    /// Replace every existing entry named `name` with a single new value,
    /// preserving the position of the first occurrence (or appending if
    /// `name` wasn't present).
    pub fn set(&self, name: &str, value: Value) {
        let mut guard = self.write();
        if let Some(positions) = guard.index.get(name).cloned() {
            if let Some(&first) = positions.first() {
                guard.values[first] = value;
                for &pos in positions.iter().skip(1).rev() {
                    guard.values.remove(pos);
                }
                guard.reindex();
                return;
            }
        }
        guard.push(value);
    }

    /// The `index`-th entry named `name` (0-based, insertion order), cloned.
    pub fn get(&self, name: &str, index: usize) -> Option<Value> {
        let _guard = self.read();
        let data = self.data();
        data.index
            .get(name)
            .and_then(|positions| positions.get(index))
            .map(|&pos| data.values[pos].clone())
    }

    /// Every entry named `name`, in insertion order, cloned.
    pub fn get_all(&self, name: &str) -> Vec<Value> {
        let _guard = self.read();
        let data = self.data();
        match data.index.get(name) {
            Some(positions) => positions.iter().map(|&pos| data.values[pos].clone()).collect(),
            None => Vec::new(),
        }
    }

    /// Whether any entry named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        let _guard = self.read();
        self.data().index.contains_key(name)
    }

    /// Remove the first (`all = false`) or every (`all = true`) entry named
    /// `name`. Returns the number of entries removed.
    pub fn remove(&self, name: &str, all: bool) -> u32 {
        let mut guard = self.write();
        let Some(positions) = guard.index.get(name).cloned() else {
            return 0;
        };
        if positions.is_empty() {
            return 0;
        }
        let to_remove: Vec<usize> = if all {
            positions
        } else {
            vec![*positions.first().unwrap()]
        };
        let removed = to_remove.len() as u32;
        let mut sorted = to_remove;
        sorted.sort_unstable_by(|a, b| b.cmp(a)); // remove back-to-front
        for pos in sorted {
            guard.values.remove(pos);
        }
        guard.reindex();
        removed
    }

    /// Empty the store.
    pub fn clear(&self) {
        let mut guard = self.write();
        guard.values.clear();
        guard.index.clear();
    }

    /// Number of entries (counting every name's duplicates).
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Call `f` for every value in insertion order, holding the reader lock
    /// for the duration.
    pub fn for_each(&self, mut f: impl FnMut(&Value)) {
        let guard = self.read();
        for v in guard.iter() {
            f(v);
        }
    }

    /// A cheap immutable copy of the current contents as a
    /// [`crate::snapshot::StoreSnapshot`].
    pub fn snapshot(&self) -> crate::snapshot::StoreSnapshot {
        crate::snapshot::StoreSnapshot::from_store(self)
    }

    /// Build a fresh, independent store with the same contents, snapshotting
    /// under the reader lock. The lock itself is never copied — `Store`
    /// holds it directly rather than behind an `Arc`, so cloning contents
    /// is the supported way to get an independently mutable copy.
    pub fn clone_contents(&self) -> Store {
        let guard = self.read();
        let fresh = Store::with_options(StoreOptions {
            thread_safe: self.thread_safe,
        });
        {
            let mut w = fresh.write();
            for v in guard.iter() {
                w.push(v.clone());
            }
        }
        fresh
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Store {
    fn clone(&self) -> Self {
        self.clone_contents()
    }
}

impl PartialEq for Store {
    fn eq(&self, other: &Self) -> bool {
        *self.read() == *other.read()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("len", &self.len())
            .finish()
    }
}
