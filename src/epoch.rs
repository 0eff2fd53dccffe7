// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Three-epoch deferred reclamation for lock-free structures built by
// embedders (not used internally — the RCU cell gets its safety from `Arc`
// refcounting instead). A process-wide singleton is exposed as `GLOBAL`;
// `EpochReclaimer::new()` is also usable standalone for tests or an embedder
// wanting an isolated instance.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Sentinel pinned-epoch value for a thread not currently inside a
/// critical section.
pub const INACTIVE: u64 = u64::MAX;

struct RetireRecord {
    deleter: Box<dyn FnOnce() + Send>,
}

/// Process-wide (or standalone) epoch-based reclaimer.
///
/// `enter`/`exit` bound a read-side critical section; `retire` defers a
/// deletion to the retire list for the current epoch; `try_collect`
/// advances the global epoch and reclaims the list two epochs back, which
/// is safe because every thread that could still observe a pointer retired
/// then has since exited and re-entered at least once.
pub struct EpochReclaimer {
    epoch: AtomicU64,
    registry: Mutex<Vec<Arc<AtomicU64>>>,
    retire_lists: [Mutex<Vec<RetireRecord>>; 3],
}

/// Process-wide singleton. Embedders building lock-free structures that
/// need to outlive any single call site should retire against this.
pub static GLOBAL: EpochReclaimer = EpochReclaimer::new();

thread_local! {
    static SLOTS: RefCell<HashMap<usize, Arc<AtomicU64>>> = RefCell::new(HashMap::new());
}

impl EpochReclaimer {
    /// A fresh reclaimer with epoch 0 and no registered threads.
    pub const fn new() -> Self {
        Self {
            epoch: AtomicU64::new(0),
            registry: Mutex::new(Vec::new()),
            retire_lists: [
                Mutex::new(Vec::new()),
                Mutex::new(Vec::new()),
                Mutex::new(Vec::new()),
            ],
        }
    }

    /// The current global epoch.
    pub fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    fn identity(&self) -> usize {
        self as *const _ as usize
    }

    fn thread_slot(&self) -> Arc<AtomicU64> {
        SLOTS.with(|cell| {
            let mut map = cell.borrow_mut();
            map.entry(self.identity())
                .or_insert_with(|| {
                    let slot = Arc::new(AtomicU64::new(INACTIVE));
                    self.registry.lock().unwrap().push(Arc::clone(&slot));
                    slot
                })
                .clone()
        })
    }

    /// Pin this thread to the current epoch and return an RAII guard that
    /// unpins it on drop (on every path, including early return or panic).
    pub fn enter(&self) -> Guard<'_> {
        let slot = self.thread_slot();
        let e = self.epoch.load(Ordering::Acquire);
        slot.store(e, Ordering::Release);
        Guard {
            reclaimer: self,
            slot,
        }
    }

    /// Unpin this thread. Exposed for callers that don't want the RAII
    /// wrapper; prefer [`EpochReclaimer::enter`]'s `Guard` where possible.
    pub fn exit(&self) {
        self.thread_slot().store(INACTIVE, Ordering::Release);
    }

    /// Defer `deleter` until it's safe to run — at least two `try_collect`
    /// advances from now.
    pub fn retire(&self, deleter: Box<dyn FnOnce() + Send>) {
        let e = self.epoch.load(Ordering::Acquire);
        let idx = (e % 3) as usize;
        self.retire_lists[idx]
            .lock()
            .unwrap()
            .push(RetireRecord { deleter });
    }

    /// Advance the global epoch and reclaim whatever was retired two
    /// advances back.
    pub fn try_collect(&self) {
        let prev = self.epoch.fetch_add(1, Ordering::AcqRel);
        let new_epoch = prev + 1;
        log::trace!("epoch reclaimer: advanced epoch {prev} -> {new_epoch}");
        if new_epoch >= 2 {
            let idx = ((new_epoch - 2) % 3) as usize;
            self.drain_list(idx);
        }
    }

    /// Reclaim every retired record across all three lists unconditionally.
    /// Only valid during shutdown, when no reader threads remain pinned.
    pub fn force_collect(&self) {
        log::debug!("epoch reclaimer: force-collecting all retire lists");
        for idx in 0..3 {
            self.drain_list(idx);
        }
    }

    fn drain_list(&self, idx: usize) {
        let records: Vec<RetireRecord> = std::mem::take(&mut self.retire_lists[idx].lock().unwrap());
        if !records.is_empty() {
            log::trace!("epoch reclaimer: collecting {} retired record(s) from list {idx}", records.len());
        }
        for record in records {
            (record.deleter)();
        }
    }

    /// Number of threads ever registered against this reclaimer (for
    /// diagnostics/tests).
    pub fn registered_thread_count(&self) -> usize {
        self.registry.lock().unwrap().len()
    }
}

impl Default for EpochReclaimer {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII critical-section handle returned by [`EpochReclaimer::enter`].
/// Exits on every drop path.
pub struct Guard<'a> {
    reclaimer: &'a EpochReclaimer,
    slot: Arc<AtomicU64>,
}

impl Guard<'_> {
    /// The epoch this guard pinned at entry.
    pub fn pinned_epoch(&self) -> u64 {
        self.slot.load(Ordering::Acquire)
    }
}

impl Drop for Guard<'_> {
    fn drop(&mut self) {
        self.slot.store(INACTIVE, Ordering::Release);
        let _ = self.reclaimer; // kept for API symmetry / future use
    }
}
