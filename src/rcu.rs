// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// RCU cell: a container holding one atomically replaceable, immutable,
// reference-counted `T`. Built on `arc_swap::ArcSwap`, which gives single
// atomic-load reads and an identity-checked compare-and-update without
// reimplementing a hazard scheme — a shared, reference-counted immutable
// value is simpler and safer here than explicit epoch reclamation; the
// crate's own epoch reclaimer (`crate::epoch`) stays a separate facility for
// embedders building raw-pointer lock-free structures.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

/// A container holding one atomically replaceable, immutable `T`.
///
/// `read()` is a single atomic load; the returned `Arc<T>` keeps that
/// snapshot alive independent of any later `update()`. Every `read()`
/// returns a value that was, at some point, fully published — never a torn
/// composite.
pub struct RcuCell<T> {
    inner: ArcSwap<T>,
    update_count: AtomicU64,
}

impl<T> RcuCell<T> {
    /// Publish `initial` as the cell's first value.
    pub fn new(initial: T) -> Self {
        Self {
            inner: ArcSwap::from_pointee(initial),
            update_count: AtomicU64::new(0),
        }
    }

    /// Atomically load the currently published value.
    pub fn read(&self) -> Arc<T> {
        self.inner.load_full()
    }

    /// Publish `new_value`, replacing whatever was there. The previous
    /// value is released once its last reader `Arc` drops.
    pub fn update(&self, new_value: T) {
        self.inner.store(Arc::new(new_value));
        self.update_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Publish `new_value` only if the cell's current value is still
    /// (identity-)equal to `expected` — optimistic concurrency. Returns
    /// whether the swap happened; on failure the cell is left unchanged.
    ///
    /// Identity, not content, is what's compared: two snapshots with equal
    /// bytes but different addresses don't match. Because every `update`
    /// publishes a freshly allocated value and a reader's `Arc` pins the one
    /// it holds, the same address can never be reused out from under a
    /// concurrent reader (no ABA).
    pub fn compare_and_update(&self, expected: &Arc<T>, new_value: T) -> bool {
        let new_arc = Arc::new(new_value);
        let previous = self.inner.compare_and_swap(expected, new_arc);
        let swapped = Arc::ptr_eq(&previous, expected);
        if swapped {
            self.update_count.fetch_add(1, Ordering::Relaxed);
        }
        swapped
    }

    /// Monotonic count of successful `update`/`compare_and_update` calls.
    pub fn update_count(&self) -> u64 {
        self.update_count.load(Ordering::Relaxed)
    }
}
