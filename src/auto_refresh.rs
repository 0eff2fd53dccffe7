// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// A snapshot reader with a companion worker thread that calls `refresh()` on
// a fixed interval. Reads stay wait-free (they go through the wrapped
// `SnapshotReader`); only the background worker ever blocks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::snapshot::SnapshotReader;
use crate::store::Store;
use crate::value::Value;

struct Shared {
    store: Arc<Store>,
    reader: SnapshotReader,
    stopped: AtomicBool,
    wake: Condvar,
    wake_lock: Mutex<()>,
}

/// A [`SnapshotReader`] kept fresh by a background worker that refreshes it
/// every `interval`.
///
/// Reads observe a snapshot at most `interval + one_refresh_duration` behind
/// the source store. `stop()` signals the worker to exit on its next wake
/// (the worker sleeps on a condition variable with a timeout so the signal
/// is never missed) and joins it; the worker is never abandoned running.
pub struct AutoRefreshReader {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl AutoRefreshReader {
    /// Start a worker that refreshes a reader over `store` every `interval`.
    pub fn new(store: Arc<Store>, interval: Duration) -> Self {
        let reader = SnapshotReader::new(&store);
        let shared = Arc::new(Shared {
            store,
            reader,
            stopped: AtomicBool::new(false),
            wake: Condvar::new(),
            wake_lock: Mutex::new(()),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::spawn(move || {
            let guard = worker_shared.wake_lock.lock().unwrap();
            let mut guard = guard;
            loop {
                let (g, timeout_result) = worker_shared
                    .wake
                    .wait_timeout(guard, interval)
                    .unwrap();
                guard = g;
                if worker_shared.stopped.load(Ordering::Acquire) {
                    break;
                }
                if timeout_result.timed_out() {
                    log::trace!("auto-refresh worker: refreshing snapshot");
                    match worker_shared
                        .reader
                        .refresh_unless_cancelled(&worker_shared.store, &worker_shared.stopped)
                    {
                        Ok(()) => {}
                        Err(crate::error::CoreError::Cancelled) => break,
                        Err(_) => {}
                    }
                }
            }
        });

        Self {
            shared,
            worker: Some(worker),
        }
    }

    /// Signal the worker to exit on its next wake, then join it. Idempotent.
    pub fn stop(&mut self) {
        self.shared.stopped.store(true, Ordering::Release);
        self.shared.wake.notify_all();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }

    /// The first entry named `name` in the most recently refreshed snapshot.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.shared.reader.get(name)
    }

    /// Every entry named `name` in the most recently refreshed snapshot.
    pub fn get_all(&self, name: &str) -> Vec<Value> {
        self.shared.reader.get_all(name)
    }

    /// Whether any entry named `name` exists in the most recently refreshed
    /// snapshot.
    pub fn contains(&self, name: &str) -> bool {
        self.shared.reader.contains(name)
    }

    /// Number of entries in the most recently refreshed snapshot.
    pub fn len(&self) -> usize {
        self.shared.reader.len()
    }

    /// Whether the most recently refreshed snapshot has no entries.
    pub fn is_empty(&self) -> bool {
        self.shared.reader.is_empty()
    }

    /// Number of `refresh()` cycles the worker has completed.
    pub fn refresh_count(&self) -> u64 {
        self.shared.reader.refresh_count()
    }
}

impl Drop for AutoRefreshReader {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn worker_picks_up_writes_within_the_staleness_bound() {
        let store = Arc::new(Store::new());
        store.insert(Value::i32("k", 1));

        let mut reader = AutoRefreshReader::new(Arc::clone(&store), Duration::from_millis(10));
        assert_eq!(reader.get("k").unwrap().as_i32(), Some(1));

        store.set("k", Value::i32("k", 2));

        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if reader.get("k").unwrap().as_i32() == Some(2) {
                break;
            }
            assert!(Instant::now() < deadline, "refresh did not observe the write in time");
            std::thread::sleep(Duration::from_millis(5));
        }

        reader.stop();
    }

    #[test]
    fn stop_joins_the_worker_and_is_idempotent() {
        let store = Arc::new(Store::new());
        let mut reader = AutoRefreshReader::new(store, Duration::from_millis(5));
        reader.stop();
        reader.stop(); // must not panic or hang
    }

    #[test]
    fn reads_after_stop_still_observe_the_last_good_snapshot() {
        let store = Arc::new(Store::new());
        store.insert(Value::i32("k", 7));
        let mut reader = AutoRefreshReader::new(Arc::clone(&store), Duration::from_millis(5));
        std::thread::sleep(Duration::from_millis(20));
        reader.stop();
        assert_eq!(reader.get("k").unwrap().as_i32(), Some(7));
    }
}
