// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Size-classed routing allocator: small/medium requests go to a thread-local
// pair of `BlockPool`s, larger requests fall through to the platform heap.
// One instance per thread eliminates cross-thread contention on the fast
// path.

use std::alloc::{alloc, dealloc, Layout};
use std::cell::RefCell;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::PoolOptions;
use crate::error::{CoreError, PoolResult};

use super::block_pool::BlockPool;

/// Which route an allocation of a given size took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Served by the small pool.
    Small,
    /// Served by the medium pool.
    Medium,
    /// Fell through to the platform heap.
    Heap,
}

/// Hit/miss counters: pool hits vs heap fallbacks.
#[derive(Debug, Default, Clone, Copy)]
pub struct RouteCounters {
    /// Requests served by the small pool.
    pub small_hits: u64,
    /// Requests served by the medium pool.
    pub medium_hits: u64,
    /// Requests that fell through to the heap.
    pub heap_misses: u64,
}

struct Counters {
    small_hits: AtomicU64,
    medium_hits: AtomicU64,
    heap_misses: AtomicU64,
}

impl Counters {
    fn new() -> Self {
        Self {
            small_hits: AtomicU64::new(0),
            medium_hits: AtomicU64::new(0),
            heap_misses: AtomicU64::new(0),
        }
    }

    fn snapshot(&self) -> RouteCounters {
        RouteCounters {
            small_hits: self.small_hits.load(Ordering::Relaxed),
            medium_hits: self.medium_hits.load(Ordering::Relaxed),
            heap_misses: self.heap_misses.load(Ordering::Relaxed),
        }
    }
}

/// A per-thread routing allocator over two fixed-block pools.
///
/// When the `pooled-alloc` feature is disabled, every request falls through
/// to the heap and the counters record pure misses — a runtime-checked
/// feature flag rather than a compile-time branch, so the routing decision
/// stays in one place (`route_for`) regardless of how it's configured.
pub struct SizeClassAllocator {
    small: BlockPool,
    medium: BlockPool,
    small_threshold: usize,
    medium_threshold: usize,
    counters: Counters,
}

impl SizeClassAllocator {
    /// Build an allocator from explicit options.
    pub fn with_options(options: PoolOptions) -> Self {
        Self {
            small: BlockPool::new(64, options.blocks_per_chunk),
            medium: BlockPool::new(256, options.blocks_per_chunk),
            small_threshold: options.small_threshold,
            medium_threshold: options.medium_threshold,
            counters: Counters::new(),
        }
    }

    /// Which route a request of `size` bytes would take.
    pub fn route_for(&self, size: usize) -> Route {
        if !cfg!(feature = "pooled-alloc") {
            return Route::Heap;
        }
        if size <= self.small_threshold {
            Route::Small
        } else if size <= self.medium_threshold {
            Route::Medium
        } else {
            Route::Heap
        }
    }

    /// Allocate `size` bytes, routing to small/medium pool or the heap.
    pub fn allocate(&self, size: usize) -> PoolResult<NonNull<u8>> {
        match self.route_for(size) {
            Route::Small => {
                let p = self.small.allocate()?;
                self.counters.small_hits.fetch_add(1, Ordering::Relaxed);
                Ok(p)
            }
            Route::Medium => {
                let p = self.medium.allocate()?;
                self.counters.medium_hits.fetch_add(1, Ordering::Relaxed);
                Ok(p)
            }
            Route::Heap => {
                self.counters.heap_misses.fetch_add(1, Ordering::Relaxed);
                heap_allocate(size)
            }
        }
    }

    /// Free a block previously returned by `allocate(original_size)`.
    /// `original_size` is the caller's contract — the allocator does not
    /// recover it after the fact.
    ///
    /// # Safety
    /// `address` must have come from this allocator's `allocate(original_size)`.
    pub unsafe fn deallocate(&self, address: NonNull<u8>, original_size: usize) {
        match self.route_for(original_size) {
            Route::Small => unsafe { self.small.deallocate(address) },
            Route::Medium => unsafe { self.medium.deallocate(address) },
            Route::Heap => unsafe { heap_deallocate(address, original_size) },
        }
    }

    /// Snapshot of pool-hit/heap-miss counters.
    pub fn counters(&self) -> RouteCounters {
        self.counters.snapshot()
    }
}

fn heap_layout(size: usize) -> PoolResult<Layout> {
    Layout::from_size_align(size.max(1), std::mem::align_of::<usize>())
        .map_err(|_| CoreError::OutOfMemory { requested: size })
}

fn heap_allocate(size: usize) -> PoolResult<NonNull<u8>> {
    let layout = heap_layout(size)?;
    let p = unsafe { alloc(layout) };
    NonNull::new(p).ok_or(CoreError::OutOfMemory { requested: size })
}

unsafe fn heap_deallocate(address: NonNull<u8>, size: usize) {
    if let Ok(layout) = heap_layout(size) {
        unsafe { dealloc(address.as_ptr(), layout) };
    }
}

thread_local! {
    static CURRENT: RefCell<Option<SizeClassAllocator>> = const { RefCell::new(None) };
}

/// Run `f` with this thread's [`SizeClassAllocator`], creating one with
/// default options on first use. Modeled as a per-thread resource acquired
/// from a process-wide context rather than an implicit global.
pub fn with_thread_local<R>(f: impl FnOnce(&SizeClassAllocator) -> R) -> R {
    CURRENT.with(|cell| {
        let mut slot = cell.borrow_mut();
        let allocator = slot.get_or_insert_with(|| SizeClassAllocator::with_options(PoolOptions::default()));
        f(allocator)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_medium_and_large_requests_route_as_documented() {
        let a = SizeClassAllocator::with_options(PoolOptions::default());
        if cfg!(feature = "pooled-alloc") {
            assert_eq!(a.route_for(32), Route::Small);
            assert_eq!(a.route_for(200), Route::Medium);
            assert_eq!(a.route_for(4096), Route::Heap);
        } else {
            assert_eq!(a.route_for(32), Route::Heap);
        }
    }

    #[test]
    fn counters_track_hits_and_misses() {
        let a = SizeClassAllocator::with_options(PoolOptions::default());
        let p1 = a.allocate(32).unwrap();
        let p2 = a.allocate(4096).unwrap();
        unsafe {
            a.deallocate(p1, 32);
            a.deallocate(p2, 4096);
        }
        let counters = a.counters();
        if cfg!(feature = "pooled-alloc") {
            assert_eq!(counters.small_hits, 1);
        }
        assert_eq!(counters.heap_misses, 1);
    }

    #[test]
    fn thread_local_accessor_reuses_the_same_allocator_within_a_thread() {
        let _ = env_logger::try_init();

        with_thread_local(|a| {
            let p = a.allocate(16).unwrap();
            unsafe { a.deallocate(p, 16) };
        });
        let hits = with_thread_local(|a| a.counters());
        assert!(hits.small_hits + hits.medium_hits + hits.heap_misses >= 1);
    }
}
