// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Fixed-block free-list allocator. One pool serves exactly one block size;
// chunks grow monotonically and are never returned to the host. Built over a
// raw heap allocation and serialized with `crate::spin_lock::SpinLock`.

use std::alloc::{alloc, dealloc, Layout};
use std::ptr::NonNull;

use crate::error::{CoreError, PoolResult};
use crate::spin_lock::SpinLock;

/// A consistent snapshot of a [`BlockPool`]'s occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of chunks grown so far.
    pub chunks: usize,
    /// Blocks currently handed out.
    pub in_use: usize,
    /// Total blocks across every grown chunk.
    pub capacity: usize,
    /// Blocks currently on the free list.
    pub free: usize,
}

struct Inner {
    chunks: Vec<(NonNull<u8>, Layout)>,
    free_list: *mut u8,
    in_use: usize,
    capacity: usize,
}

// SAFETY: `Inner` is only ever touched while `BlockPool::lock` is held.
unsafe impl Send for Inner {}

/// O(1) allocate/free for a single block size, backed by a LIFO free list
/// threaded through chunks of heap memory.
///
/// Block size is clamped up to `size_of::<*mut u8>()` so a free slot can
/// embed the intrusive next-pointer. All mutating operations are serialized
/// by an internal spin lock — there's no read-mostly path worth a
/// reader-writer split here.
pub struct BlockPool {
    block_size: usize,
    blocks_per_chunk: usize,
    lock: SpinLock,
    inner: std::cell::UnsafeCell<Inner>,
}

unsafe impl Send for BlockPool {}
unsafe impl Sync for BlockPool {}

impl BlockPool {
    /// A pool serving blocks of (at least) `block_size` bytes, growing
    /// `blocks_per_chunk` at a time.
    pub fn new(block_size: usize, blocks_per_chunk: usize) -> Self {
        let block_size = block_size.max(std::mem::size_of::<*mut u8>());
        assert!(blocks_per_chunk > 0, "blocks_per_chunk must be nonzero");
        Self {
            block_size,
            blocks_per_chunk,
            lock: SpinLock::new(),
            inner: std::cell::UnsafeCell::new(Inner {
                chunks: Vec::new(),
                free_list: std::ptr::null_mut(),
                in_use: 0,
                capacity: 0,
            }),
        }
    }

    /// The block size this pool serves (after clamping).
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Hand out one block, growing a new chunk first if the free list is
    /// empty.
    pub fn allocate(&self) -> PoolResult<NonNull<u8>> {
        self.lock.lock();
        // SAFETY: lock held for the duration of this block.
        let inner = unsafe { &mut *self.inner.get() };
        if inner.free_list.is_null() {
            if let Err(e) = self.grow(inner) {
                self.lock.unlock();
                return Err(e);
            }
        }
        let head = inner.free_list;
        debug_assert!(!head.is_null());
        // SAFETY: every cell on the free list has a valid next-pointer
        // written at push time (see `deallocate`/`grow`).
        inner.free_list = unsafe { *(head as *const *mut u8) };
        inner.in_use += 1;
        self.lock.unlock();
        Ok(unsafe { NonNull::new_unchecked(head) })
    }

    /// Return `address` to the free list head.
    ///
    /// # Safety
    /// `address` must have come from this pool's `allocate()` and not
    /// already be on the free list.
    pub unsafe fn deallocate(&self, address: NonNull<u8>) {
        self.lock.lock();
        let inner = unsafe { &mut *self.inner.get() };
        #[cfg(debug_assertions)]
        {
            assert!(
                self.owns_unlocked(inner, address.as_ptr()),
                "address does not belong to this pool's chunks"
            );
        }
        let ptr = address.as_ptr();
        unsafe { *(ptr as *mut *mut u8) = inner.free_list };
        inner.free_list = ptr;
        inner.in_use -= 1;
        self.lock.unlock();
    }

    fn owns_unlocked(&self, inner: &Inner, address: *mut u8) -> bool {
        inner.chunks.iter().any(|(base, layout)| {
            let base = base.as_ptr();
            let end = unsafe { base.add(layout.size()) };
            address >= base && address < end
        })
    }

    fn grow(&self, inner: &mut Inner) -> PoolResult<()> {
        let total = self
            .block_size
            .checked_mul(self.blocks_per_chunk)
            .ok_or(CoreError::OutOfMemory {
                requested: usize::MAX,
            })?;
        let layout = Layout::from_size_align(total, std::mem::align_of::<*mut u8>())
            .map_err(|_| CoreError::OutOfMemory { requested: total })?;
        let base = unsafe { alloc(layout) };
        let base = NonNull::new(base).ok_or(CoreError::OutOfMemory { requested: total })?;

        // Thread every cell onto the free list, LIFO.
        for i in (0..self.blocks_per_chunk).rev() {
            let cell = unsafe { base.as_ptr().add(i * self.block_size) };
            unsafe { *(cell as *mut *mut u8) = inner.free_list };
            inner.free_list = cell;
        }
        inner.capacity += self.blocks_per_chunk;
        inner.chunks.push((base, layout));
        log::debug!(
            "block pool (block_size={}): grew chunk {}, capacity now {}",
            self.block_size,
            inner.chunks.len(),
            inner.capacity
        );
        Ok(())
    }

    /// A consistent snapshot of occupancy, taken under the internal lock.
    pub fn statistics(&self) -> PoolStats {
        self.lock.lock();
        let inner = unsafe { &*self.inner.get() };
        let stats = PoolStats {
            chunks: inner.chunks.len(),
            in_use: inner.in_use,
            capacity: inner.capacity,
            free: inner.capacity - inner.in_use,
        };
        self.lock.unlock();
        stats
    }
}

impl Drop for BlockPool {
    fn drop(&mut self) {
        let inner = unsafe { &mut *self.inner.get() };
        for (base, layout) in inner.chunks.drain(..) {
            unsafe { dealloc(base.as_ptr(), layout) };
        }
    }
}
