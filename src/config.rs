// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Construction-time option structs: one explicit struct per concern instead
// of scattered constructor booleans.

/// Options for a [`crate::alloc::SizeClassAllocator`].
#[derive(Debug, Clone, Copy)]
pub struct PoolOptions {
    /// Requests at or below this size are routed to the small pool.
    pub small_threshold: usize,
    /// Requests at or below this size (and above `small_threshold`) are
    /// routed to the medium pool.
    pub medium_threshold: usize,
    /// Number of blocks threaded onto each pool's free list per chunk growth.
    pub blocks_per_chunk: usize,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            small_threshold: 64,
            medium_threshold: 256,
            blocks_per_chunk: 1024,
        }
    }
}

/// Options for a [`crate::store::Store`].
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    /// Enable the store's internal reader-writer lock. When `false`, the
    /// caller asserts exclusive single-threaded ownership and the lock is
    /// bypassed entirely.
    pub thread_safe: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { thread_safe: true }
    }
}

/// Options controlling the codec's decoder.
#[derive(Debug, Clone, Copy)]
pub struct CodecOptions {
    /// Maximum container/array nesting depth the decoder will follow before
    /// returning [`crate::error::CoreError::DepthExceeded`].
    pub max_decode_depth: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            max_decode_depth: 64,
        }
    }
}
