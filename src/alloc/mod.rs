// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// L0 memory substrate: a fixed-block free-list pool and a size-classed
// routing allocator built on top of it. Not wired into `Value`'s `Vec<u8>`/
// `String` storage — see DESIGN.md for why.

pub mod block_pool;
pub mod size_class;

pub use block_pool::{BlockPool, PoolStats};
pub use size_class::{with_thread_local, Route, RouteCounters, SizeClassAllocator};
