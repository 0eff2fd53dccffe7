// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// A concurrent, serializable typed-value keyed store: the payload layer of
// a message-passing system. Leaf-first module layout, per DESIGN.md:
//
//   L0  alloc, epoch       — memory substrate (standalone; not wired into `Value`)
//   L1  value, codec       — the tagged-union value model and its wire formats
//   L2  store, rcu         — the concurrent keyed store and its publication primitive
//   L3  snapshot, auto_refresh — lock-free readers over a store
//   L4  facade             — header + payload, the outward-facing container

pub mod alloc;
pub mod codec;
pub mod config;
pub mod epoch;
pub mod error;
pub mod facade;
pub mod rcu;
pub mod rw_lock;
pub mod snapshot;
pub mod spin_lock;
pub mod store;
pub mod value;

mod auto_refresh;

pub use auto_refresh::AutoRefreshReader;
pub use codec::Format;
pub use config::{CodecOptions, PoolOptions, StoreOptions};
pub use error::{CodecResult, CoreError, PoolResult, StoreResult};
pub use facade::{Facade, Header};
pub use rcu::RcuCell;
pub use rw_lock::RwLock;
pub use snapshot::{SnapshotReader, StoreSnapshot};
pub use spin_lock::SpinLock;
pub use store::Store;
pub use value::{tag, Value, ValueKind};
