//! Key-value storage backends.
//!
//! [`KeyValueStorage`] mirrors the browser local-storage contract: string
//! keys, string values, synchronous access.

mod storage;

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
