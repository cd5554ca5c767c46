//! Runtime support for reactive primitives.
//!
//! This module provides the infrastructure for dependency tracking,
//! reactive graph management, and execution contexts.

mod context;

pub use context::{NodeId, ReactiveRuntime};
pub(crate) use context::Node;
