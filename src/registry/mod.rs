//! Registries: the authoritative source list and the pool arena.

pub mod pool_registry;
pub mod source_registry;

pub use pool_registry::{PoolKey, PoolRegistry};
pub use source_registry::SourceRegistry;
