//! # Pool Registry
//!
//! Arena-style owner of representation pools, keyed by item category and
//! pipeline kind.
//!
//! Pools are owned here and only here; managers hold non-owning handles
//! (`Arc` clones) plus explicit observer increments/decrements as their sole
//! lifecycle coupling. This keeps the pointer graph acyclic: a pool never
//! references a manager.

use crate::config::CoreConfig;
use crate::model::ItemKind;
use crate::pool::{PipelineFactory, RepresentationPool};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Identity of a pool: one item category rendered through one pipeline kind.
pub type PoolKey = (ItemKind, String);

/// Central owner of representation pools.
#[derive(Debug)]
pub struct PoolRegistry {
    pools: DashMap<PoolKey, Arc<RepresentationPool>>,
    config: CoreConfig,
}

impl PoolRegistry {
    pub fn new(config: CoreConfig) -> Self {
        Self {
            pools: DashMap::new(),
            config,
        }
    }

    /// Fetch the pool for `(kind, factory.kind())`, creating it on first use.
    pub fn get_or_create(
        &self,
        kind: ItemKind,
        factory: Arc<dyn PipelineFactory>,
    ) -> Arc<RepresentationPool> {
        let key: PoolKey = (kind, factory.kind().to_string());
        self.pools
            .entry(key.clone())
            .or_insert_with(|| {
                debug!(kind = %key.0, pipeline = %key.1, "creating representation pool");
                RepresentationPool::new(kind, factory, &self.config)
            })
            .clone()
    }

    /// Look up an existing pool.
    pub fn get(&self, kind: ItemKind, pipeline_kind: &str) -> Option<Arc<RepresentationPool>> {
        self.pools
            .get(&(kind, pipeline_kind.to_string()))
            .map(|entry| entry.clone())
    }

    /// Drop pools no manager references anymore. Returns how many were
    /// removed.
    pub fn remove_unreferenced(&self) -> usize {
        let before = self.pools.len();
        self.pools
            .retain(|_, pool| Arc::strong_count(pool) > 1);
        before - self.pools.len()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
