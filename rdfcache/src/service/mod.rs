// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query path: resolve a graph through the cache, then execute against it

pub mod error;
pub mod validation;

pub use error::{ErrorKind, ServiceError};

use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

use crate::cache::{GraphCacheManager, GraphKey, Variant};
use crate::loader::GraphLoader;
use crate::store::GraphStore;

/// Runs SPARQL queries against cached graphs, building them on a miss
///
/// Concurrent misses for the same key are not deduplicated: each caller builds
/// its own graph and the last `put` wins.
pub struct QueryService<S: GraphStore, L> {
    store: S,
    loader: L,
    cache: Arc<GraphCacheManager<S::Graph>>,
}

impl<S, L> QueryService<S, L>
where
    S: GraphStore,
    L: GraphLoader<S::Graph>,
{
    pub fn new(store: S, loader: L, cache: Arc<GraphCacheManager<S::Graph>>) -> Self {
        Self {
            store,
            loader,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<GraphCacheManager<S::Graph>> {
        &self.cache
    }

    /// Return the cached graph for `key`, loading and caching it on a miss
    ///
    /// The loader runs outside every cache lock. A failed load leaves the cache
    /// untouched and is returned unchanged.
    pub fn resolve(&self, key: &GraphKey) -> Result<Arc<S::Graph>, ServiceError> {
        if let Some(graph) = self.cache.get(key) {
            return Ok(graph);
        }

        debug!("Cache miss for graph {}, loading", key);
        let started = Instant::now();
        let graph = Arc::new(self.loader.load(key)?);
        info!("Loaded graph {} in {:?}", key, started.elapsed());

        self.cache.put(*key, Arc::clone(&graph));
        Ok(graph)
    }

    /// Execute `query` against the graph for `key`
    pub fn query(&self, key: &GraphKey, query: &str) -> Result<S::Output, ServiceError> {
        validation::ensure_query_present(query)?;

        let graph = self.resolve(key)?;
        let started = Instant::now();
        let output = self
            .store
            .execute(query, &graph)
            .map_err(ServiceError::Query)?;
        debug!("Executed query on graph {} in {:?}", key, started.elapsed());

        Ok(output)
    }

    /// Execute `query` for a textual subject id as received by the request layer
    pub fn query_raw(
        &self,
        subject_id: &str,
        variant: Variant,
        query: &str,
    ) -> Result<S::Output, ServiceError> {
        let subject_id = validation::parse_subject_id(subject_id)?;
        self.query(&GraphKey::new(subject_id, variant), query)
    }

    /// Drop the cached graph for `key` so the next query rebuilds it
    pub fn invalidate(&self, key: &GraphKey) -> bool {
        self.cache.remove(key)
    }

    /// Drop every cached variant of one subject
    pub fn invalidate_subject(&self, subject_id: i64) -> usize {
        Variant::ALL
            .into_iter()
            .filter(|variant| self.cache.remove(&GraphKey::new(subject_id, *variant)))
            .count()
    }
}
