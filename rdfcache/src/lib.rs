// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! RDFCache - keeps expensively built RDF graphs resident for SPARQL querying
//!
//! Building a queryable graph means parsing large Turtle documents and unioning
//! several sub-graphs. RDFCache keeps a bounded set of recently used graphs in
//! memory, shares them across concurrent requests, expires idle graphs in the
//! background and evicts the least recently used graph under capacity pressure.
//!
//! # Components
//!
//! - [`GraphCacheManager`]: the keyed store of prebuilt graph handles
//! - [`GraphStore`]: the graph engine collaborator (read, union, execute)
//! - [`GraphLoader`] / [`VariantLoader`]: builds a graph on a cache miss
//! - [`QueryService`]: resolves a graph through the cache and runs a query
//!
//! # Usage
//!
//! ```ignore
//! let cache = GraphCacheManager::start(CacheConfig::default())?;
//! let loader = VariantLoader::new(source, store.clone());
//! let service = QueryService::new(store, loader, cache.clone());
//!
//! let answer = service.query_raw("55", Variant::Basic, "ASK { ?s ?p ?o }")?;
//! cache.shutdown().await;
//! ```

pub mod cache;
pub mod loader;
pub mod service;
pub mod store;

pub use cache::{
    CacheConfig, CacheEntryInfo, CacheError, CacheStats, GraphCacheManager, GraphKey, SubGraph,
    Variant,
};
pub use loader::{ConversionStatus, DocumentSource, GraphLoader, LoadError, VariantLoader};
pub use service::{ErrorKind, QueryService, ServiceError};
pub use store::{GraphStore, StoreError};

/// RDFCache version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// RDFCache crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
