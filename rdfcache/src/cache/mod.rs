// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph caching system
//!
//! This module keeps prebuilt graph handles resident between requests:
//! - Keys identifying a subject and the variant of sub-graphs it was built from
//! - Entries tracking creation and last access
//! - A bounded manager with LRU eviction and lazy idle expiry
//! - A background sweep reclaiming expired entries

pub mod cache_config;
pub mod cache_manager;
pub mod entry;
pub mod error;
pub mod key;
mod sweeper;

pub use cache_config::CacheConfig;
pub use cache_manager::{CacheStats, GraphCacheManager};
pub use entry::CacheEntryInfo;
pub use error::CacheError;
pub use key::{GraphKey, SubGraph, Variant};
