// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache entries holding one prebuilt graph and its recency metadata

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::GraphKey;

/// One cached graph handle
///
/// The payload is immutable once built and shared with callers through `Arc`.
/// `last_accessed` is kept as a nanosecond offset from `created_at` so it can be
/// refreshed under a shared lock and never moves before creation.
#[derive(Debug)]
pub(crate) struct CacheEntry<G> {
    key: GraphKey,
    payload: Arc<G>,
    created_at: Instant,
    last_accessed_offset: AtomicU64,
}

impl<G> CacheEntry<G> {
    pub fn new(key: GraphKey, payload: Arc<G>, now: Instant) -> Self {
        Self {
            key,
            payload,
            created_at: now,
            last_accessed_offset: AtomicU64::new(0),
        }
    }

    pub fn payload(&self) -> &Arc<G> {
        &self.payload
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn last_accessed_at(&self) -> Instant {
        // Relaxed is enough: eviction and sweep read this under the exclusive
        // store lock, which orders them after every shared-lock writer.
        let offset = self.last_accessed_offset.load(Ordering::Relaxed);
        self.created_at + Duration::from_nanos(offset)
    }

    /// Record an access at `now`; earlier timestamps never overwrite later ones
    pub fn touch(&self, now: Instant) {
        let offset = now.saturating_duration_since(self.created_at).as_nanos();
        let offset = u64::try_from(offset).unwrap_or(u64::MAX);
        self.last_accessed_offset
            .fetch_max(offset, Ordering::Relaxed);
    }

    pub fn idle_time(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_accessed_at())
    }

    /// Logically expired once idle for at least `timeout`
    pub fn is_expired(&self, timeout: Duration, now: Instant) -> bool {
        self.idle_time(now) >= timeout
    }

    /// Wall-clock snapshot for diagnostics
    pub fn info(&self, timeout: Duration, now: Instant) -> CacheEntryInfo {
        let wall_now = Utc::now();
        let to_wall = |instant: Instant| {
            let age = now.saturating_duration_since(instant);
            chrono::Duration::from_std(age)
                .ok()
                .and_then(|age| wall_now.checked_sub_signed(age))
                .unwrap_or(wall_now)
        };

        CacheEntryInfo {
            key: self.key,
            created_at: to_wall(self.created_at),
            last_accessed_at: to_wall(self.last_accessed_at()),
            idle: self.idle_time(now),
            expired: self.is_expired(timeout, now),
        }
    }
}

/// Point-in-time description of a cache entry
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryInfo {
    pub key: GraphKey,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub idle: Duration,
    pub expired: bool,
}
