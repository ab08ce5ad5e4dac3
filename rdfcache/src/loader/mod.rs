// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph loading on cache misses
//!
//! A [`DocumentSource`] hands out the raw Turtle documents stored per subject and
//! sub-graph. [`VariantLoader`] reads the documents a variant needs through the
//! [`GraphStore`] and unions them into a single graph handle.

pub mod error;

pub use error::LoadError;

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::cache::{GraphKey, SubGraph};
use crate::store::GraphStore;

/// Processing state of a subject's RDF conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionStatus {
    Queued,
    Processing,
    Done,
    Failed,
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConversionStatus::Queued => "QUEUED",
            ConversionStatus::Processing => "PROCESSING",
            ConversionStatus::Done => "DONE",
            ConversionStatus::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Persistence collaborator holding the Turtle documents per subject
pub trait DocumentSource: Send + Sync {
    /// Conversion status of a subject, `None` if the subject is unknown
    fn status(&self, subject_id: i64) -> Result<Option<ConversionStatus>, LoadError>;

    /// All Turtle documents of one sub-graph; empty when none exist
    fn documents(&self, subject_id: i64, part: SubGraph) -> Result<Vec<Vec<u8>>, LoadError>;
}

impl<D: DocumentSource + ?Sized> DocumentSource for std::sync::Arc<D> {
    fn status(&self, subject_id: i64) -> Result<Option<ConversionStatus>, LoadError> {
        (**self).status(subject_id)
    }

    fn documents(&self, subject_id: i64, part: SubGraph) -> Result<Vec<Vec<u8>>, LoadError> {
        (**self).documents(subject_id, part)
    }
}

/// Builds a fresh graph handle for a key
pub trait GraphLoader<G>: Send + Sync {
    fn load(&self, key: &GraphKey) -> Result<G, LoadError>;
}

impl<G, F> GraphLoader<G> for F
where
    F: Fn(&GraphKey) -> Result<G, LoadError> + Send + Sync,
{
    fn load(&self, key: &GraphKey) -> Result<G, LoadError> {
        self(key)
    }
}

/// Loader composing a variant's sub-graphs from a document source
pub struct VariantLoader<D, S> {
    source: D,
    store: S,
}

impl<D: DocumentSource, S: GraphStore> VariantLoader<D, S> {
    pub fn new(source: D, store: S) -> Self {
        Self { source, store }
    }

    fn ensure_ready(&self, subject_id: i64) -> Result<(), LoadError> {
        match self.source.status(subject_id)? {
            None => Err(LoadError::NotFound { subject_id }),
            Some(ConversionStatus::Done) => Ok(()),
            Some(status) => Err(LoadError::NotReady { subject_id, status }),
        }
    }
}

impl<D: DocumentSource, S: GraphStore> GraphLoader<S::Graph> for VariantLoader<D, S> {
    fn load(&self, key: &GraphKey) -> Result<S::Graph, LoadError> {
        let started = Instant::now();
        self.ensure_ready(key.subject_id)?;

        let mut parts = Vec::new();
        for &part in key.variant.sub_graphs() {
            let documents = self.source.documents(key.subject_id, part)?;
            debug!(
                "Reading {} {} documents for subject {}",
                documents.len(),
                part,
                key.subject_id
            );

            for document in documents {
                parts.push(self.store.read(&document)?);
            }
        }

        let graph = if parts.len() > 1 {
            self.store.union(parts)?
        } else {
            parts.pop().ok_or(LoadError::NotFound {
                subject_id: key.subject_id,
            })?
        };

        debug!("Built graph {} in {:?}", key, started.elapsed());
        Ok(graph)
    }
}
