// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for graph loading

use thiserror::Error;

use super::ConversionStatus;
use crate::store::StoreError;

/// Failures while building a graph on a cache miss
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("No RDF entry found for id '{subject_id}'")]
    NotFound { subject_id: i64 },

    #[error("RDF for id '{subject_id}' is not produced yet (status: {status})")]
    NotReady {
        subject_id: i64,
        status: ConversionStatus,
    },

    #[error("RDF source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Graph store error: {0}")]
    Store(#[from] StoreError),
}
