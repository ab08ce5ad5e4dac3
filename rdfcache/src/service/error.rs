// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the query path

use thiserror::Error;

use crate::loader::LoadError;
use crate::store::StoreError;

/// Errors surfaced to the request layer
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid id '{0}' was given")]
    InvalidId(String),

    #[error("Empty SPARQL query given")]
    EmptyQuery,

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Query execution failed: {0}")]
    Query(#[source] StoreError),
}

/// Coarse classification the request layer maps onto responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    NotReady,
    Internal,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::InvalidId(_) | ServiceError::EmptyQuery => ErrorKind::BadRequest,
            ServiceError::Load(LoadError::NotFound { .. }) => ErrorKind::NotFound,
            ServiceError::Load(LoadError::NotReady { .. }) => ErrorKind::NotReady,
            ServiceError::Load(_) | ServiceError::Query(_) => ErrorKind::Internal,
        }
    }
}
