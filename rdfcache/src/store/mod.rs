// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph store collaborator
//!
//! The graph engine that parses Turtle, unions sub-graphs and executes SPARQL is
//! not part of this crate. It plugs in through [`GraphStore`]; the cache only
//! ever sees its opaque `Graph` handles.

use thiserror::Error;

/// Error types for graph store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to parse RDF document: {0}")]
    Parse(String),

    #[error("Failed to union graphs: {0}")]
    Union(String),

    #[error("Query execution failed: {0}")]
    Query(String),
}

/// Graph engine capable of building and querying in-memory RDF graphs
///
/// Graph handles are treated as immutable once built; `execute` must be safe to
/// call concurrently against one handle.
pub trait GraphStore: Send + Sync {
    /// Opaque, queryable graph handle
    type Graph: Send + Sync + 'static;

    /// Query answer (bindings, boolean, ...)
    type Output;

    /// Parse one Turtle document into a graph
    fn read(&self, turtle: &[u8]) -> Result<Self::Graph, StoreError>;

    /// Union several graphs into one
    fn union(&self, parts: Vec<Self::Graph>) -> Result<Self::Graph, StoreError>;

    /// Execute a SPARQL query against a graph
    fn execute(&self, query: &str, graph: &Self::Graph) -> Result<Self::Output, StoreError>;
}

impl<S: GraphStore + ?Sized> GraphStore for std::sync::Arc<S> {
    type Graph = S::Graph;
    type Output = S::Output;

    fn read(&self, turtle: &[u8]) -> Result<Self::Graph, StoreError> {
        (**self).read(turtle)
    }

    fn union(&self, parts: Vec<Self::Graph>) -> Result<Self::Graph, StoreError> {
        (**self).union(parts)
    }

    fn execute(&self, query: &str, graph: &Self::Graph) -> Result<Self::Output, StoreError> {
        (**self).execute(query, graph)
    }
}
