//! Test utilities for RDFCache integration tests
//!
//! Provides a line-based in-memory graph store and a document source with
//! load counting and failure injection.

#![allow(dead_code)]

use parking_lot::Mutex;
use rdfcache::{ConversionStatus, DocumentSource, GraphStore, LoadError, StoreError, SubGraph};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Graph whose "triples" are the lines of its source documents
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineGraph {
    pub triples: BTreeSet<String>,
}

/// Query answers produced by [`LineStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Ask(bool),
    Select(Vec<String>),
}

/// Store understanding two query shapes:
/// `ASK <needle>` and `SELECT <prefix>`
#[derive(Debug, Default)]
pub struct LineStore {
    pub reads: AtomicUsize,
    pub unions: AtomicUsize,
    pub executions: AtomicUsize,
}

impl GraphStore for LineStore {
    type Graph = LineGraph;
    type Output = Answer;

    fn read(&self, turtle: &[u8]) -> Result<LineGraph, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let text = std::str::from_utf8(turtle).map_err(|e| StoreError::Parse(e.to_string()))?;
        Ok(LineGraph {
            triples: text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }

    fn union(&self, parts: Vec<LineGraph>) -> Result<LineGraph, StoreError> {
        self.unions.fetch_add(1, Ordering::SeqCst);
        Ok(LineGraph {
            triples: parts.into_iter().flat_map(|part| part.triples).collect(),
        })
    }

    fn execute(&self, query: &str, graph: &LineGraph) -> Result<Answer, StoreError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        let query = query.trim();

        if let Some(needle) = query.strip_prefix("ASK ") {
            return Ok(Answer::Ask(graph.triples.contains(needle.trim())));
        }
        if let Some(prefix) = query.strip_prefix("SELECT ") {
            let prefix = prefix.trim();
            return Ok(Answer::Select(
                graph
                    .triples
                    .iter()
                    .filter(|triple| triple.starts_with(prefix))
                    .cloned()
                    .collect(),
            ));
        }

        Err(StoreError::Query(format!("Unsupported query: {}", query)))
    }
}

/// In-memory document source counting how often subjects are loaded
#[derive(Default)]
pub struct MemorySource {
    statuses: Mutex<HashMap<i64, ConversionStatus>>,
    documents: Mutex<HashMap<(i64, SubGraph), Vec<Vec<u8>>>>,
    unavailable: Mutex<bool>,
    pub status_calls: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, subject_id: i64, part: SubGraph, turtle: &str) -> Self {
        self.add_document(subject_id, part, turtle);
        self
    }

    pub fn add_document(&self, subject_id: i64, part: SubGraph, turtle: &str) {
        self.statuses
            .lock()
            .entry(subject_id)
            .or_insert(ConversionStatus::Done);
        self.documents
            .lock()
            .entry((subject_id, part))
            .or_default()
            .push(turtle.as_bytes().to_vec());
    }

    pub fn set_status(&self, subject_id: i64, status: ConversionStatus) {
        self.statuses.lock().insert(subject_id, status);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock() = unavailable;
    }

    /// Number of loads attempted (each load checks status once)
    pub fn loads(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

impl DocumentSource for MemorySource {
    fn status(&self, subject_id: i64) -> Result<Option<ConversionStatus>, LoadError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if *self.unavailable.lock() {
            return Err(LoadError::SourceUnavailable(
                "database connection refused".to_string(),
            ));
        }
        Ok(self.statuses.lock().get(&subject_id).copied())
    }

    fn documents(&self, subject_id: i64, part: SubGraph) -> Result<Vec<Vec<u8>>, LoadError> {
        Ok(self
            .documents
            .lock()
            .get(&(subject_id, part))
            .cloned()
            .unwrap_or_default())
    }
}

/// Source with one fully converted subject (id 55) holding every sub-graph
pub fn sample_source() -> MemorySource {
    MemorySource::new()
        .with_document(55, SubGraph::Repository, "commit:1 a Commit\ncommit:2 a Commit")
        .with_document(55, SubGraph::Statistics, "stats:commits 2")
        .with_document(55, SubGraph::Ratings, "rating:1 score 4.5")
        .with_document(55, SubGraph::Expert, "expert:1 says fine")
}
