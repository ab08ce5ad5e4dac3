// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache keys: which subject and which combination of sub-graphs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Document families stored per subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubGraph {
    /// Base repository RDF
    Repository,
    /// Rating annotations
    Ratings,
    /// Computed statistics
    Statistics,
    /// Expert analysis annotations
    Expert,
}

impl SubGraph {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubGraph::Repository => "repository",
            SubGraph::Ratings => "ratings",
            SubGraph::Statistics => "statistics",
            SubGraph::Expert => "expert",
        }
    }
}

impl fmt::Display for SubGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selection of sub-graphs unioned into one cached graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Repository and statistics (ratings excluded for speed)
    #[serde(rename = "query")]
    Basic,
    /// Repository, ratings and statistics
    #[serde(rename = "query-combined")]
    Combined,
    /// Ratings and statistics only
    #[serde(rename = "query-analysis")]
    Analysis,
    /// Repository and expert annotations
    #[serde(rename = "query-expert")]
    Expert,
    /// Everything
    #[serde(rename = "query-all")]
    All,
}

impl Variant {
    pub const ALL: [Variant; 5] = [
        Variant::Basic,
        Variant::Combined,
        Variant::Analysis,
        Variant::Expert,
        Variant::All,
    ];

    /// Lowercase variant name
    pub fn name(&self) -> &'static str {
        match self {
            Variant::Basic => "basic",
            Variant::Combined => "combined",
            Variant::Analysis => "analysis",
            Variant::Expert => "expert",
            Variant::All => "all",
        }
    }

    /// Endpoint name used by the query API
    pub fn endpoint(&self) -> &'static str {
        match self {
            Variant::Basic => "query",
            Variant::Combined => "query-combined",
            Variant::Analysis => "query-analysis",
            Variant::Expert => "query-expert",
            Variant::All => "query-all",
        }
    }

    /// Sub-graphs unioned for this variant, in load order
    pub fn sub_graphs(&self) -> &'static [SubGraph] {
        use SubGraph::*;
        match self {
            Variant::Basic => &[Repository, Statistics],
            Variant::Combined => &[Repository, Ratings, Statistics],
            Variant::Analysis => &[Ratings, Statistics],
            Variant::Expert => &[Repository, Expert],
            Variant::All => &[Repository, Ratings, Statistics, Expert],
        }
    }

    pub fn includes(&self, part: SubGraph) -> bool {
        self.sub_graphs().contains(&part)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

impl FromStr for Variant {
    type Err = String;

    /// Accepts an endpoint name (`query-combined`) or a variant name (`combined`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Variant::ALL
            .into_iter()
            .find(|variant| variant.endpoint() == normalized || variant.name() == normalized)
            .ok_or_else(|| format!("Unknown graph variant: '{}'", s))
    }
}

/// Identifies one cached graph: a subject id plus the variant that was built
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GraphKey {
    pub subject_id: i64,
    pub variant: Variant,
}

impl GraphKey {
    pub fn new(subject_id: i64, variant: Variant) -> Self {
        Self {
            subject_id,
            variant,
        }
    }
}

impl fmt::Display for GraphKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.subject_id, self.variant)
    }
}
