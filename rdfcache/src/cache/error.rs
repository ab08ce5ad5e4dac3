// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for cache construction

use thiserror::Error;

/// Errors raised while configuring or starting a cache
///
/// Normal cache operations never fail: a miss is an `Option::None`, not an error.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read cache configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("Failed to parse cache configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Background sweep requires a running tokio runtime")]
    NoRuntime,
}
