// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Request input checks

use log::info;

use super::ServiceError;

/// Parse a decimal subject id
pub fn parse_subject_id(raw: &str) -> Result<i64, ServiceError> {
    raw.parse::<i64>().map_err(|e| {
        info!("Couldn't convert '{}' to a subject id: {}", raw, e);
        ServiceError::InvalidId(raw.to_string())
    })
}

/// Reject empty or whitespace-only queries
pub fn ensure_query_present(query: &str) -> Result<(), ServiceError> {
    if query.trim().is_empty() {
        return Err(ServiceError::EmptyQuery);
    }
    Ok(())
}
