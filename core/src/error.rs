//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Error taxonomy shared by every persistence operation.

use thiserror::Error;

/// Errors that can occur during persistence operations.
///
/// Absence is never an error on its own. Only the `must_*` family turns a missing row into
/// [`PersistenceError::NotFound`].
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// A `must_*` lookup found no matching row.
    #[error("Failed to load {entity}: no row matches {criteria}")]
    NotFound {
        /// Entity type name.
        entity: &'static str,
        /// Human readable description of the lookup.
        criteria: String,
    },

    /// A caller supplied value was rejected before reaching the backend.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Startup configuration could not be used (unknown dialect, malformed file, unknown database).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Backend failure, passed through untouched.
    #[error(transparent)]
    Backend(#[from] sqlx::Error),
}

impl PersistenceError {
    /// Create a not found error.
    pub fn not_found(entity: &'static str, criteria: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            criteria: criteria.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether this error reports a missing row.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this error reports a rejected argument.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Whether this error reports unusable configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Result type for persistence operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;
