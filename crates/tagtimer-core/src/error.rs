// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for tagtimer.

use thiserror::Error;

use crate::types::TimerStatus;

/// The primary error type used across all tagtimer adapter traits and core operations.
#[derive(Debug, Error)]
pub enum TagTimerError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, row decoding).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No user could be resolved from the request.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// An expected row was absent (no running timer to stop, no stats row, ...).
    #[error("{entity} not found for user `{user_id}` and tag `{tag}`")]
    NotFound {
        entity: &'static str,
        user_id: String,
        tag: String,
    },

    /// Input rejected before any persistence access (empty tag, malformed range).
    #[error("validation error: {0}")]
    Validation(String),

    /// The clock moved backwards between two timer updates.
    #[error("clock anomaly: computed elapsed time is negative ({elapsed_ms} ms)")]
    ClockAnomaly { elapsed_ms: i64 },

    /// A timer session was asked to make a transition its status does not allow.
    #[error("cannot {action} a timer that is {from}")]
    InvalidTransition {
        from: TimerStatus,
        action: &'static str,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TagTimerError {
    /// Shorthand for a [`TagTimerError::NotFound`] on a (user, tag) pair.
    pub fn not_found(entity: &'static str, user_id: &str, tag: &str) -> Self {
        Self::NotFound {
            entity,
            user_id: user_id.to_string(),
            tag: tag.to_string(),
        }
    }

    /// Wrap any storage-layer error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }

    /// Returns true for the expected-absence class of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
