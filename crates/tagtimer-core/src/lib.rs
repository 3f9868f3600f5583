// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for tagtimer.
//!
//! This crate provides the timer domain types, the error type, and the
//! adapter traits (storage, session store, clock) that the engine is wired
//! against.

pub mod error;
pub mod range;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TagTimerError;
pub use range::DateRange;
pub use types::{
    AdapterType, HealthStatus, SessionToken, StatsSummary, TagStats, TagTotal, TimerSession,
    TimerStatus, User, UserId, UserProfile, UserTagStats,
};

pub use traits::{Clock, PluginAdapter, SessionStore, StorageAdapter, SystemClock};
