// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for tagtimer integration tests.
//!
//! Provides a controllable clock and a harness that wires the real SQLite
//! storage, engine, and HTTP router against a temp database.
//!
//! # Components
//!
//! - [`ManualClock`] - Clock that advances only when told to
//! - [`TestHarness`] - Temp database, engine, session store, and router

pub mod clock;
pub mod harness;

pub use clock::ManualClock;
pub use harness::{TestHarness, TestResponse};
