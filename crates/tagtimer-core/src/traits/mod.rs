// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for the collaborators the timer engine depends on.
//!
//! Adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod auth;
pub mod clock;
pub mod storage;

pub use adapter::PluginAdapter;
pub use auth::SessionStore;
pub use clock::{Clock, SystemClock};
pub use storage::StorageAdapter;
