// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for tagtimer.
//!
//! Exposes the timer engine as a JSON API over axum. Callers are resolved
//! through a [`SessionStore`](tagtimer_core::SessionStore) before any timer
//! route runs; the bundled store is [`auth::SignedSessionStore`].

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::{AuthState, CurrentUser, SignedSessionStore};
pub use handlers::ApiError;
pub use server::{AppState, CookieSettings, build_router, start_server};
