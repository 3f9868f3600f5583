// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session store trait: resolves an opaque session token to a user.

use async_trait::async_trait;

use crate::error::TagTimerError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{SessionToken, UserId};

/// Resolves the caller of a request to a stable user identifier.
///
/// The OAuth handshake happens elsewhere; by the time a request reaches the
/// timer API the identity provider has been consulted and the client only
/// carries a session token.
#[async_trait]
pub trait SessionStore: PluginAdapter {
    /// Returns the user behind `token`, or [`TagTimerError::Unauthorized`].
    async fn current_user(&self, token: &SessionToken) -> Result<UserId, TagTimerError>;
}
