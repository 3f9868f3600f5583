// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session authentication for the gateway.
//!
//! Sessions are stateless signed tokens:
//!
//! ```text
//! base64url(user_id) "." expiry_unix_secs "." hex(hmac_sha256(key, first two parts))
//! ```
//!
//! A token is accepted from the session cookie or from an
//! `Authorization: Bearer <token>` header, checked in that order. Requests
//! without a valid token are rejected.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tagtimer_core::{
    AdapterType, Clock, HealthStatus, PluginAdapter, SessionStore, SessionToken, TagTimerError,
    UserId,
};

use crate::handlers::ApiError;

type HmacSha256 = Hmac<Sha256>;

/// Length of the random key generated when no secret is configured.
const EPHEMERAL_KEY_LEN: usize = 32;

/// Issues and verifies HMAC-signed session tokens.
pub struct SignedSessionStore {
    key: Vec<u8>,
    max_age_secs: i64,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SignedSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedSessionStore")
            .field("key", &"[redacted]")
            .field("max_age_secs", &self.max_age_secs)
            .finish()
    }
}

impl SignedSessionStore {
    pub fn new(secret: &[u8], max_age_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            key: secret.to_vec(),
            max_age_secs: i64::try_from(max_age_secs).unwrap_or(i64::MAX),
            clock,
        }
    }

    /// A store keyed with fresh random bytes. Tokens it issues do not
    /// survive a restart.
    pub fn ephemeral(max_age_secs: u64, clock: Arc<dyn Clock>) -> Self {
        let key: [u8; EPHEMERAL_KEY_LEN] = rand::random();
        Self::new(&key, max_age_secs, clock)
    }

    pub fn max_age_secs(&self) -> i64 {
        self.max_age_secs
    }

    fn mac(&self) -> Result<HmacSha256, TagTimerError> {
        HmacSha256::new_from_slice(&self.key)
            .map_err(|e| TagTimerError::Internal(format!("invalid session key: {e}")))
    }

    /// Issue a token for `user_id`, valid for the configured max age.
    pub fn issue(&self, user_id: &UserId) -> Result<SessionToken, TagTimerError> {
        let expires = self
            .clock
            .now()
            .timestamp()
            .saturating_add(self.max_age_secs);
        let payload = format!("{}.{expires}", URL_SAFE_NO_PAD.encode(user_id.as_str()));
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        Ok(SessionToken(format!("{payload}.{signature}")))
    }

    /// Check the signature and expiry of `token` and return its user.
    pub fn verify(&self, token: &SessionToken) -> Result<UserId, TagTimerError> {
        let malformed = || TagTimerError::Unauthorized("malformed session token".into());

        let (payload, signature) = token.0.rsplit_once('.').ok_or_else(malformed)?;
        let (encoded_user, expires) = payload.split_once('.').ok_or_else(malformed)?;

        let signature = hex::decode(signature).map_err(|_| malformed())?;
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TagTimerError::Unauthorized("invalid session signature".into()))?;

        let expires: i64 = expires.parse().map_err(|_| malformed())?;
        if self.clock.now().timestamp() >= expires {
            return Err(TagTimerError::Unauthorized("session expired".into()));
        }

        let user = URL_SAFE_NO_PAD
            .decode(encoded_user)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .filter(|user| !user.is_empty())
            .ok_or_else(malformed)?;
        Ok(UserId(user))
    }
}

#[async_trait]
impl PluginAdapter for SignedSessionStore {
    fn name(&self) -> &str {
        "signed-session"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::SessionStore
    }

    async fn health_check(&self) -> Result<HealthStatus, TagTimerError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TagTimerError> {
        Ok(())
    }
}

#[async_trait]
impl SessionStore for SignedSessionStore {
    async fn current_user(&self, token: &SessionToken) -> Result<UserId, TagTimerError> {
        self.verify(token)
    }
}

/// The authenticated caller, inserted into request extensions by
/// [`session_middleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

/// State for [`session_middleware`].
#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<dyn SessionStore + Send + Sync>,
    pub cookie_name: String,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("sessions", &self.sessions.name())
            .field("cookie_name", &self.cookie_name)
            .finish()
    }
}

/// Token carried by the request, cookie first, then bearer header.
pub fn extract_token(request: &Request, cookie_name: &str) -> Option<SessionToken> {
    let jar = CookieJar::from_headers(request.headers());
    if let Some(cookie) = jar.get(cookie_name)
        && !cookie.value().is_empty()
    {
        return Some(SessionToken(cookie.value().to_string()));
    }

    request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| SessionToken(t.to_string()))
}

/// Middleware that resolves the caller through the session store.
///
/// On success the request carries a [`CurrentUser`] extension; otherwise the
/// request is answered with 401.
pub async fn session_middleware(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&request, &auth.cookie_name)
        .ok_or_else(|| TagTimerError::Unauthorized("missing session".into()))?;

    let user = auth.sessions.current_user(&token).await.inspect_err(|e| {
        tracing::debug!(error = %e, "session rejected");
    })?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
