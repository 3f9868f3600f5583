// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./tagtimer.toml` > `~/.config/tagtimer/tagtimer.toml` >
//! `/etc/tagtimer/tagtimer.toml`, with `TAGTIMER_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TagTimerConfig;

pub(crate) const LOCAL_CONFIG: &str = "tagtimer.toml";
pub(crate) const SYSTEM_CONFIG: &str = "/etc/tagtimer/tagtimer.toml";

/// Per-user config path under the XDG config dir, if one exists.
pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tagtimer").join("tagtimer.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tagtimer/tagtimer.toml`
/// 3. `~/.config/tagtimer/tagtimer.toml`
/// 4. `./tagtimer.toml`
/// 5. `TAGTIMER_*` environment variables
pub fn load_config() -> Result<TagTimerConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string on top of the defaults (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<TagTimerConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TagTimerConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TagTimerConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TagTimerConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TagTimerConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider mapping `TAGTIMER_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `TAGTIMER_AUTH_SESSION_SECRET` is `auth.session_secret`.
/// Keys are lower-cased before mapping.
fn env_provider() -> Env {
    Env::prefixed("TAGTIMER_").map(|key| {
        key.as_str()
            .to_ascii_lowercase()
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("auth_", "auth.", 1)
            .into()
    })
}
