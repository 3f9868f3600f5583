// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! tagtimer - per-tag productivity timers.
//!
//! This is the binary entry point: the HTTP server plus a few offline
//! commands that work directly against the configured database.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod login;
mod report;
mod serve;
mod shutdown;

use clap::{Parser, Subcommand};
use tagtimer_core::UserProfile;

/// tagtimer - per-tag productivity timers.
#[derive(Parser, Debug)]
#[command(name = "tagtimer", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API server.
    Serve,
    /// Record a login for an identity-provider profile and print a session token.
    Login {
        /// Identity provider name (e.g. "github").
        #[arg(long)]
        provider: String,
        /// The provider's id for the user.
        #[arg(long)]
        provider_id: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        name: String,
    },
    /// List a user's tags with lifetime totals.
    Tags {
        /// User id (`provider:provider_id`).
        user: String,
        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Summarize a user's completed sessions over a date range.
    Summary {
        /// User id (`provider:provider_id`).
        user: String,
        /// Range start (`YYYY-MM-DDTHH:MM` local time, or RFC 3339). Defaults to today.
        #[arg(long)]
        start: Option<String>,
        /// Range end, same formats as `--start`.
        #[arg(long)]
        end: Option<String>,
        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match tagtimer_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            tagtimer_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.server.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Login {
            provider,
            provider_id,
            email,
            name,
        }) => {
            let profile = UserProfile {
                provider,
                provider_id,
                email,
                name,
                ..UserProfile::default()
            };
            login::run_login(&config, profile).await
        }
        Some(Commands::Tags { user, json }) => report::run_tags(&config, &user, json).await,
        Some(Commands::Summary {
            user,
            start,
            end,
            json,
        }) => {
            report::run_summary(&config, &user, start.as_deref(), end.as_deref(), json).await
        }
        None => {
            println!("tagtimer: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tagtimer={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn summary_parses_range_flags() {
        let cli = Cli::try_parse_from([
            "tagtimer",
            "summary",
            "github:1",
            "--start",
            "2026-01-01T00:00",
            "--end",
            "2026-01-31T23:59",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Summary {
                user, start, end, json,
            }) => {
                assert_eq!(user, "github:1");
                assert_eq!(start.as_deref(), Some("2026-01-01T00:00"));
                assert_eq!(end.as_deref(), Some("2026-01-31T23:59"));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn login_requires_provider_fields() {
        assert!(Cli::try_parse_from(["tagtimer", "login", "--provider", "github"]).is_err());
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config =
            tagtimer_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.server.log_level, "info");
    }
}
