// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATABASE_URL` | SQLite connection URL | `sqlite:payments.db` |
//! | `DB_STARTUP_TIMEOUT_SECS` | How long to wait for the database at startup | `20` |
//! | `DB_POLL_INTERVAL_MS` | Delay between startup connection attempts | `100` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::time::Duration;

use crate::storage::ReadinessPolicy;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the database connection URL.
///
/// Any URL accepted by `sqlx`'s SQLite driver, e.g. `sqlite:payments.db` or
/// `sqlite:///var/lib/payments/payments.db`. The file is created if missing.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

pub const DB_STARTUP_TIMEOUT_ENV: &str = "DB_STARTUP_TIMEOUT_SECS";
pub const DB_POLL_INTERVAL_ENV: &str = "DB_POLL_INTERVAL_MS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE_URL: &str = "sqlite:payments.db";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Service configuration resolved at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub readiness: ReadinessPolicy,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            readiness: ReadinessPolicy::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// missing or unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let host = lookup(HOST_ENV).unwrap_or(defaults.host);
        let port = lookup(PORT_ENV)
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.port);
        let database_url = lookup(DATABASE_URL_ENV).unwrap_or(defaults.database_url);

        let timeout = lookup(DB_STARTUP_TIMEOUT_ENV)
            .and_then(|value| value.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.readiness.timeout);
        let interval = lookup(DB_POLL_INTERVAL_ENV)
            .and_then(|value| value.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.readiness.interval);

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Self {
            host,
            port,
            database_url,
            readiness: ReadinessPolicy { timeout, interval },
            log_format,
        }
    }

    /// Socket address to bind the HTTP server to.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
