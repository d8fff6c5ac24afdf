// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Relational Storage Module
//!
//! Payments are persisted in a SQLite database accessed through a `sqlx`
//! connection pool. The pool is the only shared resource in the service;
//! it is owned by [`PaymentRepository`] and handed to request handlers via
//! [`crate::state::AppState`].
//!
//! ## Table Layout
//!
//! ```text
//! payments
//!   └─ attributes                (1:1, keyed by payment id)
//!        ├─ beneficiary_party    (1:1)
//!        ├─ debtor_party         (1:1)
//!        ├─ sponsor_party        (1:1)
//!        ├─ fx                   (1:1)
//!        └─ charges_information  (1:1)
//!             └─ charge          (1:n, ordered by position)
//! ```
//!
//! Every child table is keyed by the owning payment id and declared
//! `ON DELETE CASCADE`, so deleting a `payments` row removes the whole
//! aggregate.
//!
//! ## Startup
//!
//! [`wait_for_database`] polls the database until it answers a trivial
//! query or the readiness deadline passes. [`schema::ensure_schema`] then
//! creates any missing tables.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::time::{sleep, Instant};
use uuid::Uuid;

pub mod repository;
pub mod schema;

pub use repository::PaymentRepository;
pub use schema::ensure_schema;

// =============================================================================
// Error Types
// =============================================================================

/// Error type for payment storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("payment {0} not found")]
    NotFound(Uuid),

    #[error("payment {0} already exists")]
    AlreadyExists(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be mapped back into the model.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that abort service startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid database url: {0}")]
    InvalidUrl(#[source] sqlx::Error),

    #[error("database unreachable after {attempts} attempts: {source}")]
    Unreachable {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to create table {table}: {source}")]
    Schema {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

// =============================================================================
// Connection
// =============================================================================

/// How long and how often to poll the database during startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    /// Overall deadline for the database to become reachable.
    pub timeout: Duration,
    /// Delay between attempts.
    pub interval: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            interval: Duration::from_millis(100),
        }
    }
}

/// Parse a `sqlite:` URL into connect options.
///
/// The database file is created if missing and foreign keys are enforced,
/// which the cascading deletes depend on.
pub fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, StartupError> {
    let options = SqliteConnectOptions::from_str(database_url).map_err(StartupError::InvalidUrl)?;
    Ok(options.create_if_missing(true).foreign_keys(true))
}

/// Open a connection pool, retrying until the database answers or the
/// policy deadline passes.
pub async fn wait_for_database(
    options: SqliteConnectOptions,
    policy: ReadinessPolicy,
) -> Result<SqlitePool, StartupError> {
    let deadline = Instant::now() + policy.timeout;
    let mut attempts = 0;

    loop {
        attempts += 1;
        match try_connect(options.clone()).await {
            Ok(pool) => {
                tracing::info!(attempts, "Database is reachable");
                return Ok(pool);
            }
            Err(source) => {
                if Instant::now() + policy.interval >= deadline {
                    return Err(StartupError::Unreachable { attempts, source });
                }
                tracing::debug!(attempts, error = %source, "Database not reachable yet, retrying");
                sleep(policy.interval).await;
            }
        }
    }
}

async fn try_connect(options: SqliteConnectOptions) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    sqlx::query("SELECT 1").execute(&pool).await?;
    Ok(pool)
}
