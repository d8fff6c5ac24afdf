// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Table definitions for the payment aggregate.
//!
//! Child tables use `parent_id` (the owning payment id) as their key; the
//! `payment_id` column of `attributes` is the scheme-level reference from
//! [`crate::models::Attributes::payment_id`].

use sqlx::SqlitePool;

use super::StartupError;

/// A table and the statement that creates it.
pub struct TableDefinition {
    pub name: &'static str,
    pub create: &'static str,
}

/// All tables, parents before children.
pub const TABLES: &[TableDefinition] = &[
    TableDefinition {
        name: "payments",
        create: r#"
            CREATE TABLE payments (
                id TEXT PRIMARY KEY NOT NULL,
                type TEXT NOT NULL,
                version INTEGER NOT NULL,
                organisation_id TEXT NOT NULL
            )
        "#,
    },
    TableDefinition {
        name: "attributes",
        create: r#"
            CREATE TABLE attributes (
                parent_id TEXT PRIMARY KEY NOT NULL
                    REFERENCES payments (id) ON DELETE CASCADE,
                amount TEXT NOT NULL,
                currency TEXT NOT NULL,
                end_to_end_reference TEXT NOT NULL,
                numeric_reference TEXT NOT NULL,
                payment_id TEXT NOT NULL,
                payment_purpose TEXT NOT NULL,
                payment_scheme TEXT NOT NULL,
                payment_type TEXT NOT NULL,
                processing_date TEXT NOT NULL,
                reference TEXT NOT NULL,
                scheme_payment_sub_type TEXT NOT NULL,
                scheme_payment_type TEXT NOT NULL
            )
        "#,
    },
    TableDefinition {
        name: "beneficiary_party",
        create: r#"
            CREATE TABLE beneficiary_party (
                parent_id TEXT PRIMARY KEY NOT NULL
                    REFERENCES attributes (parent_id) ON DELETE CASCADE,
                account_name TEXT NOT NULL,
                account_number TEXT NOT NULL,
                account_number_code TEXT NOT NULL,
                account_type INTEGER NOT NULL,
                address TEXT NOT NULL,
                bank_id TEXT NOT NULL,
                bank_id_code TEXT NOT NULL,
                name TEXT NOT NULL
            )
        "#,
    },
    TableDefinition {
        name: "charges_information",
        create: r#"
            CREATE TABLE charges_information (
                parent_id TEXT PRIMARY KEY NOT NULL
                    REFERENCES attributes (parent_id) ON DELETE CASCADE,
                bearer_code TEXT NOT NULL,
                receiver_charges_amount TEXT NOT NULL,
                receiver_charges_currency TEXT NOT NULL
            )
        "#,
    },
    TableDefinition {
        name: "sponsor_party",
        create: r#"
            CREATE TABLE sponsor_party (
                parent_id TEXT PRIMARY KEY NOT NULL
                    REFERENCES attributes (parent_id) ON DELETE CASCADE,
                account_number TEXT NOT NULL,
                bank_id TEXT NOT NULL,
                bank_id_code TEXT NOT NULL
            )
        "#,
    },
    TableDefinition {
        name: "debtor_party",
        create: r#"
            CREATE TABLE debtor_party (
                parent_id TEXT PRIMARY KEY NOT NULL
                    REFERENCES attributes (parent_id) ON DELETE CASCADE,
                account_name TEXT NOT NULL,
                account_number TEXT NOT NULL,
                account_number_code TEXT NOT NULL,
                address TEXT NOT NULL,
                bank_id TEXT NOT NULL,
                bank_id_code TEXT NOT NULL,
                name TEXT NOT NULL
            )
        "#,
    },
    TableDefinition {
        name: "charge",
        create: r#"
            CREATE TABLE charge (
                parent_id TEXT NOT NULL
                    REFERENCES charges_information (parent_id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                amount TEXT NOT NULL,
                currency TEXT NOT NULL,
                PRIMARY KEY (parent_id, position)
            )
        "#,
    },
    TableDefinition {
        name: "fx",
        create: r#"
            CREATE TABLE fx (
                parent_id TEXT PRIMARY KEY NOT NULL
                    REFERENCES attributes (parent_id) ON DELETE CASCADE,
                contract_reference TEXT NOT NULL,
                exchange_rate TEXT NOT NULL,
                original_amount TEXT NOT NULL,
                original_currency TEXT NOT NULL
            )
        "#,
    },
];

/// Create every table that does not exist yet.
///
/// Safe to call on every startup. Existing tables are logged and left
/// untouched.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), StartupError> {
    for table in TABLES {
        let exists = table_exists(pool, table.name)
            .await
            .map_err(|source| StartupError::Schema {
                table: table.name,
                source,
            })?;

        if exists {
            tracing::info!(table = table.name, "Table already exists, skipping");
            continue;
        }

        sqlx::query(table.create)
            .execute(pool)
            .await
            .map_err(|source| StartupError::Schema {
                table: table.name,
                source,
            })?;
        tracing::info!(table = table.name, "Created table");
    }

    Ok(())
}

async fn table_exists(pool: &SqlitePool, name: &str) -> Result<bool, sqlx::Error> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(name)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}
