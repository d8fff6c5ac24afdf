// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Payments API - CRUD service for payment records
//!
//! This crate exposes create, read, update, delete and list operations for
//! the `Payment` aggregate over JSON/HTTP, persisted in a relational
//! database.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `config` - Environment-driven runtime configuration
//! - `models` - The payment aggregate and its value objects
//! - `storage` - Relational storage (sqlx / SQLite)

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;

#[cfg(test)]
mod test_support;
