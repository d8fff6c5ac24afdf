// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the relational store.
//!
//! Each repository owns a clone of the connection pool and maps between
//! table rows and the API models by hand.

pub mod payments;

pub use payments::PaymentRepository;
