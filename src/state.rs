// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::storage::PaymentRepository;

/// Shared handler state. Cloned per request; the repository wraps a
/// reference-counted connection pool.
#[derive(Clone)]
pub struct AppState {
    pub payments: PaymentRepository,
}

impl AppState {
    pub fn new(payments: PaymentRepository) -> Self {
        Self { payments }
    }
}
