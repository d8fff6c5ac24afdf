// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use tempfile::TempDir;
use uuid::Uuid;

use crate::models::{
    Attributes, BeneficiaryParty, Charge, ChargesInformation, DebtorParty, Fx, Payment,
    SponsorParty,
};
use crate::state::AppState;
use crate::storage::{ensure_schema, PaymentRepository};

/// A repository backed by a fresh database file.
///
/// The returned directory must outlive the repository.
pub async fn test_repository() -> (TempDir, PaymentRepository) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let options = SqliteConnectOptions::new()
        .filename(dir.path().join("payments.db"))
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePool::connect_with(options)
        .await
        .expect("open test database");
    ensure_schema(&pool).await.expect("create schema");
    (dir, PaymentRepository::new(pool))
}

pub async fn test_state() -> (TempDir, AppState) {
    let (dir, repo) = test_repository().await;
    (dir, AppState::new(repo))
}

/// A fully populated payment with a fresh id.
pub fn sample_payment() -> Payment {
    Payment {
        id: Uuid::new_v4(),
        kind: "Payment".into(),
        version: 0,
        organisation_id: Uuid::new_v4(),
        attributes: Attributes {
            amount: "100.21".into(),
            beneficiary_party: BeneficiaryParty {
                account_name: "W Owens".into(),
                account_number: "31926819".into(),
                account_number_code: "BBAN".into(),
                account_type: 0,
                address: "1 The Beneficiary Localtown SE2".into(),
                bank_id: "403000".into(),
                bank_id_code: "GBDSC".into(),
                name: "Wilfred Jeremiah Owens".into(),
            },
            charges_information: ChargesInformation {
                bearer_code: "SHAR".into(),
                sender_charges: vec![
                    Charge {
                        amount: "5.00".into(),
                        currency: "GBP".into(),
                    },
                    Charge {
                        amount: "10.00".into(),
                        currency: "USD".into(),
                    },
                ],
                receiver_charges_amount: "1.00".into(),
                receiver_charges_currency: "USD".into(),
            },
            currency: "GBP".into(),
            debtor_party: DebtorParty {
                account_name: "EJ Brown Black".into(),
                account_number: "GB29XABC10161234567801".into(),
                account_number_code: "IBAN".into(),
                address: "10 Debtor Crescent Sourcetown NE1".into(),
                bank_id: "203301".into(),
                bank_id_code: "GBDSC".into(),
                name: "Emelia Jane Brown".into(),
            },
            end_to_end_reference: "Wil piano Jan".into(),
            fx: Fx {
                contract_reference: "FX123".into(),
                exchange_rate: "2.00000".into(),
                original_amount: "200.42".into(),
                original_currency: "USD".into(),
            },
            numeric_reference: "1002001".into(),
            payment_id: "123456789012345678".into(),
            payment_purpose: "Paying for goods/services".into(),
            payment_scheme: "FPS".into(),
            payment_type: "Credit".into(),
            processing_date: "2017-01-18".into(),
            reference: "Payment for Em's piano lessons".into(),
            scheme_payment_sub_type: "InternetBanking".into(),
            scheme_payment_type: "ImmediatePayment".into(),
            sponsor_party: SponsorParty {
                account_number: "56781234".into(),
                bank_id: "123123".into(),
                bank_id_code: "GBDSC".into(),
            },
        },
    }
}
