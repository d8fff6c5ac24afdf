// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Payment repository for the relational store.
//!
//! A payment is spread over eight tables (see [`crate::storage::schema`]).
//! Reads join the one-to-one tables in a single query and load the ordered
//! sender charges separately. Writes for one aggregate run inside a single
//! database transaction.

use std::collections::HashMap;

use sqlx::sqlite::{SqliteConnection, SqlitePool, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

use crate::models::{
    Attributes, BeneficiaryParty, Charge, ChargesInformation, DebtorParty, Fx, Payment,
    SponsorParty,
};
use crate::storage::{StoreError, StoreResult};

const SELECT_AGGREGATE: &str = r#"
    SELECT
        p.id, p.type, p.version, p.organisation_id,
        a.amount, a.currency, a.end_to_end_reference, a.numeric_reference,
        a.payment_id, a.payment_purpose, a.payment_scheme, a.payment_type,
        a.processing_date, a.reference, a.scheme_payment_sub_type,
        a.scheme_payment_type,
        b.account_name AS b_account_name,
        b.account_number AS b_account_number,
        b.account_number_code AS b_account_number_code,
        b.account_type AS b_account_type,
        b.address AS b_address,
        b.bank_id AS b_bank_id,
        b.bank_id_code AS b_bank_id_code,
        b.name AS b_name,
        d.account_name AS d_account_name,
        d.account_number AS d_account_number,
        d.account_number_code AS d_account_number_code,
        d.address AS d_address,
        d.bank_id AS d_bank_id,
        d.bank_id_code AS d_bank_id_code,
        d.name AS d_name,
        s.account_number AS s_account_number,
        s.bank_id AS s_bank_id,
        s.bank_id_code AS s_bank_id_code,
        c.bearer_code AS c_bearer_code,
        c.receiver_charges_amount AS c_receiver_charges_amount,
        c.receiver_charges_currency AS c_receiver_charges_currency,
        f.contract_reference AS f_contract_reference,
        f.exchange_rate AS f_exchange_rate,
        f.original_amount AS f_original_amount,
        f.original_currency AS f_original_currency
    FROM payments p
    JOIN attributes a ON a.parent_id = p.id
    JOIN beneficiary_party b ON b.parent_id = p.id
    JOIN debtor_party d ON d.parent_id = p.id
    JOIN sponsor_party s ON s.parent_id = p.id
    JOIN charges_information c ON c.parent_id = p.id
    JOIN fx f ON f.parent_id = p.id
"#;

/// Repository for payment operations on the relational store.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Create a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Check if a payment exists.
    pub async fn exists(&self, id: Uuid) -> StoreResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE id = ?")
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// Get a payment with all nested value objects.
    ///
    /// Both reads share one transaction so a concurrent update is seen
    /// either entirely or not at all.
    pub async fn fetch_by_id(&self, id: Uuid) -> StoreResult<Payment> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!("{SELECT_AGGREGATE} WHERE p.id = ?"))
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        let mut payment = payment_from_row(&row)?;

        let charges = sqlx::query(
            "SELECT amount, currency FROM charge WHERE parent_id = ? ORDER BY position",
        )
        .bind(id.to_string())
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        payment.attributes.charges_information.sender_charges =
            charges.iter().map(charge_from_row).collect::<StoreResult<_>>()?;

        Ok(payment)
    }

    /// List every stored payment, oldest first.
    pub async fn fetch_all(&self) -> StoreResult<Vec<Payment>> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query(&format!("{SELECT_AGGREGATE} ORDER BY p.rowid"))
            .fetch_all(&mut *tx)
            .await?;

        let charge_rows = sqlx::query(
            "SELECT parent_id, amount, currency FROM charge ORDER BY parent_id, position",
        )
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        let mut charges: HashMap<String, Vec<Charge>> = HashMap::new();
        for row in &charge_rows {
            let parent_id: String = row.try_get("parent_id")?;
            charges
                .entry(parent_id)
                .or_default()
                .push(charge_from_row(row)?);
        }

        rows.iter()
            .map(|row| -> StoreResult<Payment> {
                let mut payment = payment_from_row(row)?;
                if let Some(sender_charges) = charges.remove(&payment.id.to_string()) {
                    payment.attributes.charges_information.sender_charges = sender_charges;
                }
                Ok(payment)
            })
            .collect()
    }

    /// Create a new payment and return it as stored.
    pub async fn insert(&self, payment: &Payment) -> StoreResult<Payment> {
        let id = payment.id;

        if self.exists(id).await? {
            return Err(StoreError::AlreadyExists(id));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO payments (id, type, version, organisation_id) VALUES (?, ?, ?, ?)")
            .bind(id.to_string())
            .bind(&payment.kind)
            .bind(payment.version)
            .bind(payment.organisation_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| already_exists_or(e, id))?;

        insert_attributes(&mut tx, id, &payment.attributes).await?;
        tx.commit().await?;

        tracing::debug!(payment_id = %id, "Inserted payment");
        self.fetch_by_id(id).await
    }

    /// Replace an existing payment's stored values.
    pub async fn update(&self, payment: &Payment) -> StoreResult<Payment> {
        let id = payment.id;
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE payments SET type = ?, version = ?, organisation_id = ? WHERE id = ?",
        )
        .bind(&payment.kind)
        .bind(payment.version)
        .bind(payment.organisation_id.to_string())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        // Nested rows cascade from attributes.
        sqlx::query("DELETE FROM attributes WHERE parent_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        insert_attributes(&mut tx, id, &payment.attributes).await?;
        tx.commit().await?;

        tracing::debug!(payment_id = %id, "Updated payment");
        self.fetch_by_id(id).await
    }

    /// Delete a payment and all of its nested rows.
    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM payments WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        tracing::debug!(payment_id = %id, "Deleted payment");
        Ok(())
    }
}

// =============================================================================
// Writes
// =============================================================================

async fn insert_attributes(
    conn: &mut SqliteConnection,
    id: Uuid,
    attributes: &Attributes,
) -> StoreResult<()> {
    let parent_id = id.to_string();

    sqlx::query(
        r#"
        INSERT INTO attributes (
            parent_id, amount, currency, end_to_end_reference, numeric_reference,
            payment_id, payment_purpose, payment_scheme, payment_type,
            processing_date, reference, scheme_payment_sub_type, scheme_payment_type
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&parent_id)
    .bind(&attributes.amount)
    .bind(&attributes.currency)
    .bind(&attributes.end_to_end_reference)
    .bind(&attributes.numeric_reference)
    .bind(&attributes.payment_id)
    .bind(&attributes.payment_purpose)
    .bind(&attributes.payment_scheme)
    .bind(&attributes.payment_type)
    .bind(&attributes.processing_date)
    .bind(&attributes.reference)
    .bind(&attributes.scheme_payment_sub_type)
    .bind(&attributes.scheme_payment_type)
    .execute(&mut *conn)
    .await?;

    let beneficiary = &attributes.beneficiary_party;
    sqlx::query(
        r#"
        INSERT INTO beneficiary_party (
            parent_id, account_name, account_number, account_number_code,
            account_type, address, bank_id, bank_id_code, name
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&parent_id)
    .bind(&beneficiary.account_name)
    .bind(&beneficiary.account_number)
    .bind(&beneficiary.account_number_code)
    .bind(beneficiary.account_type)
    .bind(&beneficiary.address)
    .bind(&beneficiary.bank_id)
    .bind(&beneficiary.bank_id_code)
    .bind(&beneficiary.name)
    .execute(&mut *conn)
    .await?;

    let debtor = &attributes.debtor_party;
    sqlx::query(
        r#"
        INSERT INTO debtor_party (
            parent_id, account_name, account_number, account_number_code,
            address, bank_id, bank_id_code, name
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&parent_id)
    .bind(&debtor.account_name)
    .bind(&debtor.account_number)
    .bind(&debtor.account_number_code)
    .bind(&debtor.address)
    .bind(&debtor.bank_id)
    .bind(&debtor.bank_id_code)
    .bind(&debtor.name)
    .execute(&mut *conn)
    .await?;

    let sponsor = &attributes.sponsor_party;
    sqlx::query(
        "INSERT INTO sponsor_party (parent_id, account_number, bank_id, bank_id_code) VALUES (?, ?, ?, ?)",
    )
    .bind(&parent_id)
    .bind(&sponsor.account_number)
    .bind(&sponsor.bank_id)
    .bind(&sponsor.bank_id_code)
    .execute(&mut *conn)
    .await?;

    let charges = &attributes.charges_information;
    sqlx::query(
        r#"
        INSERT INTO charges_information (
            parent_id, bearer_code, receiver_charges_amount, receiver_charges_currency
        ) VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&parent_id)
    .bind(&charges.bearer_code)
    .bind(&charges.receiver_charges_amount)
    .bind(&charges.receiver_charges_currency)
    .execute(&mut *conn)
    .await?;

    for (position, charge) in charges.sender_charges.iter().enumerate() {
        sqlx::query("INSERT INTO charge (parent_id, position, amount, currency) VALUES (?, ?, ?, ?)")
            .bind(&parent_id)
            .bind(position as i64)
            .bind(&charge.amount)
            .bind(&charge.currency)
            .execute(&mut *conn)
            .await?;
    }

    let fx = &attributes.fx;
    sqlx::query(
        r#"
        INSERT INTO fx (
            parent_id, contract_reference, exchange_rate, original_amount, original_currency
        ) VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&parent_id)
    .bind(&fx.contract_reference)
    .bind(&fx.exchange_rate)
    .bind(&fx.original_amount)
    .bind(&fx.original_currency)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Map a unique-key violation on the payment id to `AlreadyExists`.
///
/// Covers concurrent creates that both pass the existence check.
fn already_exists_or(err: sqlx::Error, id: Uuid) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::AlreadyExists(id),
        _ => StoreError::Database(err),
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

fn parse_uuid(column: &str, value: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| StoreError::Corrupt(format!("{column} is not a UUID ({value}): {e}")))
}

/// Build a payment from a [`SELECT_AGGREGATE`] row. Sender charges are
/// loaded separately.
fn payment_from_row(row: &SqliteRow) -> StoreResult<Payment> {
    let id: String = row.try_get("id")?;
    let organisation_id: String = row.try_get("organisation_id")?;

    Ok(Payment {
        id: parse_uuid("payments.id", &id)?,
        kind: row.try_get("type")?,
        version: row.try_get("version")?,
        organisation_id: parse_uuid("payments.organisation_id", &organisation_id)?,
        attributes: Attributes {
            amount: row.try_get("amount")?,
            beneficiary_party: BeneficiaryParty {
                account_name: row.try_get("b_account_name")?,
                account_number: row.try_get("b_account_number")?,
                account_number_code: row.try_get("b_account_number_code")?,
                account_type: row.try_get("b_account_type")?,
                address: row.try_get("b_address")?,
                bank_id: row.try_get("b_bank_id")?,
                bank_id_code: row.try_get("b_bank_id_code")?,
                name: row.try_get("b_name")?,
            },
            charges_information: ChargesInformation {
                bearer_code: row.try_get("c_bearer_code")?,
                sender_charges: Vec::new(),
                receiver_charges_amount: row.try_get("c_receiver_charges_amount")?,
                receiver_charges_currency: row.try_get("c_receiver_charges_currency")?,
            },
            currency: row.try_get("currency")?,
            debtor_party: DebtorParty {
                account_name: row.try_get("d_account_name")?,
                account_number: row.try_get("d_account_number")?,
                account_number_code: row.try_get("d_account_number_code")?,
                address: row.try_get("d_address")?,
                bank_id: row.try_get("d_bank_id")?,
                bank_id_code: row.try_get("d_bank_id_code")?,
                name: row.try_get("d_name")?,
            },
            end_to_end_reference: row.try_get("end_to_end_reference")?,
            fx: Fx {
                contract_reference: row.try_get("f_contract_reference")?,
                exchange_rate: row.try_get("f_exchange_rate")?,
                original_amount: row.try_get("f_original_amount")?,
                original_currency: row.try_get("f_original_currency")?,
            },
            numeric_reference: row.try_get("numeric_reference")?,
            payment_id: row.try_get("payment_id")?,
            payment_purpose: row.try_get("payment_purpose")?,
            payment_scheme: row.try_get("payment_scheme")?,
            payment_type: row.try_get("payment_type")?,
            processing_date: row.try_get("processing_date")?,
            reference: row.try_get("reference")?,
            scheme_payment_sub_type: row.try_get("scheme_payment_sub_type")?,
            scheme_payment_type: row.try_get("scheme_payment_type")?,
            sponsor_party: SponsorParty {
                account_number: row.try_get("s_account_number")?,
                bank_id: row.try_get("s_bank_id")?,
                bank_id_code: row.try_get("s_bank_id_code")?,
            },
        },
    })
}

fn charge_from_row(row: &SqliteRow) -> StoreResult<Charge> {
    Ok(Charge {
        amount: row.try_get("amount")?,
        currency: row.try_get("currency")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_payment, test_repository};

    #[tokio::test]
    async fn insert_then_fetch_returns_equal_payment() {
        let (_dir, repo) = test_repository().await;
        let payment = sample_payment();

        let stored = repo.insert(&payment).await.unwrap();
        assert_eq!(stored, payment);

        let loaded = repo.fetch_by_id(payment.id).await.unwrap();
        assert_eq!(loaded, payment);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_id() {
        let (_dir, repo) = test_repository().await;
        let payment = sample_payment();
        repo.insert(&payment).await.unwrap();

        let mut duplicate = sample_payment();
        duplicate.id = payment.id;

        let err = repo.insert(&duplicate).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(id) if id == payment.id));

        // Original is untouched.
        assert_eq!(repo.fetch_by_id(payment.id).await.unwrap(), payment);
    }

    #[tokio::test]
    async fn unique_violation_maps_to_already_exists() {
        let (_dir, repo) = test_repository().await;
        let payment = sample_payment();
        repo.insert(&payment).await.unwrap();

        // Bypass the existence check, as a racing create would.
        let err = sqlx::query("INSERT INTO payments (id, type, version, organisation_id) VALUES (?, '', 0, ?)")
            .bind(payment.id.to_string())
            .bind(Uuid::nil().to_string())
            .execute(&repo.pool)
            .await
            .unwrap_err();

        assert!(matches!(
            already_exists_or(err, payment.id),
            StoreError::AlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn missing_payment_is_not_found() {
        let (_dir, repo) = test_repository().await;
        let id = Uuid::new_v4();

        assert!(matches!(repo.fetch_by_id(id).await, Err(StoreError::NotFound(_))));
        assert!(matches!(repo.delete(id).await, Err(StoreError::NotFound(_))));
        assert!(matches!(
            repo.update(&Payment::with_id(id)).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(!repo.exists(id).await.unwrap());
    }

    #[tokio::test]
    async fn update_replaces_values_and_charges() {
        let (_dir, repo) = test_repository().await;
        let mut payment = sample_payment();
        repo.insert(&payment).await.unwrap();

        payment.version = 1;
        payment.attributes.amount = "250.00".into();
        payment.attributes.beneficiary_party.name = "Someone Else".into();
        payment.attributes.charges_information.sender_charges = vec![Charge {
            amount: "2.50".into(),
            currency: "EUR".into(),
        }];

        let updated = repo.update(&payment).await.unwrap();
        assert_eq!(updated, payment);
        assert_eq!(repo.fetch_by_id(payment.id).await.unwrap(), payment);
    }

    #[tokio::test]
    async fn delete_removes_whole_aggregate() {
        let (_dir, repo) = test_repository().await;
        let payment = sample_payment();
        repo.insert(&payment).await.unwrap();

        repo.delete(payment.id).await.unwrap();

        assert!(matches!(
            repo.fetch_by_id(payment.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(repo.delete(payment.id).await, Err(StoreError::NotFound(_))));

        for table in ["attributes", "beneficiary_party", "charge", "fx"] {
            let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(&repo.pool)
                .await
                .unwrap();
            assert_eq!(count, 0, "{table} still has rows");
        }
    }

    #[tokio::test]
    async fn fetch_all_tracks_creates_and_deletes() {
        let (_dir, repo) = test_repository().await;
        assert!(repo.fetch_all().await.unwrap().is_empty());

        let first = sample_payment();
        let second = sample_payment();
        let mut third = sample_payment();
        third.attributes.charges_information.sender_charges.clear();

        for payment in [&first, &second, &third] {
            repo.insert(payment).await.unwrap();
        }
        repo.delete(second.id).await.unwrap();

        let all = repo.fetch_all().await.unwrap();
        assert_eq!(all, vec![first, third]);
    }

    #[tokio::test]
    async fn corrupt_uuid_column_is_reported() {
        let (_dir, repo) = test_repository().await;
        let payment = sample_payment();
        repo.insert(&payment).await.unwrap();

        sqlx::query("UPDATE payments SET organisation_id = 'not-a-uuid' WHERE id = ?")
            .bind(payment.id.to_string())
            .execute(&repo.pool)
            .await
            .unwrap();

        assert!(matches!(
            repo.fetch_by_id(payment.id).await,
            Err(StoreError::Corrupt(_))
        ));
    }

    /// A payment whose attributes and charges carry the same marker, so a
    /// read that mixes two versions is detectable.
    fn marked(mut payment: Payment, marker: &str) -> Payment {
        payment.attributes.amount = marker.to_string();
        payment.attributes.charges_information.sender_charges = vec![
            Charge {
                amount: marker.to_string(),
                currency: "GBP".into(),
            };
            marker.len()
        ];
        payment
    }

    fn assert_consistent(payment: &Payment) {
        let charges = &payment.attributes.charges_information.sender_charges;
        assert_eq!(charges.len(), payment.attributes.amount.len());
        assert!(charges.iter().all(|c| c.amount == payment.attributes.amount));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn reads_never_mix_concurrent_updates() {
        let (_dir, repo) = test_repository().await;
        let base = sample_payment();
        repo.insert(&marked(base.clone(), "1")).await.unwrap();

        let writer = {
            let repo = repo.clone();
            let base = base.clone();
            tokio::spawn(async move {
                for round in 0..40 {
                    let marker = if round % 2 == 0 { "22" } else { "333" };
                    repo.update(&marked(base.clone(), marker)).await.unwrap();
                }
            })
        };

        for _ in 0..40 {
            assert_consistent(&repo.fetch_by_id(base.id).await.unwrap());
            for payment in repo.fetch_all().await.unwrap() {
                assert_consistent(&payment);
            }
        }

        writer.await.unwrap();
        assert_consistent(&repo.fetch_by_id(base.id).await.unwrap());
    }

    #[tokio::test]
    async fn ping_succeeds_on_open_pool() {
        let (_dir, repo) = test_repository().await;
        repo.ping().await.unwrap();
    }
}
