// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Payment CRUD endpoints.
//!
//! Path identifiers and request bodies are parsed by hand rather than with
//! the `Path<Uuid>` / `Json<Payment>` extractors so that every rejection is
//! reported with the same `{"error": ...}` body as the other failures.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::{ApiError, ErrorBody},
    models::Payment,
    state::AppState,
    storage::StoreError,
};

pub const INVALID_ID: &str = "Invalid ID";
pub const UNDECODABLE_BODY: &str = "Could not decode request body";
pub const NOT_FOUND: &str = "Payment not found";
pub const ALREADY_EXISTS: &str = "Cannot create payment already exists";
pub const DELETE_NOT_FOUND: &str = "Payment not found cannot delete";
pub const UPDATE_ID_MISMATCH: &str =
    "Could not update payment - request id does not match update payment";
pub const UPDATE_NOT_FOUND: &str = "Could not update payment as not found";

fn parse_payment_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(INVALID_ID))
}

fn decode_payment(body: &[u8]) -> Result<Payment, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected request body");
        ApiError::bad_request(UNDECODABLE_BODY)
    })
}

fn storage_failure(err: StoreError, message: &'static str) -> ApiError {
    tracing::error!(error = %err, "{}", message);
    ApiError::internal(message)
}

#[utoipa::path(
    get,
    path = "/v1/payments/{payment_id}",
    params(
        ("payment_id" = String, Path, description = "Identifier (UUID) of the payment")
    ),
    tag = "Payments",
    responses(
        (status = 200, body = Payment),
        (status = 400, description = "Malformed identifier", body = ErrorBody),
        (status = 404, description = "Payment not found", body = ErrorBody),
        (status = 500, body = ErrorBody)
    )
)]
pub async fn get_payment(
    Path(payment_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Payment>, ApiError> {
    let id = parse_payment_id(&payment_id)?;

    match state.payments.fetch_by_id(id).await {
        Ok(payment) => Ok(Json(payment)),
        Err(StoreError::NotFound(_)) => Err(ApiError::not_found(NOT_FOUND)),
        Err(e) => Err(storage_failure(e, "Server failed to return payment")),
    }
}

/// Create a payment.
///
/// A duplicate identifier is reported as 400, not 409, for compatibility
/// with existing clients.
#[utoipa::path(
    post,
    path = "/v1/payments",
    request_body = Payment,
    tag = "Payments",
    responses(
        (status = 201, body = Payment),
        (status = 400, description = "Malformed body or payment already exists", body = ErrorBody),
        (status = 500, body = ErrorBody)
    )
)]
pub async fn create_payment(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let payment = decode_payment(&body)?;

    match state.payments.insert(&payment).await {
        Ok(stored) => {
            tracing::info!(payment_id = %stored.id, "Payment created");
            Ok((StatusCode::CREATED, Json(stored)))
        }
        Err(StoreError::AlreadyExists(_)) => Err(ApiError::bad_request(ALREADY_EXISTS)),
        Err(e) => Err(storage_failure(e, "Could not insert payment")),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/payments/{payment_id}",
    params(
        ("payment_id" = String, Path, description = "Identifier (UUID) of the payment to delete")
    ),
    tag = "Payments",
    responses(
        (status = 200, description = "Payment deleted"),
        (status = 400, description = "Malformed identifier", body = ErrorBody),
        (status = 404, description = "Payment not found", body = ErrorBody),
        (status = 500, body = ErrorBody)
    )
)]
pub async fn delete_payment(
    Path(payment_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let id = parse_payment_id(&payment_id)?;

    match state.payments.delete(id).await {
        Ok(()) => {
            tracing::info!(payment_id = %id, "Payment deleted");
            Ok(StatusCode::OK)
        }
        Err(StoreError::NotFound(_)) => Err(ApiError::not_found(DELETE_NOT_FOUND)),
        Err(e) => Err(storage_failure(e, "Payment could not be deleted")),
    }
}

/// Replace a payment.
///
/// The body must carry the same identifier as the path; a mismatch is
/// rejected before storage is touched.
#[utoipa::path(
    put,
    path = "/v1/payments/{payment_id}",
    params(
        ("payment_id" = String, Path, description = "Identifier (UUID) of the payment to update")
    ),
    request_body = Payment,
    tag = "Payments",
    responses(
        (status = 201, body = Payment),
        (status = 400, description = "Malformed identifier or body, or identifier mismatch", body = ErrorBody),
        (status = 404, description = "Payment not found", body = ErrorBody),
        (status = 500, body = ErrorBody)
    )
)]
pub async fn update_payment(
    Path(payment_id): Path<String>,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let id = parse_payment_id(&payment_id)?;
    let payment = decode_payment(&body)?;

    if payment.id != id {
        return Err(ApiError::bad_request(UPDATE_ID_MISMATCH));
    }

    match state.payments.update(&payment).await {
        Ok(updated) => {
            tracing::info!(payment_id = %id, "Payment updated");
            Ok((StatusCode::CREATED, Json(updated)))
        }
        Err(StoreError::NotFound(_)) => Err(ApiError::not_found(UPDATE_NOT_FOUND)),
        Err(e) => Err(storage_failure(e, "Could not update payment")),
    }
}

#[utoipa::path(
    get,
    path = "/v1/payments",
    tag = "Payments",
    responses(
        (status = 200, body = [Payment]),
        (status = 500, body = ErrorBody)
    )
)]
pub async fn list_payments(State(state): State<AppState>) -> Result<Json<Vec<Payment>>, ApiError> {
    state
        .payments
        .fetch_all()
        .await
        .map(Json)
        .map_err(|e| storage_failure(e, "Could not get all payments"))
}
