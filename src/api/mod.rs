// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ErrorBody,
    models::{
        Attributes, BeneficiaryParty, Charge, ChargesInformation, DebtorParty, Fx, Payment,
        SponsorParty,
    },
    state::AppState,
};

pub mod health;
pub mod payments;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route(
            "/payments",
            get(payments::list_payments).post(payments::create_payment),
        )
        .route(
            "/payments/{payment_id}",
            get(payments::get_payment)
                .put(payments::update_payment)
                .delete(payments::delete_payment),
        )
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        payments::get_payment,
        payments::create_payment,
        payments::delete_payment,
        payments::update_payment,
        payments::list_payments,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Payment,
            Attributes,
            BeneficiaryParty,
            DebtorParty,
            SponsorParty,
            ChargesInformation,
            Charge,
            Fx,
            ErrorBody,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "Payments", description = "Payment records"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
