// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::DataSignature,
    roles::{PrincipalType, Role},
    state::AppState,
    storage::RoleRecord,
};

pub mod health;
pub mod login;
pub mod owner;
pub mod roles;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/nonce", post(login::request_nonce))
        .route("/verify", post(login::verify_signature))
        .route("/logout", post(login::logout))
        .route("/me", get(login::me))
        .route(
            "/roles",
            get(roles::list_roles)
                .post(roles::grant_role)
                .delete(roles::revoke_role),
        )
        .route("/owner", post(owner::transfer_owner))
        .route("/owner-nft", post(owner::register_owner_nft))
        .route("/roles-fingerprint", post(roles::reconcile_roles))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    routes
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        login::request_nonce,
        login::verify_signature,
        login::logout,
        login::me,
        roles::list_roles,
        roles::grant_role,
        roles::revoke_role,
        roles::reconcile_roles,
        owner::transfer_owner,
        owner::register_owner_nft,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            RoleRecord,
            Role,
            PrincipalType,
            DataSignature,
            login::NonceRequest,
            login::NonceResponse,
            login::VerifyRequest,
            login::OkResponse,
            login::MeResponse,
            roles::RoleMutationRequest,
            roles::ReconcileResponse,
            owner::TransferOwnerRequest,
            owner::OwnerNftRequest,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Wallet challenge-response login and session state"),
        (name = "Roles", description = "Project role grants and ownership"),
        (name = "Health", description = "Service health and probes")
    )
)]
struct ApiDoc;
