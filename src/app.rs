//! Assembles the HTTP application from the feature routers.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::core::middleware::{MakeRequestUuid, MakeSpanWithRequestId};
use crate::core::session::{session_middleware, SessionStore};
use crate::core::templates::Templates;
use crate::features::accounts::{routes as accounts_routes, AccountService};
use crate::features::categories::{routes as categories_routes, CategoryService};
use crate::features::home::routes as home_routes;
use crate::features::pages::{routes as pages_routes, PageService};

/// Shared services the routers are built from
#[derive(Clone)]
pub struct AppServices {
    pub category_service: Arc<CategoryService>,
    pub page_service: Arc<PageService>,
    pub account_service: Arc<AccountService>,
    pub templates: Arc<Templates>,
    pub session_store: Arc<SessionStore>,
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Build the full application router
pub fn router(services: AppServices, max_request_body_size: usize) -> Router {
    let AppServices {
        category_service,
        page_service,
        account_service,
        templates,
        session_store,
    } = services;

    // Routes that require a logged-in user
    let protected_routes =
        accounts_routes::protected_routes(Arc::clone(&account_service), Arc::clone(&templates));

    let public_routes = Router::new()
        .merge(home_routes::routes(
            Arc::clone(&category_service),
            Arc::clone(&page_service),
            Arc::clone(&templates),
        ))
        .merge(categories_routes::routes(
            Arc::clone(&category_service),
            Arc::clone(&page_service),
            Arc::clone(&templates),
        ))
        .merge(pages_routes::routes(
            Arc::clone(&category_service),
            Arc::clone(&page_service),
            Arc::clone(&templates),
        ))
        .merge(accounts_routes::public_routes(account_service, templates));

    let health_route = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .layer(from_fn_with_state(session_store, session_middleware))
        .merge(health_route)
        .layer(DefaultBodyLimit::max(max_request_body_size))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
