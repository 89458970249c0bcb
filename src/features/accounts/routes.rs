use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};

use crate::core::middleware::login_required;
use crate::core::templates::Templates;
use crate::features::accounts::handlers::{self, AccountState};
use crate::features::accounts::services::AccountService;
use crate::shared::constants::MAX_PICTURE_SIZE;

/// Registration and login, open to everyone
pub fn public_routes(account_service: Arc<AccountService>, templates: Arc<Templates>) -> Router {
    let state = AccountState {
        account_service,
        templates,
    };

    Router::new()
        .route(
            "/register/",
            // Allow the picture plus a buffer for the other fields and multipart overhead
            get(handlers::register_form)
                .post(handlers::register)
                .layer(DefaultBodyLimit::max(MAX_PICTURE_SIZE + 1024 * 1024)),
        )
        .route("/login/", get(handlers::login_form).post(handlers::login))
        .with_state(state)
}

/// Routes that need a logged-in user
pub fn protected_routes(account_service: Arc<AccountService>, templates: Arc<Templates>) -> Router {
    let state = AccountState {
        account_service,
        templates,
    };

    Router::new()
        .route("/logout/", get(handlers::logout))
        .route("/restricted/", get(handlers::restricted))
        .route_layer(middleware::from_fn(login_required))
        .with_state(state)
}
