use std::sync::Arc;

use axum::{routing::get, Router};

use crate::core::templates::Templates;
use crate::features::categories::services::CategoryService;
use crate::features::home::handlers::{self, HomeState};
use crate::features::pages::services::PageService;

/// Create routes for the landing and about pages
pub fn routes(
    category_service: Arc<CategoryService>,
    page_service: Arc<PageService>,
    templates: Arc<Templates>,
) -> Router {
    let state = HomeState {
        category_service,
        page_service,
        templates,
    };

    Router::new()
        .route("/", get(handlers::index))
        .route("/about/", get(handlers::about))
        .with_state(state)
}
