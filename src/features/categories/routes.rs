use std::sync::Arc;

use axum::{routing::get, Router};

use crate::core::templates::Templates;
use crate::features::categories::handlers::{self, CategoryState};
use crate::features::categories::services::CategoryService;
use crate::features::pages::services::PageService;

/// Create routes for the categories feature
///
/// Note: This feature is public (no authentication required)
pub fn routes(
    category_service: Arc<CategoryService>,
    page_service: Arc<PageService>,
    templates: Arc<Templates>,
) -> Router {
    let state = CategoryState {
        category_service,
        page_service,
        templates,
    };

    Router::new()
        .route("/category/{slug}/", get(handlers::show_category))
        .route(
            "/add_category/",
            get(handlers::add_category_form).post(handlers::add_category),
        )
        .with_state(state)
}
