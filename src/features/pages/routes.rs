use std::sync::Arc;

use axum::{routing::get, Router};

use crate::core::templates::Templates;
use crate::features::categories::services::CategoryService;
use crate::features::pages::handlers::{self, PageState};
use crate::features::pages::services::PageService;

/// Create routes for the pages feature
pub fn routes(
    category_service: Arc<CategoryService>,
    page_service: Arc<PageService>,
    templates: Arc<Templates>,
) -> Router {
    let state = PageState {
        category_service,
        page_service,
        templates,
    };

    Router::new()
        .route(
            "/category/{slug}/add_page/",
            get(handlers::add_page_form).post(handlers::add_page),
        )
        .route("/goto/", get(handlers::goto))
        .with_state(state)
}
