use std::sync::Arc;

use axum::{extract::State, response::Html};
use chrono::Utc;
use minijinja::context;

use crate::core::error::Result;
use crate::core::session::Session;
use crate::core::templates::{user_context, Templates};
use crate::features::categories::services::CategoryService;
use crate::features::pages::services::PageService;
use crate::features::visits::visitor_cookie_handler;
use crate::shared::constants::{TOP_CATEGORIES_LIMIT, TOP_PAGES_LIMIT};

/// State for the landing and about pages
#[derive(Clone)]
pub struct HomeState {
    pub category_service: Arc<CategoryService>,
    pub page_service: Arc<PageService>,
    pub templates: Arc<Templates>,
}

/// Landing page: most liked categories, most viewed pages and the visit count
pub async fn index(State(state): State<HomeState>, session: Session) -> Result<Html<String>> {
    let categories = state
        .category_service
        .list_top_by_likes(TOP_CATEGORIES_LIMIT)
        .await?;
    let pages = state.page_service.list_top_by_views(TOP_PAGES_LIMIT).await?;

    let (visits, user) = {
        let mut session = session.lock().await;
        let visits = visitor_cookie_handler(&mut session, Utc::now());
        (visits, user_context(&session))
    };

    Ok(state.templates.html(
        "rango/index.html",
        context! { categories, pages, visits, user },
    )?)
}

pub async fn about(State(state): State<HomeState>, session: Session) -> Result<Html<String>> {
    let (visits, user) = {
        let mut session = session.lock().await;
        let visits = visitor_cookie_handler(&mut session, Utc::now());
        (visits, user_context(&session))
    };

    Ok(state
        .templates
        .html("rango/about.html", context! { visits, user })?)
}
