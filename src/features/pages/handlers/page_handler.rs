use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderValue,
    response::{IntoResponse, Redirect, Response},
};
use minijinja::context;
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppForm;
use crate::core::session::Session;
use crate::core::templates::{user_context, Templates};
use crate::features::categories::models::Category;
use crate::features::categories::services::CategoryService;
use crate::features::pages::dtos::{GotoQuery, PageForm};
use crate::features::pages::services::PageService;
use crate::shared::constants::INDEX_URL;
use crate::shared::types::FieldErrors;
use crate::shared::validation::SLUG_REGEX;

/// State for page handlers
#[derive(Clone)]
pub struct PageState {
    pub category_service: Arc<CategoryService>,
    pub page_service: Arc<PageService>,
    pub templates: Arc<Templates>,
}

async fn resolve_category(state: &PageState, slug: &str) -> Result<Option<Category>> {
    if !SLUG_REGEX.is_match(slug) {
        return Ok(None);
    }
    state.category_service.get_by_slug(slug).await
}

fn render_add_page(
    templates: &Templates,
    user: minijinja::Value,
    category: Option<&Category>,
    form: &PageForm,
    errors: &FieldErrors,
) -> Result<Response> {
    Ok(templates
        .html(
            "rango/add_page.html",
            context! { category, form, errors, user },
        )?
        .into_response())
}

/// Show the "add page" form; an unknown slug renders it without a category
pub async fn add_page_form(
    State(state): State<PageState>,
    session: Session,
    Path(slug): Path<String>,
) -> Result<Response> {
    let category = resolve_category(&state, &slug).await?;
    let user = user_context(&*session.lock().await);
    render_add_page(
        &state.templates,
        user,
        category.as_ref(),
        &PageForm::default(),
        &FieldErrors::new(),
    )
}

/// Attach a new page to the category, then go back to the category
pub async fn add_page(
    State(state): State<PageState>,
    session: Session,
    Path(slug): Path<String>,
    AppForm(form): AppForm<PageForm>,
) -> Result<Response> {
    let user = user_context(&*session.lock().await);

    let Some(category) = resolve_category(&state, &slug).await? else {
        tracing::debug!("Page submitted for unknown category '{}'", slug);
        return render_add_page(&state.templates, user, None, &form, &FieldErrors::new());
    };

    let page = match form.clean() {
        Ok(page) => page,
        Err(errors) => {
            tracing::debug!("Invalid page form: {}", errors);
            return render_add_page(&state.templates, user, Some(&category), &form, &errors);
        }
    };

    state.page_service.add_to_category(category.id, &page).await?;
    Ok(Redirect::to(&format!("/category/{}/", category.slug)).into_response())
}

/// Count a click-through and send the visitor on to the page's URL
pub async fn goto(
    State(state): State<PageState>,
    Query(query): Query<GotoQuery>,
) -> Result<Redirect> {
    let Some(id) = query
        .page_id
        .as_deref()
        .and_then(|raw| Uuid::parse_str(raw).ok())
    else {
        return Ok(Redirect::to(INDEX_URL));
    };

    match state.page_service.record_view(id).await? {
        Some(page) if HeaderValue::from_str(&page.url).is_ok() => Ok(Redirect::to(&page.url)),
        Some(page) => {
            tracing::warn!("Page {} has a URL that cannot be redirected to", page.id);
            Ok(Redirect::to(INDEX_URL))
        }
        None => {
            tracing::debug!("goto for unknown page {}", id);
            Ok(Redirect::to(INDEX_URL))
        }
    }
}
