use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use minijinja::context;

use crate::core::error::Result;
use crate::core::extractor::AppForm;
use crate::core::session::Session;
use crate::core::templates::{user_context, Templates};
use crate::features::categories::dtos::CategoryForm;
use crate::features::categories::services::{CategoryService, SaveCategoryOutcome};
use crate::features::pages::services::PageService;
use crate::shared::constants::INDEX_URL;
use crate::shared::types::FieldErrors;
use crate::shared::validation::SLUG_REGEX;

/// State for category handlers
#[derive(Clone)]
pub struct CategoryState {
    pub category_service: Arc<CategoryService>,
    pub page_service: Arc<PageService>,
    pub templates: Arc<Templates>,
}

/// Show a category and its pages.
///
/// An unknown slug is not an error: the page renders its "no such
/// category" state with both `category` and `pages` null.
pub async fn show_category(
    State(state): State<CategoryState>,
    session: Session,
    Path(slug): Path<String>,
) -> Result<Html<String>> {
    let category = if SLUG_REGEX.is_match(&slug) {
        state.category_service.get_by_slug(&slug).await?
    } else {
        None
    };

    let pages = match &category {
        Some(category) => Some(state.page_service.list_by_category(category.id).await?),
        None => None,
    };

    let user = user_context(&*session.lock().await);
    Ok(state.templates.html(
        "rango/category.html",
        context! { category, pages, user },
    )?)
}

fn render_add_category(
    templates: &Templates,
    user: minijinja::Value,
    form: &CategoryForm,
    errors: &FieldErrors,
) -> Result<Response> {
    Ok(templates
        .html(
            "rango/add_category.html",
            context! { form, errors, user },
        )?
        .into_response())
}

pub async fn add_category_form(
    State(state): State<CategoryState>,
    session: Session,
) -> Result<Response> {
    let user = user_context(&*session.lock().await);
    render_add_category(
        &state.templates,
        user,
        &CategoryForm::default(),
        &FieldErrors::new(),
    )
}

/// Create a category, or update the counters of the one with that name
pub async fn add_category(
    State(state): State<CategoryState>,
    session: Session,
    AppForm(form): AppForm<CategoryForm>,
) -> Result<Response> {
    let user = user_context(&*session.lock().await);

    let category = match form.clean() {
        Ok(category) => category,
        Err(errors) => {
            tracing::debug!("Invalid category form: {}", errors);
            return render_add_category(&state.templates, user, &form, &errors);
        }
    };

    match state.category_service.save(&category).await? {
        SaveCategoryOutcome::Saved(_) => Ok(Redirect::to(INDEX_URL).into_response()),
        SaveCategoryOutcome::SlugTaken(existing) => {
            let mut errors = FieldErrors::new();
            errors.add(
                "name",
                format!(
                    "This name is too similar to the existing category '{}'.",
                    existing.name
                ),
            );
            render_add_category(&state.templates, user, &form, &errors)
        }
    }
}
