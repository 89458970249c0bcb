use std::sync::Arc;

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use minijinja::context;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppForm;
use crate::core::middleware::safe_next_path;
use crate::core::session::Session;
use crate::core::templates::{user_context, Templates};
use crate::features::accounts::dtos::{LoginForm, LoginQuery, RegisterForms, UploadedPicture};
use crate::features::accounts::services::{AccountService, LoginOutcome, RegisterOutcome};
use crate::shared::constants::INDEX_URL;
use crate::shared::types::FieldErrors;

pub const INVALID_LOGIN_MESSAGE: &str = "Invalid login details supplied.";
pub const DISABLED_ACCOUNT_MESSAGE: &str = "Your Rango account is disabled.";

/// State for account handlers
#[derive(Clone)]
pub struct AccountState {
    pub account_service: Arc<AccountService>,
    pub templates: Arc<Templates>,
}

fn render_register(
    templates: &Templates,
    user: minijinja::Value,
    forms: &RegisterForms,
    errors: &FieldErrors,
    registered: bool,
) -> Result<Response> {
    let user_form = &forms.user;
    let profile_form = &forms.profile;
    Ok(templates
        .html(
            "rango/register.html",
            context! { user_form, profile_form, errors, registered, user },
        )?
        .into_response())
}

fn render_login(
    templates: &Templates,
    user: minijinja::Value,
    username: &str,
    next: Option<&str>,
    error: Option<&str>,
) -> Result<Response> {
    Ok(templates
        .html(
            "rango/login.html",
            context! { username, next, error, user },
        )?
        .into_response())
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    let name = field.name().unwrap_or("").to_string();
    field.text().await.map_err(|e| {
        debug!("Failed to read multipart field {}: {}", name, e);
        AppError::BadRequest(format!("Failed to read {} field: {}", name, e))
    })
}

/// Collect both registration forms from a multipart body
async fn read_register_forms(mut multipart: Multipart) -> Result<RegisterForms> {
    let mut forms = RegisterForms::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "username" => forms.user.username = read_text(field).await?,
            "email" => forms.user.email = read_text(field).await?,
            "password" => forms.user.password = read_text(field).await?,
            "website" => forms.profile.website = read_text(field).await?,
            "picture" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field.bytes().await?;

                // Browsers send an empty part when no file was chosen
                if !file_name.is_empty() || !data.is_empty() {
                    forms.picture = Some(UploadedPicture {
                        file_name,
                        content_type,
                        data: data.to_vec(),
                    });
                }
            }
            _ => debug!("Ignoring unknown field: {}", field_name),
        }
    }

    Ok(forms)
}

pub async fn register_form(
    State(state): State<AccountState>,
    session: Session,
) -> Result<Response> {
    let user = user_context(&*session.lock().await);
    render_register(
        &state.templates,
        user,
        &RegisterForms::default(),
        &FieldErrors::new(),
        false,
    )
}

/// Create an account with its profile from the two registration forms
pub async fn register(
    State(state): State<AccountState>,
    session: Session,
    multipart: Multipart,
) -> Result<Response> {
    let forms = read_register_forms(multipart).await?;
    let user = user_context(&*session.lock().await);

    let registration = match forms.clean() {
        Ok(registration) => registration,
        Err(errors) => {
            debug!("Invalid registration: {}", errors);
            return render_register(&state.templates, user, &forms, &errors, false);
        }
    };

    match state.account_service.register(registration).await? {
        RegisterOutcome::Registered(_) => {
            render_register(&state.templates, user, &forms, &FieldErrors::new(), true)
        }
        RegisterOutcome::UsernameTaken => {
            let mut errors = FieldErrors::new();
            errors.add("username", "A user with that username already exists.");
            debug!("Registration with taken username {}", forms.user.username);
            render_register(&state.templates, user, &forms, &errors, false)
        }
    }
}

pub async fn login_form(
    State(state): State<AccountState>,
    session: Session,
    Query(query): Query<LoginQuery>,
) -> Result<Response> {
    let user = user_context(&*session.lock().await);
    let next = safe_next_path(query.next.as_deref());
    render_login(&state.templates, user, "", next.as_deref(), None)
}

/// Log in and go back to `next`, or to the index page
pub async fn login(
    State(state): State<AccountState>,
    session: Session,
    AppForm(form): AppForm<LoginForm>,
) -> Result<Response> {
    let next = safe_next_path(form.next.as_deref());

    match state
        .account_service
        .authenticate(form.username.trim(), &form.password)
        .await?
    {
        LoginOutcome::Authenticated(account) => {
            session.lock().await.login(account.id, &account.username);
            tracing::info!("User {} logged in", account.username);
            Ok(Redirect::to(next.as_deref().unwrap_or(INDEX_URL)).into_response())
        }
        LoginOutcome::Inactive => {
            tracing::info!("Login attempt for disabled account {}", form.username);
            Ok((StatusCode::FORBIDDEN, DISABLED_ACCOUNT_MESSAGE).into_response())
        }
        LoginOutcome::InvalidCredentials => {
            debug!("Invalid login details for {}", form.username);
            let user = user_context(&*session.lock().await);
            render_login(
                &state.templates,
                user,
                form.username.trim(),
                next.as_deref(),
                Some(INVALID_LOGIN_MESSAGE),
            )
        }
    }
}

pub async fn logout(session: Session) -> Redirect {
    session.lock().await.flush();
    Redirect::to(INDEX_URL)
}

pub async fn restricted(
    State(state): State<AccountState>,
    session: Session,
) -> Result<Html<String>> {
    let session = session.lock().await;
    let user = user_context(&session);
    let username = session.username();
    Ok(state
        .templates
        .html("rango/restricted.html", context! { username, user })?)
}
