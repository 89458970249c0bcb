//! HTML template rendering using Jinja2 syntax.
//!
//! Page templates live under `templates/` and are compiled into the binary,
//! so rendering never depends on the working directory.

use axum::response::Html;
use minijinja::{context, Environment, UndefinedBehavior, Value};
use serde::Serialize;
use thiserror::Error;

use crate::core::session::SessionData;

/// Every template the site renders, keyed by its name relative to `templates/`
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    (
        "rango/index.html",
        include_str!("../../templates/rango/index.html"),
    ),
    (
        "rango/about.html",
        include_str!("../../templates/rango/about.html"),
    ),
    (
        "rango/category.html",
        include_str!("../../templates/rango/category.html"),
    ),
    (
        "rango/add_category.html",
        include_str!("../../templates/rango/add_category.html"),
    ),
    (
        "rango/add_page.html",
        include_str!("../../templates/rango/add_page.html"),
    ),
    (
        "rango/register.html",
        include_str!("../../templates/rango/register.html"),
    ),
    (
        "rango/login.html",
        include_str!("../../templates/rango/login.html"),
    ),
    (
        "rango/restricted.html",
        include_str!("../../templates/rango/restricted.html"),
    ),
];

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to load template: {0}")]
    LoadError(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

/// Compiled template environment shared by all handlers
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        // Pages rendered without a `user` still get the anonymous navigation
        env.set_undefined_behavior(UndefinedBehavior::Chainable);

        for &(name, source) in TEMPLATES {
            env.add_template(name, source)
                .map_err(|e| TemplateError::LoadError(format!("{}: {}", name, e)))?;
            tracing::debug!("Loaded template: {}", name);
        }

        Ok(Self { env })
    }

    /// Render a template with the given context.
    ///
    /// Templates ending in `.html` are auto-escaped.
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, TemplateError> {
        let template = self
            .env
            .get_template(name)
            .map_err(|_| TemplateError::NotFound(name.to_string()))?;

        template
            .render(ctx)
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }

    /// Render straight into an HTML response body
    pub fn html<S: Serialize>(&self, name: &str, ctx: S) -> Result<Html<String>, TemplateError> {
        self.render(name, ctx).map(Html)
    }

    /// Check if a template exists
    #[cfg(test)]
    pub fn exists(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }
}

/// The `user` object every page receives for the navigation bar
pub fn user_context(session: &SessionData) -> Value {
    context! {
        is_authenticated => session.is_authenticated(),
        username => session.username(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_load() {
        let templates = Templates::new().unwrap();
        for &(name, _) in TEMPLATES {
            assert!(templates.exists(name), "{} should be registered", name);
        }
    }

    #[test]
    fn test_missing_template() {
        let templates = Templates::new().unwrap();
        let result = templates.render("rango/nope.html", context! {});
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_html_is_escaped() {
        let templates = Templates::new().unwrap();
        let body = templates
            .render(
                "rango/category.html",
                context! {
                    category => context! { name => "<script>", slug => "script" },
                    pages => Vec::<()>::new(),
                },
            )
            .unwrap();
        assert!(body.contains("&lt;script&gt;"));
        assert!(!body.contains("<script>"));
    }

    #[test]
    fn test_category_not_found_state() {
        let templates = Templates::new().unwrap();
        let body = templates
            .render(
                "rango/category.html",
                context! { category => (), pages => () },
            )
            .unwrap();
        assert!(body.contains("The specified category does not exist."));
    }
}
