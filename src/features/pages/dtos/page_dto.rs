use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::shared::types::FieldErrors;

/// Prefix scheme-less URLs with `http://`; blank input stays blank
pub fn normalize_url(raw: &str) -> String {
    let url = raw.trim();
    if url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

/// Submitted "add page" form.
///
/// Has no view count: pages added by visitors always start at 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageForm {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub url: String,
}

/// Validated page ready to be attached to a category
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewPage {
    #[validate(length(
        min = 1,
        max = 128,
        message = "Please enter a title of at most 128 characters."
    ))]
    pub title: String,

    #[validate(length(
        min = 1,
        max = 200,
        message = "Please enter a URL of at most 200 characters."
    ))]
    #[validate(url(message = "Enter a valid URL."))]
    pub url: String,

    #[validate(range(min = 0, message = "Views cannot be negative."))]
    pub views: i32,
}

impl PageForm {
    /// Trim the title, add a missing URL scheme, then validate
    pub fn clean(&self) -> Result<NewPage, FieldErrors> {
        let page = NewPage {
            title: self.title.trim().to_string(),
            url: normalize_url(&self.url),
            views: 0,
        };

        match page.validate() {
            Ok(()) => Ok(page),
            Err(e) => Err(e.into()),
        }
    }
}

/// Query of the outbound link tracker
#[derive(Debug, Deserialize)]
pub struct GotoQuery {
    pub page_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, url: &str) -> PageForm {
        PageForm {
            title: title.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("www.rust-lang.org"), "http://www.rust-lang.org");
        assert_eq!(normalize_url(" http://flask.pocoo.org "), "http://flask.pocoo.org");
        assert_eq!(normalize_url("https://docs.rs"), "https://docs.rs");
        assert_eq!(normalize_url("   "), "");
    }

    #[test]
    fn test_clean_adds_scheme() {
        let page = form("Rust", "www.rust-lang.org").clean().unwrap();
        assert_eq!(page.url, "http://www.rust-lang.org");
        assert_eq!(page.views, 0);
    }

    #[test]
    fn test_submitted_view_count_is_ignored() {
        let form: PageForm = serde_json::from_value(serde_json::json!({
            "title": "Book",
            "url": "https://doc.rust-lang.org/book/",
            "views": 9999,
        }))
        .unwrap();

        assert_eq!(form.clean().unwrap().views, 0);
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let errors = form("  ", "").clean().unwrap_err();
        assert!(errors.has("title"));
        assert!(errors.has("url"));
    }

    #[test]
    fn test_overlong_url_is_rejected() {
        let url = format!("http://example.com/{}", "a".repeat(200));
        let errors = form("Long", &url).clean().unwrap_err();
        assert!(errors.has("url"));
    }

    #[test]
    fn test_title_limit() {
        assert!(form(&"t".repeat(128), "http://example.com").clean().is_ok());
        assert!(form(&"t".repeat(129), "http://example.com")
            .clean()
            .unwrap_err()
            .has("title"));
    }
}
