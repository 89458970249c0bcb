use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::shared::types::FieldErrors;
use crate::shared::validation::slugify;

/// Submitted "add category" form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CategoryForm {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 128,
        message = "Please enter a category name of at most 128 characters."
    ))]
    pub name: String,

    /// Raw counter input; parsed in `clean` so bad input becomes a field error
    #[serde(default)]
    pub views: Option<String>,

    #[serde(default)]
    pub likes: Option<String>,
}

/// Parse a non-negative counter; an absent field counts as 0
fn parse_counter(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    raw: Option<&str>,
) -> i32 {
    let Some(raw) = raw else {
        return 0;
    };

    match raw.trim().parse::<i32>() {
        Ok(value) if value >= 0 => value,
        Ok(_) => {
            errors.add(field, format!("{} cannot be negative.", label));
            0
        }
        Err(_) => {
            errors.add(field, "Enter a whole number.");
            0
        }
    }
}

/// Validated category ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub views: i32,
    pub likes: i32,
}

impl NewCategory {
    pub fn new(name: &str, views: i32, likes: i32) -> Self {
        Self {
            name: name.to_string(),
            slug: slugify(name),
            views,
            likes,
        }
    }
}

impl CategoryForm {
    /// Trim, validate and derive the slug
    pub fn clean(&self) -> Result<NewCategory, FieldErrors> {
        let trimmed = CategoryForm {
            name: self.name.trim().to_string(),
            ..self.clone()
        };

        let mut errors = match trimmed.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };

        let views = parse_counter(&mut errors, "views", "Views", self.views.as_deref());
        let likes = parse_counter(&mut errors, "likes", "Likes", self.likes.as_deref());

        let category = NewCategory::new(&trimmed.name, views, likes);
        if !trimmed.name.is_empty() && category.slug.is_empty() {
            errors.add("name", "The category name must contain letters or digits.");
        }

        errors.into_result(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str) -> CategoryForm {
        CategoryForm {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_derives_slug_and_trims() {
        let category = form("  Other Frameworks ").clean().unwrap();
        assert_eq!(category.name, "Other Frameworks");
        assert_eq!(category.slug, "other-frameworks");
        assert_eq!(category.views, 0);
        assert_eq!(category.likes, 0);
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let errors = form("   ").clean().unwrap_err();
        assert!(errors.has("name"));
    }

    #[test]
    fn test_name_too_long_is_rejected() {
        let errors = form(&"x".repeat(129)).clean().unwrap_err();
        assert!(errors.has("name"));
        assert!(form(&"x".repeat(128)).clean().is_ok());
    }

    #[test]
    fn test_name_without_slug_characters_is_rejected() {
        let errors = form("!!!").clean().unwrap_err();
        assert_eq!(
            errors.get("name"),
            ["The category name must contain letters or digits.".to_string()]
        );
    }

    #[test]
    fn test_negative_counters_are_rejected() {
        let errors = CategoryForm {
            name: "Rust".to_string(),
            views: Some("-1".to_string()),
            likes: Some("-2".to_string()),
        }
        .clean()
        .unwrap_err();
        assert_eq!(errors.get("views"), ["Views cannot be negative.".to_string()]);
        assert_eq!(errors.get("likes"), ["Likes cannot be negative.".to_string()]);
    }

    #[test]
    fn test_counters_must_be_whole_numbers() {
        for raw in ["", "abc", "1.5"] {
            let errors = CategoryForm {
                name: "Rust".to_string(),
                views: Some(raw.to_string()),
                likes: Some("0".to_string()),
            }
            .clean()
            .unwrap_err();
            assert_eq!(errors.get("views"), ["Enter a whole number.".to_string()]);
            assert!(!errors.has("likes"));
        }
    }

    #[test]
    fn test_counters_are_parsed() {
        let category = CategoryForm {
            name: "Python".to_string(),
            views: Some(" 128 ".to_string()),
            likes: Some("64".to_string()),
        }
        .clean()
        .unwrap();
        assert_eq!((category.views, category.likes), (128, 64));
    }
}
