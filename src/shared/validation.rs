use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating category slugs as they appear in URLs
    /// - Valid: "python", "other-frameworks", "web_2"
    /// - Invalid: "-python", "python-", "Python", "python frameworks"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9_]+(?:-[a-z0-9_]+)*$").unwrap();

    /// Regex for validating username fields
    /// Letters, digits and @/./+/-/_ only
    /// - Valid: "john_doe", "user123", "j.doe@home", "a+b"
    /// - Invalid: "user name", "user!", "ünïcode"
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9@.+_-]+$").unwrap();

    static ref SLUG_STRIP_REGEX: Regex = Regex::new(r"[^a-z0-9_\s-]").unwrap();
    static ref SLUG_SEPARATOR_REGEX: Regex = Regex::new(r"[-\s]+").unwrap();
}

/// Derive a URL-safe slug from a human readable name.
///
/// Lowercases, drops non-ASCII and punctuation, and collapses runs of
/// whitespace and hyphens into one hyphen. May return an empty string.
pub fn slugify(value: &str) -> String {
    let ascii: String = value
        .chars()
        .filter(char::is_ascii)
        .collect::<String>()
        .to_lowercase();
    let stripped = SLUG_STRIP_REGEX.replace_all(&ascii, "");

    SLUG_SEPARATOR_REGEX
        .replace_all(&stripped, "-")
        .trim_matches(|c| c == '-' || c == '_')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Python"), "python");
        assert_eq!(slugify("Other Frameworks"), "other-frameworks");
        assert_eq!(slugify("  C++ & Rust!  "), "c-rust");
        assert_eq!(slugify("a -- b"), "a-b");
        assert_eq!(slugify("_under_score_"), "under_score");
        assert_eq!(slugify("Café"), "caf");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_output_matches_slug_regex() {
        for name in ["Python", "Other Frameworks", "Web 2.0", "snake_case name"] {
            let slug = slugify(name);
            assert!(SLUG_REGEX.is_match(&slug), "{:?} -> {:?}", name, slug);
        }
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-python")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("python-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("Python")); // uppercase
        assert!(!SLUG_REGEX.is_match("python frameworks")); // space
        assert!(!SLUG_REGEX.is_match("")); // empty
    }

    #[test]
    fn test_username_regex() {
        assert!(USERNAME_REGEX.is_match("john_doe"));
        assert!(USERNAME_REGEX.is_match("j.doe@home"));
        assert!(USERNAME_REGEX.is_match("a+b-c"));
        assert!(!USERNAME_REGEX.is_match("user name"));
        assert!(!USERNAME_REGEX.is_match("user!"));
        assert!(!USERNAME_REGEX.is_match(""));
    }
}
