/// Number of categories shown on the index page
pub const TOP_CATEGORIES_LIMIT: i64 = 5;

/// Number of pages shown on the index page
pub const TOP_PAGES_LIMIT: i64 = 5;

pub const INDEX_URL: &str = "/";
pub const LOGIN_URL: &str = "/login/";

// =============================================================================
// UPLOADS
// =============================================================================

/// Maximum profile picture size (5MB)
pub const MAX_PICTURE_SIZE: usize = 5 * 1024 * 1024;

/// MIME types accepted for profile pictures
pub const ALLOWED_PICTURE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Storage directory for uploaded profile pictures
pub const PROFILE_IMAGE_DIR: &str = "profile_images";

// =============================================================================
// SESSION KEYS
// =============================================================================

pub const VISITS_KEY: &str = "visits";
pub const LAST_VISIT_KEY: &str = "last_visit";
