use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the one-to-one account extension
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub website: String,
    /// Public URL of the uploaded picture
    pub picture: Option<String>,
}
