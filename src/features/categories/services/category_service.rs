use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::NewCategory;
use crate::features::categories::models::Category;

const CATEGORY_COLUMNS: &str = "id, name, slug, views, likes, created_at, updated_at";

/// Result of saving a category by name
#[derive(Debug)]
pub enum SaveCategoryOutcome {
    /// Inserted, or the existing row with that name was updated
    Saved(Category),
    /// Another category (different name) already owns the derived slug
    SlugTaken(Category),
}

/// Service for category operations
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Most liked categories first
    pub async fn list_top_by_likes(&self, limit: i64) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY likes DESC, name LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list top categories: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Get category by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category by slug: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Create the category, or update the counters of the one with the same name
    pub async fn save(&self, category: &NewCategory) -> Result<SaveCategoryOutcome> {
        let mut tx = self.pool.begin().await?;

        let slug_owner = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1 AND name <> $2"
        ))
        .bind(&category.slug)
        .bind(&category.name)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(existing) = slug_owner {
            tracing::debug!(
                "Slug '{}' already used by category '{}'",
                category.slug,
                existing.name
            );
            return Ok(SaveCategoryOutcome::SlugTaken(existing));
        }

        let saved = sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (id, name, slug, views, likes)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (name) DO UPDATE
            SET slug = EXCLUDED.slug,
                views = EXCLUDED.views,
                likes = EXCLUDED.likes,
                updated_at = NOW()
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(&category.name)
        .bind(&category.slug)
        .bind(category.views)
        .bind(category.likes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save category '{}': {:?}", category.name, e);
            AppError::Database(e)
        })?;

        tx.commit().await?;

        tracing::info!("Saved category '{}' ({})", saved.name, saved.slug);
        Ok(SaveCategoryOutcome::Saved(saved))
    }
}
