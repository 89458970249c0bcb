use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::pages::dtos::NewPage;
use crate::features::pages::models::Page;

const PAGE_COLUMNS: &str = "id, category_id, title, url, views, created_at, updated_at";

/// Service for page operations
pub struct PageService {
    pool: PgPool,
}

impl PageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Most viewed pages across all categories
    pub async fn list_top_by_views(&self, limit: i64) -> Result<Vec<Page>> {
        sqlx::query_as::<_, Page>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages ORDER BY views DESC, title LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list top pages: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn list_by_category(&self, category_id: Uuid) -> Result<Vec<Page>> {
        sqlx::query_as::<_, Page>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE category_id = $1 ORDER BY views DESC, title"
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list pages of category {}: {:?}", category_id, e);
            AppError::Database(e)
        })
    }

    /// Attach a page to a category.
    ///
    /// New pages start with no views. A page with the same title in the
    /// category gets the new URL and keeps its view count.
    pub async fn add_to_category(&self, category_id: Uuid, page: &NewPage) -> Result<Page> {
        let saved = sqlx::query_as::<_, Page>(&format!(
            r#"
            INSERT INTO pages (id, category_id, title, url, views)
            VALUES ($1, $2, $3, $4, 0)
            ON CONFLICT (category_id, title) DO UPDATE
            SET url = EXCLUDED.url,
                updated_at = NOW()
            RETURNING {PAGE_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(category_id)
        .bind(&page.title)
        .bind(&page.url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to add page '{}': {:?}", page.title, e);
            AppError::Database(e)
        })?;

        tracing::info!("Added page '{}' to category {}", saved.title, category_id);
        Ok(saved)
    }

    /// Create or overwrite a page, including its view count
    pub async fn upsert(&self, category_id: Uuid, page: &NewPage) -> Result<Page> {
        sqlx::query_as::<_, Page>(&format!(
            r#"
            INSERT INTO pages (id, category_id, title, url, views)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (category_id, title) DO UPDATE
            SET url = EXCLUDED.url,
                views = EXCLUDED.views,
                updated_at = NOW()
            RETURNING {PAGE_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(category_id)
        .bind(&page.title)
        .bind(&page.url)
        .bind(page.views)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert page '{}': {:?}", page.title, e);
            AppError::Database(e)
        })
    }

    /// Count one click-through; `None` when the page does not exist
    pub async fn record_view(&self, id: Uuid) -> Result<Option<Page>> {
        sqlx::query_as::<_, Page>(&format!(
            "UPDATE pages SET views = views + 1 WHERE id = $1 RETURNING {PAGE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record view of page {}: {:?}", id, e);
            AppError::Database(e)
        })
    }
}
