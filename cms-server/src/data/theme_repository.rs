use crate::domain::{DomainError, ThemeImage};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait ThemeRepository: Send + Sync {
    async fn create(
        &self,
        uploaded_by: i64,
        title: &str,
        description: Option<&str>,
        image_url: &str,
    ) -> Result<ThemeImage, DomainError>;
    async fn list(&self) -> Result<Vec<ThemeImage>, DomainError>;
}

pub struct PostgresThemeRepository {
    pool: PgPool,
}

impl PostgresThemeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn theme_from_row(row: &sqlx::postgres::PgRow) -> Result<ThemeImage, DomainError> {
    Ok(ThemeImage {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        image_url: row.try_get("image_url")?,
        uploaded_by: row.try_get("uploaded_by")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl ThemeRepository for PostgresThemeRepository {
    async fn create(
        &self,
        uploaded_by: i64,
        title: &str,
        description: Option<&str>,
        image_url: &str,
    ) -> Result<ThemeImage, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO theme_images (title, description, image_url, uploaded_by, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, title, description, image_url, uploaded_by, created_at
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(image_url)
        .bind(uploaded_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store theme image metadata: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        theme_from_row(&row)
    }

    async fn list(&self) -> Result<Vec<ThemeImage>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, image_url, uploaded_by, created_at
            FROM theme_images
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        rows.iter().map(theme_from_row).collect()
    }
}
