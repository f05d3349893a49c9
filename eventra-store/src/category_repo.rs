use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use eventra_core::models::EventCategory;

pub struct CategoryRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    code: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for EventCategory {
    fn from(row: CategoryRow) -> Self {
        EventCategory {
            id: row.id,
            name: row.name,
            code: row.code,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<EventCategory>, sqlx::Error> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, code, created_at, updated_at FROM event_categories ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<EventCategory>, sqlx::Error> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, code, created_at, updated_at FROM event_categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn create(&self, name: &str, code: &str) -> Result<EventCategory, sqlx::Error> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO event_categories (id, name, code)
            VALUES ($1, $2, $3)
            RETURNING id, name, code, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(code)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    pub async fn update(
        &self,
        id: Uuid,
        name: &str,
        code: &str,
    ) -> Result<Option<EventCategory>, sqlx::Error> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            UPDATE event_categories
            SET name = $2, code = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, code, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM event_categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
