use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use eventra_core::models::{Event, EventDraft, Ticket};
use eventra_core::reservation::{EventStore, StoreError};

use crate::RedisClient;

pub struct PostgresEventStore {
    pub pool: PgPool,
    pub redis: RedisClient,
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: String,
    category_id: Uuid,
    max_seats: i32,
    booking_start: DateTime<Utc>,
    booking_end: DateTime<Utc>,
    event_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            title: row.title,
            description: row.description,
            category_id: row.category_id,
            max_seats: row.max_seats,
            booking_start: row.booking_start,
            booking_end: row.booking_end,
            event_date: row.event_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EventWithCategoryRow {
    id: Uuid,
    title: String,
    description: String,
    category_id: Uuid,
    category_name: String,
    max_seats: i32,
    booking_start: DateTime<Utc>,
    booking_end: DateTime<Utc>,
    event_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EventWithCategory {
    pub event: Event,
    pub category_name: String,
}

impl From<EventWithCategoryRow> for EventWithCategory {
    fn from(row: EventWithCategoryRow) -> Self {
        EventWithCategory {
            category_name: row.category_name,
            event: Event {
                id: row.id,
                title: row.title,
                description: row.description,
                category_id: row.category_id,
                max_seats: row.max_seats,
                booking_start: row.booking_start,
                booking_end: row.booking_end,
                event_date: row.event_date,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

impl PostgresEventStore {
    pub fn new(pool: PgPool, redis: RedisClient) -> Self {
        Self { pool, redis }
    }

    pub async fn create_event(&self, draft: &EventDraft) -> Result<Event, sqlx::Error> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO events (id, title, description, category_id, max_seats, booking_start, booking_end, event_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, description, category_id, max_seats, booking_start, booking_end, event_date, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.category_id)
        .bind(draft.max_seats)
        .bind(draft.booking_start)
        .bind(draft.booking_end)
        .bind(draft.event_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    pub async fn update_event(
        &self,
        id: Uuid,
        draft: &EventDraft,
    ) -> Result<Option<Event>, sqlx::Error> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE events
            SET title = $2, description = $3, category_id = $4, max_seats = $5,
                booking_start = $6, booking_end = $7, event_date = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, category_id, max_seats, booking_start, booking_end, event_date, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.category_id)
        .bind(draft.max_seats)
        .bind(draft.booking_start)
        .bind(draft.booking_end)
        .bind(draft.event_date)
        .fetch_optional(&self.pool)
        .await?;

        if row.is_some() {
            // Admin may have changed capacity; drop the stale cache entry.
            let _ = self.redis.delete_event_availability(&id.to_string()).await;
        }

        Ok(row.map(Into::into))
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            let _ = self.redis.delete_event_availability(&id.to_string()).await;
        }

        Ok(result.rows_affected() > 0)
    }

    pub async fn get_event_with_category(
        &self,
        id: Uuid,
    ) -> Result<Option<EventWithCategory>, sqlx::Error> {
        let row = sqlx::query_as::<_, EventWithCategoryRow>(
            r#"
            SELECT e.id, e.title, e.description, e.category_id, c.name AS category_name,
                   e.max_seats, e.booking_start, e.booking_end, e.event_date, e.created_at, e.updated_at
            FROM events e
            JOIN event_categories c ON e.category_id = c.id
            WHERE e.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// All events with their category names, newest event date first.
    /// Visibility and free-text filtering happen in the core filter.
    pub async fn list_events(&self) -> Result<Vec<EventWithCategory>, sqlx::Error> {
        let rows = sqlx::query_as::<_, EventWithCategoryRow>(
            r#"
            SELECT e.id, e.title, e.description, e.category_id, c.name AS category_name,
                   e.max_seats, e.booking_start, e.booking_end, e.event_date, e.created_at, e.updated_at
            FROM events e
            JOIN event_categories c ON e.category_id = c.id
            ORDER BY e.event_date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Remaining-seat read with cache: Redis hit, else SQL + seed
    /// (same shape as the availability lookup on the search path).
    pub async fn remaining_seats(&self, id: Uuid) -> Result<Option<i32>, sqlx::Error> {
        if let Ok(Some(cached)) = self.redis.get_event_availability(&id.to_string()).await {
            return Ok(Some(cached));
        }

        let remaining =
            sqlx::query_scalar::<_, i32>("SELECT max_seats FROM events WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        if let Some(count) = remaining {
            let _ = self
                .redis
                .set_event_availability(&id.to_string(), count)
                .await;
        }

        Ok(remaining)
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn get_event(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, title, description, category_id, max_seats, booking_start, booking_end, event_date, created_at, updated_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn book_ticket(&self, ticket: &Ticket) -> Result<Option<i32>, StoreError> {
        // Check and decrement in one statement. The WHERE guard is what
        // keeps concurrent bookings from overselling: the row update is
        // atomic per event, across every server process sharing the
        // database. The ticket row rides in the same transaction, so a
        // failed write rolls the decrement back and booked seats always
        // have a matching ticket.
        let mut tx = self.pool.begin().await?;

        let remaining = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE events
            SET max_seats = max_seats - $2, updated_at = NOW()
            WHERE id = $1 AND max_seats >= $2
            RETURNING max_seats
            "#,
        )
        .bind(ticket.event_id)
        .bind(ticket.ticket_count)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(remaining) = remaining else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            INSERT INTO tickets (id, event_id, user_id, ticket_count, booked_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(ticket.id)
        .bind(ticket.event_id)
        .bind(ticket.user_id)
        .bind(ticket.ticket_count)
        .bind(ticket.booked_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let _ = self
            .redis
            .decr_event_availability(&ticket.event_id.to_string(), ticket.ticket_count)
            .await;

        Ok(Some(remaining))
    }
}
