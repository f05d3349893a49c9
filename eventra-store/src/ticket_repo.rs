use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use eventra_core::models::TicketDetail;

pub struct TicketRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct TicketDetailRow {
    ticket_id: Uuid,
    event_id: Uuid,
    user_id: Uuid,
    first_name: String,
    last_name: String,
    title: String,
    description: String,
    category: String,
    event_date: DateTime<Utc>,
    ticket_count: i32,
    booked_at: DateTime<Utc>,
}

impl From<TicketDetailRow> for TicketDetail {
    fn from(row: TicketDetailRow) -> Self {
        TicketDetail {
            ticket_id: row.ticket_id,
            event_id: row.event_id,
            user_id: row.user_id,
            user_name: format!("{} {}", row.first_name, row.last_name),
            title: row.title,
            description: row.description,
            category: row.category,
            event_date: row.event_date,
            ticket_count: row.ticket_count,
            booked_at: row.booked_at,
        }
    }
}

const DETAIL_SELECT: &str = r#"
    SELECT t.id AS ticket_id, t.event_id, t.user_id,
           u.first_name, u.last_name,
           e.title, e.description, c.name AS category, e.event_date,
           t.ticket_count, t.booked_at
    FROM tickets t
    JOIN users u ON t.user_id = u.id
    JOIN events e ON t.event_id = e.id
    JOIN event_categories c ON e.category_id = c.id
"#;

impl TicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A user's bookings, upcoming events first.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<TicketDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE t.user_id = $1 ORDER BY e.event_date DESC");
        let rows = sqlx::query_as::<_, TicketDetailRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, ticket_id: Uuid) -> Result<Option<TicketDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE t.id = $1");
        let row = sqlx::query_as::<_, TicketDetailRow>(&query)
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }
}
