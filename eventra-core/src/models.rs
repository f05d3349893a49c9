use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_digest: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCategory {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An event with its remaining bookable capacity. `max_seats` is the
/// seats still available, not the original room size; only the
/// reservation core may decrement it and nothing increments it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category_id: Uuid,
    pub max_seats: i32,
    pub booking_start: DateTime<Utc>,
    pub booking_end: DateTime<Utc>,
    pub event_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Incoming payload for event create/update, validated before it
/// touches the store.
#[derive(Debug, Clone, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub category_id: Uuid,
    pub max_seats: i32,
    pub booking_start: DateTime<Utc>,
    pub booking_end: DateTime<Utc>,
    pub event_date: DateTime<Utc>,
}

impl EventDraft {
    /// Booking window rules: start <= end, end not in the past, and the
    /// event itself happens on or after the window closes.
    pub fn validate(&self, now: DateTime<Utc>) -> CoreResult<()> {
        if self.booking_end < self.booking_start {
            return Err(CoreError::ValidationError(
                "Booking end must be greater than or equal to booking start.".into(),
            ));
        }
        if self.booking_end < now {
            return Err(CoreError::ValidationError(
                "Booking end must be greater than current date.".into(),
            ));
        }
        if self.event_date < self.booking_end {
            return Err(CoreError::ValidationError(
                "Event date must be greater than or equal to booking end.".into(),
            ));
        }
        if self.max_seats < 0 {
            return Err(CoreError::ValidationError(
                "Max seats must not be negative.".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub ticket_count: i32,
    pub booked_at: DateTime<Utc>,
}

/// Ticket joined with its event and booking user, the shape the read
/// endpoints return.
#[derive(Debug, Clone, Serialize)]
pub struct TicketDetail {
    pub ticket_id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub event_date: DateTime<Utc>,
    pub ticket_count: i32,
    pub booked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft(now: DateTime<Utc>) -> EventDraft {
        EventDraft {
            title: "RustConf".to_string(),
            description: "Three days of Rust".to_string(),
            category_id: Uuid::new_v4(),
            max_seats: 200,
            booking_start: now,
            booking_end: now + Duration::days(7),
            event_date: now + Duration::days(10),
        }
    }

    #[test]
    fn valid_window_passes() {
        let now = Utc::now();
        assert!(draft(now).validate(now).is_ok());
    }

    #[test]
    fn end_before_start_rejected() {
        let now = Utc::now();
        let mut d = draft(now);
        d.booking_end = d.booking_start - Duration::hours(1);
        assert!(d.validate(now).is_err());
    }

    #[test]
    fn window_already_closed_rejected() {
        let now = Utc::now();
        let mut d = draft(now);
        d.booking_start = now - Duration::days(5);
        d.booking_end = now - Duration::days(1);
        assert!(d.validate(now).is_err());
    }

    #[test]
    fn event_before_window_close_rejected() {
        let now = Utc::now();
        let mut d = draft(now);
        d.event_date = d.booking_end - Duration::hours(1);
        assert!(d.validate(now).is_err());
    }
}
