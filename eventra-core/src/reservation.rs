use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{Event, Ticket};

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Persistence seam for the reservation core. `book_ticket` is the one
/// primitive that must be atomic: the capacity check, the decrement,
/// and the ticket record all commit or all roll back together (one
/// transaction in Postgres, one mutex hold in the in-memory double).
/// A decrement that commits without its ticket row would break the
/// capacity conservation invariant, so the two are a single operation.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn get_event(&self, id: Uuid) -> Result<Option<Event>, StoreError>;

    /// Take `ticket.ticket_count` seats iff at least that many remain,
    /// and record the ticket in the same unit of work. Returns the
    /// remaining count after the decrement, or `None` when the guard
    /// failed because capacity changed underneath us. On error nothing
    /// is persisted.
    async fn book_ticket(&self, ticket: &Ticket) -> Result<Option<i32>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("Event not found.")]
    EventNotFound,
    #[error("Sorry!, You can't book the tickets. Booking time is already over.")]
    BookingClosed,
    #[error("Sorry!, Only {available} available.")]
    InsufficientSeats { available: i32 },
    #[error("Sorry!, House full.")]
    SoldOut,
    #[error("Ticket count must be a positive number.")]
    InvalidQuantity,
    #[error("Booking conflicted with concurrent updates, please retry.")]
    ConcurrentConflict,
    #[error("Storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for ReservationError {
    fn from(err: StoreError) -> Self {
        ReservationError::Storage(err)
    }
}

/// How many times a reservation re-reads and retries after losing the
/// claim race to a concurrent booking. Each lost round means another
/// caller succeeded, so the re-read converges quickly.
const MAX_CLAIM_ATTEMPTS: u32 = 3;

pub struct SeatReservationService {
    store: Arc<dyn EventStore>,
}

impl SeatReservationService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Reserve `requested` seats on an event for a user. Validates
    /// against a fresh snapshot, then claims the seats and records the
    /// ticket through the store's atomic guarded booking. On a lost
    /// race the snapshot is re-read and the validation re-run so the
    /// caller gets the error matching the current state; validation
    /// failures are never retried and never mutate anything.
    pub async fn reserve(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        requested: i32,
        now: DateTime<Utc>,
    ) -> Result<Ticket, ReservationError> {
        for attempt in 1..=MAX_CLAIM_ATTEMPTS {
            let event = self
                .store
                .get_event(event_id)
                .await?
                .ok_or(ReservationError::EventNotFound)?;

            validate(&event, requested, now)?;

            let ticket = Ticket {
                id: Uuid::new_v4(),
                event_id,
                user_id,
                ticket_count: requested,
                booked_at: now,
            };

            match self.store.book_ticket(&ticket).await? {
                Some(remaining) => {
                    info!(
                        "Booked {} seat(s) on event {} for user {}, {} remaining",
                        requested, event_id, user_id, remaining
                    );
                    return Ok(ticket);
                }
                None => {
                    warn!(
                        "Seat claim on event {} lost a race (attempt {}/{})",
                        event_id, attempt, MAX_CLAIM_ATTEMPTS
                    );
                }
            }
        }

        Err(ReservationError::ConcurrentConflict)
    }
}

/// Precondition order is contractual: booking window first, then the
/// distinct house-full message for a drained event, then the
/// partial-shortfall message, then the quantity sanity check.
fn validate(event: &Event, requested: i32, now: DateTime<Utc>) -> Result<(), ReservationError> {
    if now >= event.booking_end {
        return Err(ReservationError::BookingClosed);
    }
    if event.max_seats == 0 {
        return Err(ReservationError::SoldOut);
    }
    if requested > event.max_seats {
        return Err(ReservationError::InsufficientSeats {
            available: event.max_seats,
        });
    }
    if requested <= 0 {
        return Err(ReservationError::InvalidQuantity);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    struct MemoryEventStore {
        events: Mutex<HashMap<Uuid, Event>>,
        tickets: Mutex<Vec<Ticket>>,
        fail_ticket_write: AtomicBool,
    }

    impl MemoryEventStore {
        fn with_event(event: Event) -> Arc<Self> {
            let mut events = HashMap::new();
            events.insert(event.id, event);
            Arc::new(Self {
                events: Mutex::new(events),
                tickets: Mutex::new(Vec::new()),
                fail_ticket_write: AtomicBool::new(false),
            })
        }

        fn remaining(&self, id: Uuid) -> i32 {
            self.events.lock().unwrap()[&id].max_seats
        }

        fn booked_total(&self, id: Uuid) -> i32 {
            self.tickets
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.event_id == id)
                .map(|t| t.ticket_count)
                .sum()
        }
    }

    #[async_trait]
    impl EventStore for MemoryEventStore {
        async fn get_event(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
            Ok(self.events.lock().unwrap().get(&id).cloned())
        }

        async fn book_ticket(&self, ticket: &Ticket) -> Result<Option<i32>, StoreError> {
            // Guard, decrement, and record under one lock hold; an
            // error leaves the event untouched, like a rolled-back
            // transaction.
            let mut events = self.events.lock().unwrap();
            let event = events
                .get_mut(&ticket.event_id)
                .ok_or("event vanished")?;
            if event.max_seats < ticket.ticket_count {
                return Ok(None);
            }
            if self.fail_ticket_write.load(Ordering::SeqCst) {
                return Err("ticket write failed".into());
            }
            event.max_seats -= ticket.ticket_count;
            self.tickets.lock().unwrap().push(ticket.clone());
            Ok(Some(event.max_seats))
        }
    }

    fn open_event(max_seats: i32) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            title: "RustConf".to_string(),
            description: "Three days of Rust".to_string(),
            category_id: Uuid::new_v4(),
            max_seats,
            booking_start: now - Duration::days(1),
            booking_end: now + Duration::days(1),
            event_date: now + Duration::days(3),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn successful_reservation_decrements_and_records_ticket() {
        let event = open_event(100);
        let event_id = event.id;
        let store = MemoryEventStore::with_event(event);
        let service = SeatReservationService::new(store.clone());

        let ticket = service
            .reserve(event_id, Uuid::new_v4(), 30, Utc::now())
            .await
            .unwrap();

        assert_eq!(ticket.ticket_count, 30);
        assert_eq!(store.remaining(event_id), 70);
        assert_eq!(store.booked_total(event_id), 30);

        // Worked example continues: 80 against the remaining 70 fails
        // and leaves the count untouched.
        let err = service
            .reserve(event_id, Uuid::new_v4(), 80, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReservationError::InsufficientSeats { available: 70 }
        ));
        assert_eq!(store.remaining(event_id), 70);
    }

    #[tokio::test]
    async fn exact_sellout_drains_capacity_to_zero() {
        let event = open_event(5);
        let event_id = event.id;
        let store = MemoryEventStore::with_event(event);
        let service = SeatReservationService::new(store.clone());

        let ticket = service
            .reserve(event_id, Uuid::new_v4(), 5, Utc::now())
            .await
            .unwrap();

        assert_eq!(ticket.ticket_count, 5);
        assert_eq!(store.remaining(event_id), 0);
    }

    #[tokio::test]
    async fn sold_out_event_rejects_any_request() {
        let event = open_event(0);
        let event_id = event.id;
        let store = MemoryEventStore::with_event(event);
        let service = SeatReservationService::new(store.clone());

        // House-full wins over the shortfall message for every size of
        // request against a drained event.
        for requested in [1, 5, 100] {
            let err = service
                .reserve(event_id, Uuid::new_v4(), requested, Utc::now())
                .await
                .unwrap_err();
            assert!(matches!(err, ReservationError::SoldOut));
        }
        assert_eq!(store.remaining(event_id), 0);
        assert_eq!(store.booked_total(event_id), 0);
    }

    #[tokio::test]
    async fn non_positive_quantity_is_rejected() {
        let event = open_event(10);
        let event_id = event.id;
        let store = MemoryEventStore::with_event(event);
        let service = SeatReservationService::new(store.clone());

        for bad in [0, -3] {
            let err = service
                .reserve(event_id, Uuid::new_v4(), bad, Utc::now())
                .await
                .unwrap_err();
            assert!(matches!(err, ReservationError::InvalidQuantity));
        }
        assert_eq!(store.remaining(event_id), 10);
    }

    #[tokio::test]
    async fn closed_booking_window_wins_over_seat_checks() {
        let mut event = open_event(50);
        event.booking_end = Utc::now() - Duration::hours(1);
        let event_id = event.id;
        let store = MemoryEventStore::with_event(event);
        let service = SeatReservationService::new(store.clone());

        let err = service
            .reserve(event_id, Uuid::new_v4(), 2, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::BookingClosed));
        assert_eq!(store.remaining(event_id), 50);
    }

    #[tokio::test]
    async fn unknown_event_reports_not_found() {
        let store = MemoryEventStore::with_event(open_event(10));
        let service = SeatReservationService::new(store);

        let err = service
            .reserve(Uuid::new_v4(), Uuid::new_v4(), 1, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::EventNotFound));
    }

    #[tokio::test]
    async fn oversized_request_reports_available_count() {
        let event = open_event(4);
        let event_id = event.id;
        let store = MemoryEventStore::with_event(event);
        let service = SeatReservationService::new(store.clone());

        let err = service
            .reserve(event_id, Uuid::new_v4(), 5, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReservationError::InsufficientSeats { available: 4 }
        ));
        assert_eq!(store.remaining(event_id), 4);
    }

    #[tokio::test]
    async fn failed_ticket_write_leaves_capacity_intact() {
        let event = open_event(10);
        let event_id = event.id;
        let store = MemoryEventStore::with_event(event);
        store.fail_ticket_write.store(true, Ordering::SeqCst);
        let service = SeatReservationService::new(store.clone());

        // Booked seats and the ticket record commit together; when the
        // ticket cannot be written the decrement must not survive.
        let err = service
            .reserve(event_id, Uuid::new_v4(), 4, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::Storage(_)));
        assert_eq!(store.remaining(event_id), 10);
        assert_eq!(store.booked_total(event_id), 0);

        // Once storage recovers the same request goes through.
        store.fail_ticket_write.store(false, Ordering::SeqCst);
        service
            .reserve(event_id, Uuid::new_v4(), 4, Utc::now())
            .await
            .unwrap();
        assert_eq!(store.remaining(event_id), 6);
        assert_eq!(store.booked_total(event_id), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_reservations_never_oversell() {
        let event = open_event(10);
        let event_id = event.id;
        let store = MemoryEventStore::with_event(event);
        let service = Arc::new(SeatReservationService::new(store.clone()));

        // 24 callers race for 10 seats, two each: total demand 48.
        let mut handles = Vec::new();
        for _ in 0..24 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .reserve(event_id, Uuid::new_v4(), 2, Utc::now())
                    .await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(ticket) => {
                    assert_eq!(ticket.ticket_count, 2);
                    successes += 1;
                }
                Err(
                    ReservationError::InsufficientSeats { .. }
                    | ReservationError::SoldOut
                    | ReservationError::ConcurrentConflict,
                ) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        let remaining = store.remaining(event_id);
        assert!(remaining >= 0);
        // Capacity is transferred, never created: booked + remaining
        // always equals the original 10.
        assert_eq!(store.booked_total(event_id) + remaining, 10);
        assert_eq!(store.booked_total(event_id), successes * 2);
        assert!(successes * 2 <= 10);
    }
}
