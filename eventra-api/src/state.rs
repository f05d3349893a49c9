use std::sync::Arc;

use eventra_core::reservation::SeatReservationService;
use eventra_store::{DbClient, PostgresEventStore, RedisClient};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbClient>,
    pub redis: Arc<RedisClient>,
    pub event_store: Arc<PostgresEventStore>,
    pub reservations: Arc<SeatReservationService>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(db: Arc<DbClient>, redis: Arc<RedisClient>, auth: AuthConfig) -> Self {
        let event_store = Arc::new(PostgresEventStore::new(
            db.pool.clone(),
            (*redis).clone(),
        ));
        let reservations = Arc::new(SeatReservationService::new(event_store.clone()));

        Self {
            db,
            redis,
            event_store,
            reservations,
            auth,
        }
    }
}
