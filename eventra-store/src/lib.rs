pub mod app_config;
pub mod category_repo;
pub mod database;
pub mod event_repo;
pub mod redis_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use category_repo::CategoryRepository;
pub use database::DbClient;
pub use event_repo::{EventWithCategory, PostgresEventStore};
pub use redis_repo::RedisClient;
pub use ticket_repo::TicketRepository;
pub use user_repo::UserRepository;

/// Postgres raises unique violations for duplicate category names/codes
/// and duplicate user emails; the API maps those to conflict responses.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}
