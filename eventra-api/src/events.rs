use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use eventra_core::models::EventDraft;
use eventra_core::search::EventSearchFilter;
use eventra_store::{CategoryRepository, EventWithCategory};

use crate::error::AppError;
use crate::middleware::auth::require_admin;
use crate::middleware::Claims;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct EventResponse {
    id: Uuid,
    title: String,
    description: String,
    category_id: Uuid,
    category: String,
    max_seats: i32,
    booking_start: DateTime<Utc>,
    booking_end: DateTime<Utc>,
    event_date: DateTime<Utc>,
}

impl From<EventWithCategory> for EventResponse {
    fn from(record: EventWithCategory) -> Self {
        let event = record.event;
        EventResponse {
            id: event.id,
            title: event.title,
            description: event.description,
            category_id: event.category_id,
            category: record.category_name,
            max_seats: event.max_seats,
            booking_start: event.booking_start,
            booking_end: event.booking_end,
            event_date: event.event_date,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    search: String,
}

#[derive(Debug, Serialize)]
struct AvailabilityResponse {
    event_id: Uuid,
    remaining_seats: i32,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/events", get(list_events).post(create_event))
        .route("/v1/events/search", get(search_events))
        .route(
            "/v1/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/v1/events/{id}/availability", get(event_availability))
}

async fn list_events(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let filter = EventSearchFilter::new("", claims.is_admin());
    filtered_events(&state, &filter).await.map(Json)
}

async fn search_events(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let filter = EventSearchFilter::new(params.search, claims.is_admin());
    filtered_events(&state, &filter).await.map(Json)
}

/// Shared read path for list and search: fetch ordered rows, apply the
/// core filter (term match plus past-event visibility).
async fn filtered_events(
    state: &AppState,
    filter: &EventSearchFilter,
) -> Result<Vec<EventResponse>, AppError> {
    let today = Utc::now().date_naive();
    let records = state.event_store.list_events().await?;

    Ok(records
        .into_iter()
        .filter(|record| filter.matches(&record.event, &record.category_name, today))
        .map(Into::into)
        .collect())
}

async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventResponse>, AppError> {
    let record = state
        .event_store
        .get_event_with_category(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Event not found.".to_string()))?;
    Ok(Json(record.into()))
}

async fn event_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let remaining = state
        .event_store
        .remaining_seats(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Event not found.".to_string()))?;
    Ok(Json(AvailabilityResponse {
        event_id: id,
        remaining_seats: remaining,
    }))
}

async fn create_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(draft): Json<EventDraft>,
) -> Result<(StatusCode, Json<EventResponse>), AppError> {
    require_admin(&claims)?;
    validate_draft(&state, &draft).await?;

    let event = state.event_store.create_event(&draft).await?;
    let record = state
        .event_store
        .get_event_with_category(event.id)
        .await?
        .ok_or_else(|| AppError::InternalServerError("Created event vanished.".to_string()))?;

    Ok((StatusCode::CREATED, Json(record.into())))
}

async fn update_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(draft): Json<EventDraft>,
) -> Result<Json<EventResponse>, AppError> {
    require_admin(&claims)?;
    validate_draft(&state, &draft).await?;

    state
        .event_store
        .update_event(id, &draft)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Event not found.".to_string()))?;

    let record = state
        .event_store
        .get_event_with_category(id)
        .await?
        .ok_or_else(|| AppError::InternalServerError("Updated event vanished.".to_string()))?;
    Ok(Json(record.into()))
}

async fn delete_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&claims)?;

    if !state.event_store.delete_event(id).await? {
        return Err(AppError::NotFoundError("Event not found.".to_string()));
    }
    Ok(Json(json!({ "detail": "Event deleted successfully." })))
}

async fn validate_draft(state: &AppState, draft: &EventDraft) -> Result<(), AppError> {
    draft
        .validate(Utc::now())
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let categories = CategoryRepository::new(state.db.pool.clone());
    if categories.get(draft.category_id).await?.is_none() {
        return Err(AppError::ValidationError(
            "Unknown event category.".to_string(),
        ));
    }
    Ok(())
}
