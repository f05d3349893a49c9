use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::get,
    Extension, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use eventra_core::models::TicketDetail;
use eventra_store::TicketRepository;

use crate::error::AppError;
use crate::middleware::Claims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct BookTicketsRequest {
    event_id: Uuid,
    ticket_count: i32,
}

#[derive(Debug, Serialize)]
struct BookTicketsResponse {
    ticket_id: Uuid,
    event_id: Uuid,
    ticket_count: i32,
    booked_at: DateTime<Utc>,
    detail: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/tickets", get(list_tickets).post(book_tickets))
        .route("/v1/tickets/{id}", get(get_ticket))
}

/// The booking endpoint. All seat accounting happens inside the
/// reservation service; this handler only maps the outcome to HTTP.
async fn book_tickets(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<BookTicketsRequest>,
) -> Result<(StatusCode, Json<BookTicketsResponse>), AppError> {
    let user_id = claims.user_id()?;

    let ticket = state
        .reservations
        .reserve(req.event_id, user_id, req.ticket_count, Utc::now())
        .await
        .map_err(AppError::from_reservation)?;

    Ok((
        StatusCode::CREATED,
        Json(BookTicketsResponse {
            ticket_id: ticket.id,
            event_id: ticket.event_id,
            ticket_count: ticket.ticket_count,
            booked_at: ticket.booked_at,
            detail: "Tickets booked successfully.".to_string(),
        }),
    ))
}

async fn list_tickets(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<TicketDetail>>, AppError> {
    let user_id = claims.user_id()?;
    let repo = TicketRepository::new(state.db.pool.clone());
    Ok(Json(repo.list_for_user(user_id).await?))
}

async fn get_ticket(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<TicketDetail>, AppError> {
    let repo = TicketRepository::new(state.db.pool.clone());
    let ticket = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Ticket not found.".to_string()))?;

    // Tickets are private to the booking user; admins can see all.
    if !claims.is_admin() && ticket.user_id != claims.user_id()? {
        return Err(AppError::AuthorizationError(
            "You do not have permission to perform this action.".to_string(),
        ));
    }

    Ok(Json(ticket))
}
