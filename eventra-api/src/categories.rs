use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use eventra_core::models::EventCategory;
use eventra_store::CategoryRepository;

use crate::error::AppError;
use crate::middleware::auth::require_admin;
use crate::middleware::Claims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct CategoryRequest {
    name: String,
    code: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/categories", get(list_categories).post(create_category))
        .route(
            "/v1/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventCategory>>, AppError> {
    let repo = CategoryRepository::new(state.db.pool.clone());
    Ok(Json(repo.list().await?))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventCategory>, AppError> {
    let repo = CategoryRepository::new(state.db.pool.clone());
    let category = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Event category not found.".to_string()))?;
    Ok(Json(category))
}

async fn create_category(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<EventCategory>), AppError> {
    require_admin(&claims)?;
    if req.name.trim().is_empty() || req.code.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Category name and code are required.".to_string(),
        ));
    }

    let repo = CategoryRepository::new(state.db.pool.clone());
    let category = repo.create(req.name.trim(), req.code.trim()).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<CategoryRequest>,
) -> Result<Json<EventCategory>, AppError> {
    require_admin(&claims)?;

    let repo = CategoryRepository::new(state.db.pool.clone());
    let category = repo
        .update(id, req.name.trim(), req.code.trim())
        .await?
        .ok_or_else(|| AppError::NotFoundError("Event category not found.".to_string()))?;
    Ok(Json(category))
}

async fn delete_category(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&claims)?;

    let repo = CategoryRepository::new(state.db.pool.clone());
    if !repo.delete(id).await? {
        return Err(AppError::NotFoundError(
            "Event category not found.".to_string(),
        ));
    }
    Ok(Json(json!({ "detail": "Event category deleted successfully." })))
}
