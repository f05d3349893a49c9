use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::post,
    Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use eventra_core::models::User;
use eventra_store::UserRepository;

use crate::error::AppError;
use crate::middleware::Claims;
use crate::password::{hash_password, verify_password};
use crate::state::{AppState, AuthConfig};

#[derive(Debug, Deserialize)]
struct SignupRequest {
    email: String,
    first_name: String,
    last_name: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct UserProfile {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    is_admin: bool,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_admin: user.is_admin,
        }
    }
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    data: UserProfile,
    detail: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/signup", post(signup))
        .route("/v1/auth/login", post(login))
}

async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(AppError::ValidationError(
            "A valid email address is required.".to_string(),
        ));
    }
    if req.password.len() < 8 {
        return Err(AppError::ValidationError(
            "Password must be at least 8 characters.".to_string(),
        ));
    }

    let users = UserRepository::new(state.db.pool.clone());
    let digest = hash_password(&req.password);
    let user = users
        .create(
            req.email.trim(),
            &req.first_name,
            &req.last_name,
            &digest,
        )
        .await
        .map_err(|err| {
            if eventra_store::is_unique_violation(&err) {
                AppError::ConflictError("A user with this email already exists.".to_string())
            } else {
                AppError::InternalServerError(err.to_string())
            }
        })?;

    info!("User registered: {}", user.id);

    let token = issue_token(&user, &state.auth)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            data: (&user).into(),
            detail: "User created successfully.".to_string(),
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let users = UserRepository::new(state.db.pool.clone());
    let user = users
        .find_by_email(req.email.trim())
        .await?
        .ok_or_else(|| {
            AppError::AuthenticationError("Invalid email or password.".to_string())
        })?;

    if !verify_password(&req.password, &user.password_digest) {
        return Err(AppError::AuthenticationError(
            "Invalid email or password.".to_string(),
        ));
    }

    let token = issue_token(&user, &state.auth)?;
    Ok(Json(AuthResponse {
        token,
        data: (&user).into(),
        detail: "User login successful".to_string(),
    }))
}

fn issue_token(user: &User, auth: &AuthConfig) -> Result<String, AppError> {
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: if user.is_admin { "ADMIN" } else { "USER" }.to_string(),
        exp: (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}
