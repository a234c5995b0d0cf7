use crate::db::User;
use crate::error::LoungeResult;
use crate::middleware::auth::Claims;
use crate::state::AppState;
use axum::extract::{Json, State};
use bcrypt::verify;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

const TOKEN_LIFETIME_HOURS: i64 = 12;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
}

fn rejected(message: &str) -> LoginResponse {
    LoginResponse {
        success: false,
        message: message.to_string(),
        token: None,
        username: None,
        role: None,
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> LoungeResult<Json<LoginResponse>> {
    if payload.username.trim().is_empty() || payload.password.trim().is_empty() {
        return Ok(Json(rejected("Username and password are required.")));
    }

    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, role, created_at FROM users WHERE username = ?",
    )
    .bind(&payload.username)
    .fetch_optional(&state.pool)
    .await?;

    let user = match user {
        Some(user) => user,
        None => return Ok(Json(rejected("Unknown username or wrong password."))),
    };

    if !verify(&payload.password, &user.password_hash)? {
        return Ok(Json(rejected("Unknown username or wrong password.")));
    }

    let exp = (chrono::Utc::now() + chrono::Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp();
    let claims = Claims {
        sub: user.username.clone(),
        user_id: Some(user.id),
        username: Some(user.username.clone()),
        role: Some(user.role.clone()),
        exp: exp as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_bytes()),
    )
    .map_err(|e| crate::error::LoungeError::Internal(format!("Token signing failed: {}", e)))?;

    tracing::info!(username = %user.username, "User logged in");

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful.".to_string(),
        token: Some(token),
        username: Some(user.username),
        role: Some(user.role),
    }))
}
