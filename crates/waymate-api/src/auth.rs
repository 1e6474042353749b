use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{info, warn};
use uuid::Uuid;

use waymate_types::api::{
    Claims, ForgotPasswordRequest, LoginRequest, LoginResponse, ProfileResponse, RegisterRequest,
    RegisterResponse, ResetPasswordRequest,
};
use waymate_types::models::DEFAULT_USER_IMAGE;

use crate::error::ApiError;
use crate::state::AppState;
use crate::tokens::{generate_token, hash_token};

/// Reset tokens are single-use and short-lived.
const RESET_TOKEN_TTL_MINUTES: i64 = 10;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate input
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(ApiError::Validation(
            "Username must be 3-32 characters".into(),
        ));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }
    if !req.email.contains('@') {
        return Err(ApiError::Validation("A valid email is required".into()));
    }

    if state.db.get_user_by_username(&req.username)?.is_some() {
        return Err(ApiError::Conflict("Username already taken".into()));
    }
    if state.db.get_user_by_email(&req.email)?.is_some() {
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&req.password)?;
    let user_id = Uuid::new_v4();

    state
        .db
        .create_user(&user_id.to_string(), &req.username, &req.email, &password_hash)?;

    let token = create_token(&state.jwt_secret, user_id, &req.username)?;

    info!(username = %req.username, "Account registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { user_id, token }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // One message for both unknown user and bad password
    let bad_creds = || ApiError::Unauthorized("Incorrect username or password".into());

    let user = state
        .db
        .get_user_by_username(&req.username)?
        .ok_or_else(bad_creds)?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| anyhow::anyhow!("Stored password hash is corrupt: {}", e))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| bad_creds())?;

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| anyhow::anyhow!("Stored user id is not a uuid: {}", e))?;

    let token = create_token(&state.jwt_secret, user_id, &user.username)?;

    Ok(Json(LoginResponse {
        user_id,
        user_name: user.username,
        token,
    }))
}

pub async fn current_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_id(&claims.sub.to_string())?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(ProfileResponse {
        user_id: claims.sub,
        user_name: user.username,
        email: user.email,
        user_image: user.profile_photo.unwrap_or_else(|| DEFAULT_USER_IMAGE.into()),
        verified: user.verified,
    }))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Always answer the same way so the endpoint cannot be used to probe
    // which emails are registered.
    let ok = Json(serde_json::json!({
        "status": "success",
        "message": "If that email is registered, a reset token has been sent",
    }));

    let Some(user) = state.db.get_user_by_email(&req.email)? else {
        return Ok(ok);
    };

    let token = generate_token();
    let expires_at = (Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES)).to_rfc3339();
    state.db.set_reset_token(&user.id, &hash_token(&token), &expires_at)?;

    let body = format!(
        "Use this token to reset your password (valid for {} minutes):\n\n{}",
        RESET_TOKEN_TTL_MINUTES, token
    );
    if let Err(e) = state.mailer.send(&user.email, "Password reset", &body).await {
        // Don't leave a live token behind if the user never got it
        warn!(user = %user.username, "Reset mail failed: {:#}", e);
        state.db.clear_reset_token(&user.id)?;
        return Err(ApiError::Email(e.to_string()));
    }

    Ok(ok)
}

pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }

    let invalid = || ApiError::Auth("Token is invalid or has expired".into());

    let user = state
        .db
        .get_user_by_reset_hash(&hash_token(&token))?
        .ok_or_else(invalid)?;

    let expires_at = user.reset_token_expires_at.as_deref().ok_or_else(invalid)?;
    let expires_at = chrono::DateTime::parse_from_rfc3339(expires_at)
        .map_err(|e| anyhow::anyhow!("Stored reset expiry is malformed: {}", e))?;
    if Utc::now() > expires_at {
        return Err(invalid());
    }

    let password_hash = hash_password(&req.password)?;
    state.db.update_password(&user.id, &password_hash)?;

    info!(user = %user.username, "Password reset");

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Password has been reset",
    })))
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

fn create_token(secret: &str, user_id: Uuid, username: &str) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (Utc::now() + Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| anyhow::anyhow!("JWT encoding failed: {}", e))?;

    Ok(token)
}
