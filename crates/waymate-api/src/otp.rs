use axum::{Json, extract::State, response::IntoResponse};
use chrono::{DateTime, Duration, Utc};
use tracing::info;

use waymate_types::api::{SendOtpRequest, VerifyOtpRequest};

use crate::error::ApiError;
use crate::state::AppState;
use crate::tokens::{digest_eq, generate_otp, hash_token};

/// Verification codes expire after this window.
const OTP_TTL_MINUTES: i64 = 10;

/// POST /auth/send-email-otp — issue a fresh 6-digit code, store only its
/// digest, and mail the plaintext. A new issuance supersedes any prior code.
pub async fn send_email_otp(
    State(state): State<AppState>,
    Json(req): Json<SendOtpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.email.is_empty() {
        return Err(ApiError::Validation("Email is required".into()));
    }

    let user = state
        .db
        .get_user_by_email(&req.email)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let code = generate_otp();
    let expires_at = (Utc::now() + Duration::minutes(OTP_TTL_MINUTES)).to_rfc3339();
    state
        .db
        .set_otp_credential(&user.id, &hash_token(&code), &expires_at)?;

    let body = format!(
        "Your email verification code is {}. It expires in {} minutes.",
        code, OTP_TTL_MINUTES
    );
    state
        .mailer
        .send(&user.email, "Verify your email", &body)
        .await
        .map_err(|e| ApiError::Email(e.to_string()))?;

    info!(user = %user.username, "Verification code issued");

    // The code itself never appears in the response.
    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "OTP sent to email",
    })))
}

/// POST /auth/verify-email-otp — check a candidate code against the stored
/// digest. Success marks the account verified and consumes the credential.
pub async fn verify_email_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.email.is_empty() || req.otp.is_empty() {
        return Err(ApiError::Validation("Email and OTP are required".into()));
    }

    let user = state
        .db
        .get_user_by_email(&req.email)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let stored_hash = user
        .otp_hash
        .as_deref()
        .ok_or_else(|| ApiError::Auth("No verification code is pending".into()))?;

    let expires_at = user
        .otp_expires_at
        .as_deref()
        .ok_or_else(|| ApiError::Auth("No verification code is pending".into()))?;
    let expires_at = DateTime::parse_from_rfc3339(expires_at)
        .map_err(|e| anyhow::anyhow!("Stored OTP expiry is malformed: {}", e))?;
    if Utc::now() > expires_at {
        return Err(ApiError::Auth("OTP has expired".into()));
    }

    if !digest_eq(&hash_token(&req.otp), stored_hash) {
        return Err(ApiError::Auth("Invalid OTP".into()));
    }

    state.db.mark_verified(&user.id)?;

    info!(user = %user.username, "Email verified");

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Email verified successfully",
    })))
}
