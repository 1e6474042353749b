use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- JWT Claims --

/// JWT claims shared between token issuance (auth handlers) and the
/// request middleware. Canonical definition lives here in waymate-types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub user_name: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub user_name: String,
    pub email: String,
    pub user_image: String,
    pub verified: bool,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

// -- Email OTP --

#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

// -- Trip requests / trips --

/// Reference to an account by its human-readable username. The mobile
/// client sends its full cached user object here; only `userName` matters,
/// so unknown fields are tolerated.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyRef {
    pub user_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripRequestBody {
    pub user: Option<PartyRef>,
    pub destination: Option<String>,
    pub destination_type: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub gender_preference: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchTripRequestBody {
    pub trip_req_id: Option<String>,
}

/// Partial update: a field that is present and non-null replaces the stored
/// value; absent or null fields are left untouched. Clearing a stored value
/// through this endpoint is not supported.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTripRequestBody {
    pub destination: Option<String>,
    pub destination_type: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub gender_preference: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripBody {
    pub user: Option<PartyRef>,
    pub companion: Option<PartyRef>,
    pub consent: bool,
    pub distance_maintained: f64,
    pub distance_preferred: f64,
    pub gender_preference: String,
    pub image_verification: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchTripBody {
    pub trip_id: Option<String>,
}
