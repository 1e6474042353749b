/// Database row types — these map directly to SQLite rows.
/// Distinct from the waymate-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile_photo: Option<String>,
    pub verified: bool,
    pub otp_hash: Option<String>,
    pub otp_expires_at: Option<String>,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<String>,
    pub created_at: String,
}

pub struct TripRequestRow {
    pub request_id: String,
    pub requester_id: String,
    pub requester_username: String,
    pub requester_image: String,
    pub destination: Option<String>,
    pub destination_type: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub gender_preference: Option<String>,
    pub photo_url: Option<String>,
    pub photo_public_id: Option<String>,
    pub created_at: String,
}

pub struct TripRow {
    pub trip_id: String,
    pub requester_id: String,
    pub requester_username: String,
    pub requester_image: String,
    pub companion_id: String,
    pub companion_username: String,
    pub companion_image: String,
    pub consent: bool,
    pub distance_maintained: f64,
    pub distance_preferred: f64,
    pub gender_preference: String,
    pub image_verification: bool,
    pub created_at: String,
}
