use serde::{Deserialize, Serialize};

/// Fallback avatar used when an account has no profile photo at snapshot time.
pub const DEFAULT_USER_IMAGE: &str = "default.jpg";

/// Copy of select account fields embedded in a trip request or trip at
/// creation time. Not a live reference — later account edits do not
/// propagate into records that already carry a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    pub user_id: String,
    pub user_name: String,
    pub user_image: String,
}

/// A stored media object: public URL plus the storage provider's id,
/// kept so the object can be deleted when replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub url: String,
    pub public_id: String,
}

/// A solo request for a travel companion, not yet matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub request_id: String,
    pub user: UserSnapshot,
    pub destination: Option<String>,
    pub destination_type: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub gender_preference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<Photo>,
    pub created_at: String,
}

/// A confirmed pairing of two accounts with travel-safety parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub trip_id: String,
    pub user: UserSnapshot,
    pub companion: UserSnapshot,
    pub consent: bool,
    pub distance_maintained: f64,
    pub distance_preferred: f64,
    pub gender_preference: String,
    pub image_verification: bool,
    pub created_at: String,
}
