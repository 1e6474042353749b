use std::time::Duration;

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tokio::time::timeout;
use tracing::{info, warn};

use waymate_db::models::{TripRequestRow, UserRow};
use waymate_types::api::{CreateTripRequestBody, FetchTripRequestBody, UpdateTripRequestBody};
use waymate_types::models::{DEFAULT_USER_IMAGE, Photo, TripRequest, UserSnapshot};

use crate::error::ApiError;
use crate::state::AppState;

/// 10 MB cap on trip photos.
const MAX_PHOTO_SIZE: usize = 10 * 1024 * 1024;

/// Bound on each external storage call. A slow delete must not hang the
/// request; a slow upload fails it.
const STORAGE_TIMEOUT: Duration = Duration::from_secs(10);

const TRIP_PHOTO_FOLDER: &str = "trip-photos";

/// POST /trips/create-request — open a companion request for one account.
pub async fn create_trip_request(
    State(state): State<AppState>,
    Json(body): Json<CreateTripRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    let username = party_username(body.user.as_ref())
        .ok_or_else(|| ApiError::Validation("User name is required".into()))?;

    let account = state
        .db
        .get_user_by_username(username)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let snapshot = snapshot_of(&account);
    let row = TripRequestRow {
        request_id: state.tags.request_tag(&account.username),
        requester_id: snapshot.user_id.clone(),
        requester_username: snapshot.user_name.clone(),
        requester_image: snapshot.user_image.clone(),
        destination: body.destination,
        destination_type: body.destination_type,
        date: body.date,
        time: body.time,
        gender_preference: body.gender_preference,
        photo_url: None,
        photo_public_id: None,
        created_at: Utc::now().to_rfc3339(),
    };
    state.db.insert_trip_request(&row)?;

    info!(request_id = %row.request_id, user = %account.username, "Trip request created");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "data": { "tripRequest": to_api(row) },
        })),
    ))
}

/// POST /trips/get-request — fetch by id. Side-effect free.
pub async fn get_trip_request(
    State(state): State<AppState>,
    Json(body): Json<FetchTripRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    let id = body
        .trip_req_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("Trip Request ID is required".into()))?;

    let row = state
        .db
        .get_trip_request(id)?
        .ok_or_else(|| ApiError::NotFound("Trip Request not found".into()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": { "tripRequest": to_api(row) },
    })))
}

/// PATCH /trips/request/{tripReqId} — partial update. Fields that arrive
/// non-empty replace the stored value; everything else stays put.
pub async fn update_trip_request(
    State(state): State<AppState>,
    Path(trip_req_id): Path<String>,
    Json(body): Json<UpdateTripRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    let mut row = state
        .db
        .get_trip_request(&trip_req_id)?
        .ok_or_else(|| ApiError::NotFound("Trip Request not found".into()))?;

    if let Some(v) = non_empty(body.destination) {
        row.destination = Some(v);
    }
    if let Some(v) = non_empty(body.destination_type) {
        row.destination_type = Some(v);
    }
    if let Some(v) = non_empty(body.date) {
        row.date = Some(v);
    }
    if let Some(v) = non_empty(body.time) {
        row.time = Some(v);
    }
    if let Some(v) = non_empty(body.gender_preference) {
        row.gender_preference = Some(v);
    }

    state.db.save_trip_request(&row)?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Trip request updated successfully",
        "data": { "tripRequest": to_api(row) },
    })))
}

/// POST /trips/request/{tripReqId}/photo — multipart upload under the field
/// name `file`. Replaces any existing photo; the old stored object is
/// deleted first, best-effort.
pub async fn upload_trip_photo(
    State(state): State<AppState>,
    Path(trip_req_id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut file: Option<Bytes> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Failed to read file: {}", e)))?;
            file = Some(data);
            break;
        }
    }

    let file = file.filter(|f| !f.is_empty())
        .ok_or_else(|| ApiError::Validation("No file uploaded".into()))?;
    if file.len() > MAX_PHOTO_SIZE {
        return Err(ApiError::Validation("Photo is too large".into()));
    }

    let mut row = state
        .db
        .get_trip_request(&trip_req_id)?
        .ok_or_else(|| ApiError::NotFound("Trip Request not found".into()))?;

    // Delete the previous object before uploading the new one. This is
    // best-effort cleanup: on failure the old object is orphaned for a later
    // sweep, never a reason to reject the new photo.
    if let Some(old_id) = &row.photo_public_id {
        match timeout(STORAGE_TIMEOUT, state.media.delete(old_id)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(id = %old_id, "Stale photo delete failed, object orphaned: {:#}", e),
            Err(_) => warn!(id = %old_id, "Stale photo delete timed out, object orphaned"),
        }
    }

    // The upload is the critical path: timeout or failure aborts the request
    // and the record keeps its previous state.
    let stored = timeout(
        STORAGE_TIMEOUT,
        state.media.upload(&file, TRIP_PHOTO_FOLDER, &row.requester_id),
    )
    .await
    .map_err(|_| ApiError::Storage("upload timed out".into()))?
    .map_err(|e| ApiError::Storage(e.to_string()))?;

    row.photo_url = Some(stored.url.clone());
    row.photo_public_id = Some(stored.public_id.clone());
    state.db.save_trip_request(&row)?;

    info!(request_id = %trip_req_id, id = %stored.public_id, "Trip photo uploaded");

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Photo uploaded successfully",
        "data": { "photoUrl": stored.url },
    })))
}

/// Username out of a party reference, if one was actually supplied.
pub(crate) fn party_username(party: Option<&waymate_types::api::PartyRef>) -> Option<&str> {
    party
        .and_then(|p| p.user_name.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Account snapshot as embedded in trip requests and trips, frozen at
/// creation time.
pub(crate) fn snapshot_of(user: &UserRow) -> UserSnapshot {
    UserSnapshot {
        user_id: user.id.clone(),
        user_name: user.username.clone(),
        user_image: user
            .profile_photo
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_IMAGE.into()),
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

fn to_api(row: TripRequestRow) -> TripRequest {
    let photo = match (row.photo_url, row.photo_public_id) {
        (Some(url), Some(public_id)) => Some(Photo { url, public_id }),
        _ => None,
    };
    TripRequest {
        request_id: row.request_id,
        user: UserSnapshot {
            user_id: row.requester_id,
            user_name: row.requester_username,
            user_image: row.requester_image,
        },
        destination: row.destination,
        destination_type: row.destination_type,
        date: row.date,
        time: row.time,
        gender_preference: row.gender_preference,
        photo,
        created_at: row.created_at,
    }
}
