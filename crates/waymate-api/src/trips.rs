use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use tracing::info;

use waymate_db::models::TripRow;
use waymate_types::api::{CreateTripBody, FetchTripBody};
use waymate_types::models::{Trip, UserSnapshot};

use crate::error::ApiError;
use crate::requests::{party_username, snapshot_of};
use crate::state::AppState;

/// POST /trips/create — confirm a pairing of two accounts. Both parties are
/// resolved before anything is written.
pub async fn create_trip(
    State(state): State<AppState>,
    Json(body): Json<CreateTripBody>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(requester_name), Some(companion_name)) = (
        party_username(body.user.as_ref()),
        party_username(body.companion.as_ref()),
    ) else {
        return Err(ApiError::Validation(
            "Both user and companion usernames are required".into(),
        ));
    };

    let requester = state
        .db
        .get_user_by_username(requester_name)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let companion = state
        .db
        .get_user_by_username(companion_name)?
        .ok_or_else(|| ApiError::NotFound("Companion not found".into()))?;

    let requester_snap = snapshot_of(&requester);
    let companion_snap = snapshot_of(&companion);

    let row = TripRow {
        trip_id: state.tags.trip_tag(&requester.username, &companion.username),
        requester_id: requester_snap.user_id.clone(),
        requester_username: requester_snap.user_name.clone(),
        requester_image: requester_snap.user_image.clone(),
        companion_id: companion_snap.user_id.clone(),
        companion_username: companion_snap.user_name.clone(),
        companion_image: companion_snap.user_image.clone(),
        consent: body.consent,
        distance_maintained: body.distance_maintained,
        distance_preferred: body.distance_preferred,
        gender_preference: body.gender_preference,
        image_verification: body.image_verification,
        created_at: Utc::now().to_rfc3339(),
    };
    state.db.insert_trip(&row)?;

    info!(trip_id = %row.trip_id, requester = %requester.username, companion = %companion.username, "Trip created");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "data": { "trip": to_api(row) },
        })),
    ))
}

/// POST /trips/get — fetch by id. Side-effect free.
pub async fn get_trip(
    State(state): State<AppState>,
    Json(body): Json<FetchTripBody>,
) -> Result<impl IntoResponse, ApiError> {
    let id = body
        .trip_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("Trip ID is required".into()))?;

    let row = state
        .db
        .get_trip(id)?
        .ok_or_else(|| ApiError::NotFound("Trip not found".into()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": { "trip": to_api(row) },
    })))
}

fn to_api(row: TripRow) -> Trip {
    Trip {
        trip_id: row.trip_id,
        user: UserSnapshot {
            user_id: row.requester_id,
            user_name: row.requester_username,
            user_image: row.requester_image,
        },
        companion: UserSnapshot {
            user_id: row.companion_id,
            user_name: row.companion_username,
            user_image: row.companion_image,
        },
        consent: row.consent,
        distance_maintained: row.distance_maintained,
        distance_preferred: row.distance_preferred,
        gender_preference: row.gender_preference,
        image_verification: row.image_verification,
        created_at: row.created_at,
    }
}
