use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id                      TEXT PRIMARY KEY,
            username                TEXT NOT NULL UNIQUE,
            email                   TEXT NOT NULL UNIQUE,
            password                TEXT NOT NULL,
            profile_photo           TEXT,
            verified                INTEGER NOT NULL DEFAULT 0,
            otp_hash                TEXT,
            otp_expires_at          TEXT,
            reset_token_hash        TEXT,
            reset_token_expires_at  TEXT,
            created_at              TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_users_reset_token
            ON users(reset_token_hash);

        CREATE TABLE IF NOT EXISTS trip_requests (
            request_id          TEXT PRIMARY KEY,
            requester_id        TEXT NOT NULL REFERENCES users(id),
            requester_username  TEXT NOT NULL,
            requester_image     TEXT NOT NULL,
            destination         TEXT,
            destination_type    TEXT,
            date                TEXT,
            time                TEXT,
            gender_preference   TEXT,
            photo_url           TEXT,
            photo_public_id     TEXT,
            created_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_trip_requests_requester
            ON trip_requests(requester_id, created_at);

        CREATE TABLE IF NOT EXISTS trips (
            trip_id             TEXT PRIMARY KEY,
            requester_id        TEXT NOT NULL REFERENCES users(id),
            requester_username  TEXT NOT NULL,
            requester_image     TEXT NOT NULL,
            companion_id        TEXT NOT NULL REFERENCES users(id),
            companion_username  TEXT NOT NULL,
            companion_image     TEXT NOT NULL,
            consent             INTEGER NOT NULL,
            distance_maintained REAL NOT NULL,
            distance_preferred  REAL NOT NULL,
            gender_preference   TEXT NOT NULL,
            image_verification  INTEGER NOT NULL,
            created_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
