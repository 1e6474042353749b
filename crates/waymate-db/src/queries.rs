use crate::Database;
use crate::models::{TripRequestRow, TripRow, UserRow};
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password) VALUES (?1, ?2, ?3, ?4)",
                (id, username, email, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", username))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email = ?1", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", id))
    }

    // -- Email verification credential --

    /// Store a new OTP credential, superseding any prior one.
    pub fn set_otp_credential(&self, user_id: &str, code_hash: &str, expires_at: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users SET otp_hash = ?1, otp_expires_at = ?2 WHERE id = ?3",
                (code_hash, expires_at, user_id),
            )?;
            Ok(())
        })
    }

    /// Mark the account verified and clear the credential so the same code
    /// cannot be replayed.
    pub fn mark_verified(&self, user_id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users SET verified = 1, otp_hash = NULL, otp_expires_at = NULL WHERE id = ?1",
                [user_id],
            )?;
            Ok(())
        })
    }

    // -- Password reset tokens --

    pub fn set_reset_token(&self, user_id: &str, token_hash: &str, expires_at: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users SET reset_token_hash = ?1, reset_token_expires_at = ?2 WHERE id = ?3",
                (token_hash, expires_at, user_id),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_reset_hash(&self, token_hash: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "reset_token_hash = ?1", token_hash))
    }

    pub fn clear_reset_token(&self, user_id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users SET reset_token_hash = NULL, reset_token_expires_at = NULL WHERE id = ?1",
                [user_id],
            )?;
            Ok(())
        })
    }

    pub fn update_password(&self, user_id: &str, password_hash: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users
                 SET password = ?1, reset_token_hash = NULL, reset_token_expires_at = NULL
                 WHERE id = ?2",
                (password_hash, user_id),
            )?;
            Ok(())
        })
    }

    // -- Trip requests --

    pub fn insert_trip_request(&self, row: &TripRequestRow) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO trip_requests
                 (request_id, requester_id, requester_username, requester_image,
                  destination, destination_type, date, time, gender_preference, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    row.request_id,
                    row.requester_id,
                    row.requester_username,
                    row.requester_image,
                    row.destination,
                    row.destination_type,
                    row.date,
                    row.time,
                    row.gender_preference,
                    row.created_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_trip_request(&self, request_id: &str) -> Result<Option<TripRequestRow>> {
        self.with_conn(|conn| query_trip_request(conn, request_id))
    }

    /// Persist the mutable portion of a trip request. The requester snapshot
    /// and the request id are immutable once written.
    pub fn save_trip_request(&self, row: &TripRequestRow) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE trip_requests
                 SET destination = ?1, destination_type = ?2, date = ?3, time = ?4,
                     gender_preference = ?5, photo_url = ?6, photo_public_id = ?7
                 WHERE request_id = ?8",
                rusqlite::params![
                    row.destination,
                    row.destination_type,
                    row.date,
                    row.time,
                    row.gender_preference,
                    row.photo_url,
                    row.photo_public_id,
                    row.request_id,
                ],
            )?;
            Ok(())
        })
    }

    // -- Trips --

    pub fn insert_trip(&self, row: &TripRow) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO trips
                 (trip_id, requester_id, requester_username, requester_image,
                  companion_id, companion_username, companion_image,
                  consent, distance_maintained, distance_preferred,
                  gender_preference, image_verification, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                rusqlite::params![
                    row.trip_id,
                    row.requester_id,
                    row.requester_username,
                    row.requester_image,
                    row.companion_id,
                    row.companion_username,
                    row.companion_image,
                    row.consent,
                    row.distance_maintained,
                    row.distance_preferred,
                    row.gender_preference,
                    row.image_verification,
                    row.created_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_trip(&self, trip_id: &str) -> Result<Option<TripRow>> {
        self.with_conn(|conn| query_trip(conn, trip_id))
    }

    pub fn count_trips(&self) -> Result<i64> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM trips", [], |row| row.get(0))
                .map_err(Into::into)
        })
    }
}

fn query_user(conn: &Connection, predicate: &str, param: &str) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, username, email, password, profile_photo, verified,
                otp_hash, otp_expires_at, reset_token_hash, reset_token_expires_at, created_at
         FROM users WHERE {predicate}"
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([param], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                profile_photo: row.get(4)?,
                verified: row.get(5)?,
                otp_hash: row.get(6)?,
                otp_expires_at: row.get(7)?,
                reset_token_hash: row.get(8)?,
                reset_token_expires_at: row.get(9)?,
                created_at: row.get(10)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_trip_request(conn: &Connection, request_id: &str) -> Result<Option<TripRequestRow>> {
    let mut stmt = conn.prepare(
        "SELECT request_id, requester_id, requester_username, requester_image,
                destination, destination_type, date, time, gender_preference,
                photo_url, photo_public_id, created_at
         FROM trip_requests WHERE request_id = ?1",
    )?;

    let row = stmt
        .query_row([request_id], |row| {
            Ok(TripRequestRow {
                request_id: row.get(0)?,
                requester_id: row.get(1)?,
                requester_username: row.get(2)?,
                requester_image: row.get(3)?,
                destination: row.get(4)?,
                destination_type: row.get(5)?,
                date: row.get(6)?,
                time: row.get(7)?,
                gender_preference: row.get(8)?,
                photo_url: row.get(9)?,
                photo_public_id: row.get(10)?,
                created_at: row.get(11)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_trip(conn: &Connection, trip_id: &str) -> Result<Option<TripRow>> {
    let mut stmt = conn.prepare(
        "SELECT trip_id, requester_id, requester_username, requester_image,
                companion_id, companion_username, companion_image,
                consent, distance_maintained, distance_preferred,
                gender_preference, image_verification, created_at
         FROM trips WHERE trip_id = ?1",
    )?;

    let row = stmt
        .query_row([trip_id], |row| {
            Ok(TripRow {
                trip_id: row.get(0)?,
                requester_id: row.get(1)?,
                requester_username: row.get(2)?,
                requester_image: row.get(3)?,
                companion_id: row.get(4)?,
                companion_username: row.get(5)?,
                companion_image: row.get(6)?,
                consent: row.get(7)?,
                distance_maintained: row.get(8)?,
                distance_preferred: row.get(9)?,
                gender_preference: row.get(10)?,
                image_verification: row.get(11)?,
                created_at: row.get(12)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn create_and_look_up_user() {
        let db = db();
        db.create_user("u-1", "alice", "alice@example.com", "hash").unwrap();

        let by_name = db.get_user_by_username("alice").unwrap().unwrap();
        assert_eq!(by_name.id, "u-1");
        assert_eq!(by_name.email, "alice@example.com");
        assert!(!by_name.verified);
        assert!(by_name.otp_hash.is_none());

        let by_email = db.get_user_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(by_email.username, "alice");

        assert!(db.get_user_by_username("bob").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_rejected() {
        let db = db();
        db.create_user("u-1", "alice", "a@example.com", "hash").unwrap();
        assert!(db.create_user("u-2", "alice", "b@example.com", "hash").is_err());
    }

    #[test]
    fn otp_credential_set_and_cleared_on_verify() {
        let db = db();
        db.create_user("u-1", "alice", "alice@example.com", "hash").unwrap();
        db.set_otp_credential("u-1", "digest", "2099-01-01T00:00:00+00:00").unwrap();

        let user = db.get_user_by_id("u-1").unwrap().unwrap();
        assert_eq!(user.otp_hash.as_deref(), Some("digest"));

        db.mark_verified("u-1").unwrap();
        let user = db.get_user_by_id("u-1").unwrap().unwrap();
        assert!(user.verified);
        assert!(user.otp_hash.is_none());
        assert!(user.otp_expires_at.is_none());
    }

    #[test]
    fn trip_request_round_trip_and_save() {
        let db = db();
        db.create_user("u-1", "alice", "alice@example.com", "hash").unwrap();

        let mut row = TripRequestRow {
            request_id: "ALI1000".into(),
            requester_id: "u-1".into(),
            requester_username: "alice".into(),
            requester_image: "default.jpg".into(),
            destination: Some("Park".into()),
            destination_type: Some("outdoor".into()),
            date: Some("2024-01-01".into()),
            time: Some("10:00".into()),
            gender_preference: Some("any".into()),
            photo_url: None,
            photo_public_id: None,
            created_at: "2024-01-01T00:00:00+00:00".into(),
        };
        db.insert_trip_request(&row).unwrap();

        let stored = db.get_trip_request("ALI1000").unwrap().unwrap();
        assert_eq!(stored.destination.as_deref(), Some("Park"));
        assert!(stored.photo_url.is_none());

        row.date = Some("2024-02-02".into());
        row.photo_url = Some("http://media/x".into());
        row.photo_public_id = Some("trip-photos/u-1/x".into());
        db.save_trip_request(&row).unwrap();

        let stored = db.get_trip_request("ALI1000").unwrap().unwrap();
        assert_eq!(stored.date.as_deref(), Some("2024-02-02"));
        assert_eq!(stored.photo_public_id.as_deref(), Some("trip-photos/u-1/x"));
        // snapshot untouched
        assert_eq!(stored.requester_username, "alice");
    }

    #[test]
    fn trip_round_trip() {
        let db = db();
        db.create_user("u-1", "alice", "alice@example.com", "hash").unwrap();
        db.create_user("u-2", "bob", "bob@example.com", "hash").unwrap();

        let row = TripRow {
            trip_id: "ALIBOB1000".into(),
            requester_id: "u-1".into(),
            requester_username: "alice".into(),
            requester_image: "default.jpg".into(),
            companion_id: "u-2".into(),
            companion_username: "bob".into(),
            companion_image: "default.jpg".into(),
            consent: true,
            distance_maintained: 2.0,
            distance_preferred: 5.0,
            gender_preference: "any".into(),
            image_verification: false,
            created_at: "2024-01-01T00:00:00+00:00".into(),
        };
        db.insert_trip(&row).unwrap();

        let stored = db.get_trip("ALIBOB1000").unwrap().unwrap();
        assert_eq!(stored.companion_username, "bob");
        assert!(stored.consent);
        assert_eq!(db.count_trips().unwrap(), 1);
        assert!(db.get_trip("missing").unwrap().is_none());
    }
}
