//! Database row types — these map directly to SQLite rows.
//! Distinct from circulo-types API models to keep the DB layer independent.

use chrono::{DateTime, NaiveDateTime, Utc};
use circulo_types::models::User;
use tracing::warn;

pub struct UserRow {
    pub id: u64,
    pub name: String,
    pub nick: String,
    /// `None` when the query did not select it (follower listings).
    pub email: Option<String>,
    pub created_at: String,
}

/// Just enough to authenticate a login attempt.
pub struct CredentialRow {
    pub id: u64,
    pub password: String,
}

impl UserRow {
    pub fn into_model(self) -> User {
        let created_at = parse_timestamp(&self.created_at).unwrap_or_else(|| {
            warn!("Corrupt criado_em '{}' on user {}", self.created_at, self.id);
            DateTime::default()
        });

        User {
            id: self.id,
            name: self.name,
            nick: self.nick,
            email: self.email,
            created_at,
        }
    }
}

/// SQLite's `datetime('now')` has no timezone ("YYYY-MM-DD HH:MM:SS"); treat
/// it as UTC. RFC 3339 is accepted for rows written by other tools.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sqlite_datetime_as_utc() {
        let ts = parse_timestamp("2024-03-01 12:30:05").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T12:30:05+00:00");
    }

    #[test]
    fn parses_rfc3339() {
        let ts = parse_timestamp("2024-03-01T12:30:05Z").unwrap();
        assert_eq!(ts.timestamp(), 1_709_296_205);
    }

    #[test]
    fn corrupt_timestamp_falls_back_to_epoch() {
        let row = UserRow {
            id: 7,
            name: "Ana".into(),
            nick: "ana1".into(),
            email: None,
            created_at: "yesterday".into(),
        };
        let user = row.into_model();
        assert_eq!(user.created_at, DateTime::<Utc>::default());
        assert_eq!(user.id, 7);
    }
}
