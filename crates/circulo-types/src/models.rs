use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered identity as it leaves the server. Carries no credential field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(rename = "nome")]
    pub name: String,
    pub nick: String,
    /// Omitted from follower/following listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "criadoEm")]
    pub created_at: DateTime<Utc>,
}
