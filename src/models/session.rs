use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::Role;

/// The logged-in identity. Persisted as a singleton row; absence
/// means logged out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    pub name: String,
    pub location: String,
    pub role: Role,
    pub logged_in_at: DateTime<Utc>,
}
