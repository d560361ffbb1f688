use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A signed-in user. Sessions live only as long as the front end keeps them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub identifier: String,
    pub session_id: Uuid,
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    pub fn new(identifier: impl Into<String>, signed_in_at: DateTime<Utc>) -> Self {
        Self {
            identifier: identifier.into(),
            session_id: Uuid::new_v4(),
            signed_in_at,
        }
    }
}
