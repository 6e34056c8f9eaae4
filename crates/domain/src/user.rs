use chrono::{DateTime, Utc};
use common::UserId;
use serde::{Deserialize, Serialize};

/// A registered user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,

    /// Hashed password. Never serialized into API responses.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub first_name: String,
    pub last_name: String,

    /// Role label (`"user"` by default). Stored and returned but not
    /// enforced anywhere in this service.
    pub role: String,

    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user row. The password arrives already hashed;
/// hashing is the auth service's concern.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

impl NewUser {
    /// Creates a new user input with the default `"user"` role.
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password_hash: password_hash.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role: "user".to_string(),
        }
    }
}
