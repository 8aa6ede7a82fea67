use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    /// Database-assigned sequence number (primary key)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<i64>,
    /// Unique user identifier (UUID v4)
    pub id: String,
    /// Login email, stored lowercased
    pub email: String,
    /// Login and profile handle, stored lowercased
    pub username: String,
    /// Display name
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh id.
    ///
    /// Email and username are normalized to lowercase so lookups are case-insensitive.
    pub fn new(email: &str, username: &str, name: &str) -> Self {
        let now = Utc::now();
        Self {
            sequence_number: None,
            id: uuid::Uuid::new_v4().to_string(),
            email: email.trim().to_lowercase(),
            username: username.trim().to_lowercase(),
            name: name.trim().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Column to look a user up by
#[derive(Debug, Clone)]
pub enum UserSearchField {
    Id(String),
    Email(String),
    Username(String),
}

impl fmt::Display for UserSearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserSearchField::Id(id) => write!(f, "id={id}"),
            UserSearchField::Email(email) => write!(f, "email={email}"),
            UserSearchField::Username(username) => write!(f, "username={username}"),
        }
    }
}
