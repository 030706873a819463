//! User reference data and caller sessions.

use serde::{Deserialize, Serialize};

/// Role of an authenticated caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// A registered user. Referenced by requests, never mutated by the
/// lifecycle engine; identity issuance happens upstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Role
    pub role: Role,
    /// National identity card number, if provided at registration
    pub nic: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl User {
    /// Create a new user with the default `User` role.
    pub fn new(name: String, email: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            email,
            role: Role::User,
            nic: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// The authenticated caller, passed explicitly into every lifecycle
/// operation. There is no ambient auth state anywhere in the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Caller's user ID
    pub user_id: String,
    /// Caller's role
    pub role: Role,
}

impl Session {
    /// Session for a regular user.
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::User,
        }
    }

    /// Session for an administrator.
    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Admin,
        }
    }

    /// Whether the caller holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
