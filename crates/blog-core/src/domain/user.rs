use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - someone who can sign in to the site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    /// Site admins may edit and delete posts.
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(email: String, password_hash: String, is_admin: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            is_admin,
            created_at: now,
            updated_at: now,
        }
    }

    /// Roles carried in this user's session token.
    pub fn roles(&self) -> Vec<String> {
        if self.is_admin {
            vec![crate::authz::ADMIN_ROLE.to_string()]
        } else {
            vec!["user".to_string()]
        }
    }
}
