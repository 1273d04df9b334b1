//! The signed-in shopper.

use crate::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An explicit login session.
///
/// Created at login and consumed by [`Session::logout`]. Cart, order history
/// and checkout are constructed with a reference to it, which scopes their
/// storage keys to the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// Signed-in user.
    pub user_id: UserId,
    /// Display name.
    pub username: String,
    /// When the session was created.
    pub logged_in_at: DateTime<Utc>,
}

impl Session {
    /// Start a session for a user.
    pub fn login(user_id: UserId, username: impl Into<String>) -> Self {
        let session = Self {
            user_id,
            username: username.into(),
            logged_in_at: Utc::now(),
        };
        tracing::info!(user_id = %session.user_id, "logged in");
        session
    }

    /// End the session.
    pub fn logout(self) {
        tracing::info!(user_id = %self.user_id, "logged out");
    }

    /// Storage namespace for this user's data.
    pub fn scope(&self) -> &str {
        self.user_id.as_str()
    }
}
