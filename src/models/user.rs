//! User model for storage.

use serde::{Deserialize, Serialize};

/// User account stored in the `user` collection.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// GitHub login (also used as document ID). Empty until the
    /// profile has been fetched on first sign-in.
    #[serde(default)]
    pub user_id: String,
    /// Most recent GitHub access token
    pub github_access_token: String,
    #[serde(default)]
    pub email: String,
    /// GitHub profile page URL
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub name: String,
    /// When the user first signed in
    #[serde(default)]
    pub created_at: String,
    /// Last successful sign-in
    #[serde(default)]
    pub last_login: String,
}

impl User {
    /// A not-yet-identified user that only knows its access token.
    pub fn with_access_token(access_token: &str) -> Self {
        Self {
            github_access_token: access_token.to_string(),
            ..Self::default()
        }
    }

    /// Name to show in pages, falling back to the login.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.user_id
        } else {
            &self.name
        }
    }
}

// The access token must never end up in logs.
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("user_id", &self.user_id)
            .field("github_access_token", &"<redacted>")
            .field("email", &self.email)
            .field("profile", &self.profile)
            .field("name", &self.name)
            .field("created_at", &self.created_at)
            .field("last_login", &self.last_login)
            .finish()
    }
}
