// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GitHub OAuth and REST client, and the sign-in flow built on it.
//!
//! Handles:
//! - Authorization URL construction
//! - Code-for-token exchange
//! - Profile fetch for first-time users
//! - Mapping the GitHub identity onto a local `User`

use crate::db::Database;
use crate::error::AppError;
use crate::models::User;
use serde::Deserialize;

/// Scope requested from GitHub; enough to read the primary email.
const OAUTH_SCOPE: &str = "user:email";

/// GitHub API client.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    oauth_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
}

impl GitHubClient {
    /// Create a new GitHub client with OAuth app credentials.
    pub fn new(
        client_id: String,
        client_secret: String,
        oauth_url: String,
        api_url: String,
    ) -> Result<Self, AppError> {
        // GitHub rejects API requests without a User-Agent.
        let http = reqwest::Client::builder()
            .user_agent(concat!("signup/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            oauth_url,
            api_url,
            client_id,
            client_secret,
        })
    }

    /// URL the browser is sent to for authorization.
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}/authorize?client_id={}&redirect_uri={}&scope={}&state={}",
            self.oauth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(OAUTH_SCOPE),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for an access token.
    ///
    /// Returns `Ok(None)` when GitHub answers with an OAuth error (expired or
    /// reused code, denied access); transport and HTTP failures are errors.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<Option<String>, AppError> {
        let response = self
            .http
            .post(format!("{}/access_token", self.oauth_url))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| AppError::GitHubApi(format!("Token exchange failed: {}", e)))?;

        let exchange: TokenExchangeResponse = check_response_json(response).await?;

        if let Some(error) = exchange.error {
            tracing::warn!(
                error = %error,
                description = exchange.error_description.as_deref().unwrap_or(""),
                "GitHub refused the authorization code"
            );
            return Ok(None);
        }

        Ok(exchange.access_token.filter(|t| !t.is_empty()))
    }

    /// Get the authenticated user's profile.
    pub async fn get_profile(&self, access_token: &str) -> Result<GitHubProfile, AppError> {
        let response = self
            .http
            .get(format!("{}/user", self.api_url))
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::GitHubApi(e.to_string()))?;

        check_response_json(response).await
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, body = %body, "GitHub request failed");
        return Err(AppError::GitHubApi(format!("HTTP {}", status)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::GitHubApi(format!("JSON parse error: {}", e)))
}

/// Token endpoint response. GitHub answers 200 with `error` set on failure.
#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Subset of `GET /user`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubProfile {
    pub login: String,
    pub email: Option<String>,
    pub html_url: String,
    pub name: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// GitHubService - sign-in on top of the client
// ─────────────────────────────────────────────────────────────────────────────

/// Maps GitHub identities onto local users.
#[derive(Clone)]
pub struct GitHubService {
    client: GitHubClient,
    db: Database,
}

impl GitHubService {
    pub fn new(client: GitHubClient, db: Database) -> Self {
        Self { client, db }
    }

    pub fn client(&self) -> &GitHubClient {
        &self.client
    }

    /// Resolve (creating or refreshing) the local user for `access_token`.
    ///
    /// The profile endpoint is only called when no stored user carries this
    /// token yet. Profile errors propagate; nothing is stored in that case.
    pub async fn sign_in(&self, access_token: &str) -> Result<User, AppError> {
        let mut user = match self.db.find_user_by_token(access_token).await? {
            Some(user) => user,
            None => User::with_access_token(access_token),
        };

        let now = chrono::Utc::now().to_rfc3339();

        if user.user_id.is_empty() {
            let profile = self.client.get_profile(access_token).await?;

            // A returning user with a fresh token keeps their original record.
            let created_at = self
                .db
                .get_user(&profile.login)
                .await?
                .map(|existing| existing.created_at)
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| now.clone());

            user.user_id = profile.login;
            user.email = profile.email.unwrap_or_default();
            user.profile = profile.html_url;
            user.name = profile.name.unwrap_or_default();
            user.created_at = created_at;

            tracing::info!(user_id = %user.user_id, "Fetched GitHub profile");
        }

        user.github_access_token = access_token.to_string();
        user.last_login = now;
        self.db.upsert_user(&user).await?;

        tracing::info!(user_id = %user.user_id, "User signed in");

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GitHubClient {
        GitHubClient::new(
            "client id".to_string(),
            "secret".to_string(),
            "https://github.com/login/oauth".to_string(),
            "http://127.0.0.1:9".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_authorize_url_encodes_parameters() {
        let url = client().authorize_url("http://localhost:8080/github-callback", "abc-_123");

        assert!(url.starts_with("https://github.com/login/oauth/authorize?"));
        assert!(url.contains("client_id=client%20id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fgithub-callback"));
        assert!(url.contains("scope=user%3Aemail"));
        assert!(url.contains("state=abc-_123"));
    }

    #[tokio::test]
    async fn test_sign_in_known_token_skips_profile_fetch() {
        // The API URL points at the discard port, so a profile fetch would fail.
        let db = Database::in_memory();
        let mut existing = User::with_access_token("gho_known");
        existing.user_id = "octocat".to_string();
        existing.name = "The Octocat".to_string();
        existing.created_at = "2026-01-01T00:00:00+00:00".to_string();
        db.upsert_user(&existing).await.unwrap();

        let service = GitHubService::new(client(), db.clone());
        let user = service.sign_in("gho_known").await.unwrap();

        assert_eq!(user.user_id, "octocat");
        assert_eq!(user.name, "The Octocat");
        assert_eq!(user.created_at, "2026-01-01T00:00:00+00:00");
        assert!(!user.last_login.is_empty());
    }
}
