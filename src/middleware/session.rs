// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cookie session: a signed JWT naming the signed-in GitHub login.
//!
//! `load_current_user` runs before every route and resolves the session into
//! a `CurrentUser` request extension.

use crate::config::Config;
use crate::error::AppError;
use crate::models::User;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const SESSION_COOKIE: &str = "signup_session";
const SESSION_LIFETIME_DAYS: i64 = 30;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (GitHub login)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Who is making the request.
///
/// `user_id` comes from the session alone; `user` is the stored record and
/// stays `None` when the session names a user that no longer resolves.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser {
    pub user_id: Option<String>,
    pub user: Option<User>,
}

impl CurrentUser {
    /// The session's user id, or `Unauthorized`.
    pub fn require_user_id(&self) -> Result<&str, AppError> {
        self.user_id
            .as_deref()
            .ok_or_else(|| AppError::Unauthorized("Login required".to_string()))
    }
}

/// Middleware that resolves the session cookie into a `CurrentUser`.
///
/// Never rejects: a missing, expired or forged token means anonymous.
pub async fn load_current_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = jar.get(SESSION_COOKIE).and_then(|cookie| {
        verify_session_token(cookie.value(), &state.config.session_key)
            .map_err(|e| tracing::debug!(error = %e, "Ignoring invalid session token"))
            .ok()
    });

    let user = match user_id.as_deref() {
        Some(id) => state.db.get_user(id).await?,
        None => None,
    };

    if let (Some(id), None) = (&user_id, &user) {
        tracing::debug!(user_id = %id, "Session user not found");
    }

    request
        .extensions_mut()
        .insert(CurrentUser { user_id, user });

    Ok(next.run(request).await)
}

/// Create a JWT for a user session.
pub fn create_session_token(user_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + (SESSION_LIFETIME_DAYS as usize) * 24 * 60 * 60,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Validate a session JWT and return its subject.
pub fn verify_session_token(
    token: &str,
    signing_key: &[u8],
) -> Result<String, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<Claims>(token, &key, &validation)?;
    Ok(token_data.claims.sub)
}

/// Cookie carrying a freshly issued session token.
pub fn session_cookie(user_id: &str, config: &Config) -> Result<Cookie<'static>, AppError> {
    let token = create_session_token(user_id, &config.session_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    Ok(Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .max_age(time::Duration::days(SESSION_LIFETIME_DAYS))
        .build())
}

/// Cookie that removes the session; attributes must match `session_cookie`.
pub fn session_removal_cookie(config: &Config) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_roundtrip() {
        let key = b"session-key";
        let token = create_session_token("octocat", key).unwrap();
        assert_eq!(verify_session_token(&token, key).unwrap(), "octocat");
    }

    #[test]
    fn test_session_token_wrong_key() {
        let token = create_session_token("octocat", b"key-one").unwrap();
        assert!(verify_session_token(&token, b"key-two").is_err());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let config = Config::test_default();
        let cookie = session_cookie("octocat", &config).unwrap().to_string();

        assert!(cookie.starts_with("signup_session="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_require_user_id() {
        let anonymous = CurrentUser::default();
        assert!(matches!(
            anonymous.require_user_id(),
            Err(AppError::Unauthorized(_))
        ));

        let signed_in = CurrentUser {
            user_id: Some("octocat".to_string()),
            user: None,
        };
        assert_eq!(signed_in.require_user_id().unwrap(), "octocat");
    }
}
