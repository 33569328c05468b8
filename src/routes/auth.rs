// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GitHub OAuth authentication routes.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use ring::rand::{SecureRandom, SystemRandom};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::middleware::session::{session_cookie, session_removal_cookie};
use crate::middleware::CurrentUser;
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

pub const NONCE_COOKIE: &str = "signup_oauth_nonce";
const CALLBACK_PATH: &str = "/github-callback";
/// How long a login attempt may take at GitHub.
const STATE_MAX_AGE_MS: u128 = 10 * 60 * 1000;
const NONCE_BYTES: usize = 16;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login))
        .route(CALLBACK_PATH, get(github_callback))
        .route("/logout", get(logout))
}

/// Contents of the OAuth `state` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthState {
    pub issued_at_ms: u128,
    /// Must equal the nonce cookie set on the same browser
    pub nonce: String,
    /// Local path to return to once signed in
    pub next: String,
}

#[derive(Deserialize)]
pub struct LoginParams {
    #[serde(default)]
    next: Option<String>,
}

/// Start OAuth flow - redirect to GitHub authorization.
async fn login(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Query(params): Query<LoginParams>,
) -> Result<(CookieJar, Redirect)> {
    if current.user_id.is_some() {
        return Ok((jar, Redirect::to("/")));
    }

    let oauth_state = OAuthState {
        issued_at_ms: now_millis()?,
        nonce: generate_nonce()?,
        next: safe_next(params.next.as_deref()),
    };
    let signed_state = sign_state(&oauth_state, &state.config.oauth_state_key)?;

    let auth_url = state
        .github
        .client()
        .authorize_url(&state.config.callback_url(), &signed_state);

    tracing::info!(
        client_id = %state.config.github_client_id,
        next = %oauth_state.next,
        "Starting OAuth flow, redirecting to GitHub"
    );

    let jar = jar.add(nonce_cookie(oauth_state.nonce, &state.config));
    Ok((jar, Redirect::temporary(&auth_url)))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for a token, sign the user in.
async fn github_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    let now = now_millis()?;
    let oauth_state = params
        .state
        .as_deref()
        .and_then(|s| verify_and_decode_state(s, &state.config.oauth_state_key, now))
        .ok_or_else(|| {
            tracing::warn!("Invalid, expired or missing OAuth state");
            AppError::Unauthorized("Invalid or expired OAuth state".to_string())
        })?;

    let nonce_matches = jar
        .get(NONCE_COOKIE)
        .map(|cookie| bool::from(cookie.value().as_bytes().ct_eq(oauth_state.nonce.as_bytes())))
        .unwrap_or(false);
    if !nonce_matches {
        tracing::warn!("OAuth nonce mismatch! Potential login CSRF.");
        return Err(AppError::Unauthorized(
            "OAuth state was not issued to this browser".to_string(),
        ));
    }

    let jar = jar.remove(nonce_removal_cookie(&state.config));
    let next = safe_next(Some(&oauth_state.next));

    if let Some(error) = params.error {
        tracing::info!(error = %error, "GitHub authorization not granted");
        return Ok((jar, Redirect::to(&next)));
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return Ok((jar, Redirect::to(&next)));
    };

    tracing::info!("Exchanging authorization code for access token");

    let Some(access_token) = state
        .github
        .client()
        .exchange_code(&code, &state.config.callback_url())
        .await?
    else {
        return Ok((jar, Redirect::to(&next)));
    };

    let user = state.github.sign_in(&access_token).await?;

    let jar = jar.add(session_cookie(&user.user_id, &state.config)?);
    Ok((jar, Redirect::to(&next)))
}

/// Logout - drop the session cookie. The GitHub token is not revoked.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    (
        jar.remove(session_removal_cookie(&state.config)),
        Redirect::to("/"),
    )
}

fn nonce_cookie(nonce: String, config: &Config) -> Cookie<'static> {
    Cookie::build((NONCE_COOKIE, nonce))
        .path(CALLBACK_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .max_age(time::Duration::minutes(10))
        .build()
}

fn nonce_removal_cookie(config: &Config) -> Cookie<'static> {
    Cookie::build((NONCE_COOKIE, ""))
        .path(CALLBACK_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .build()
}

fn now_millis() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis())
}

fn generate_nonce() -> Result<String> {
    let mut bytes = [0u8; NONCE_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
    Ok(hex::encode(bytes))
}

/// Only local absolute paths are followed after login.
///
/// The path must be printable ASCII: browsers strip tabs and newlines, so
/// `/\t/host` reads as `//host`, and other bytes cannot go in `Location`.
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && path.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) =>
        {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

/// Encode and sign the OAuth state: base64url("ts_hex|nonce|next|sig_hex").
pub fn sign_state(oauth_state: &OAuthState, secret: &[u8]) -> Result<String> {
    let payload = format!(
        "{:x}|{}|{}",
        oauth_state.issued_at_ms, oauth_state.nonce, oauth_state.next
    );

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed_state = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed_state.as_bytes()))
}

/// Verify HMAC signature and age, then decode the OAuth state parameter.
pub fn verify_and_decode_state(state: &str, secret: &[u8], now_ms: u128) -> Option<OAuthState> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // `next` may itself contain '|', so the signature is split off the end.
    let (payload, signature_hex) = state_str.rsplit_once('|')?;
    let signature = hex::decode(signature_hex).ok()?;

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());
    if mac.verify_slice(&signature).is_err() {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    let mut parts = payload.splitn(3, '|');
    let issued_at_ms = u128::from_str_radix(parts.next()?, 16).ok()?;
    let nonce = parts.next()?.to_string();
    let next = parts.next()?.to_string();

    if now_ms.saturating_sub(issued_at_ms) > STATE_MAX_AGE_MS {
        tracing::warn!("OAuth state expired");
        return None;
    }

    Some(OAuthState {
        issued_at_ms,
        nonce,
        next,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state(next: &str) -> OAuthState {
        OAuthState {
            issued_at_ms: 1_234_567_890,
            nonce: "00ff00ff".to_string(),
            next: next.to_string(),
        }
    }

    #[test]
    fn test_verify_and_decode_state_success() {
        let secret = b"secret_key";
        let original = sample_state("/projects/create");

        let encoded = sign_state(&original, secret).unwrap();
        let result = verify_and_decode_state(&encoded, secret, original.issued_at_ms + 1000);

        assert_eq!(result, Some(original));
    }

    #[test]
    fn test_verify_and_decode_state_next_with_pipes() {
        let secret = b"secret_key";
        let original = sample_state("/a|b|c");

        let encoded = sign_state(&original, secret).unwrap();
        let result = verify_and_decode_state(&encoded, secret, original.issued_at_ms);

        assert_eq!(result.map(|s| s.next), Some("/a|b|c".to_string()));
    }

    #[test]
    fn test_verify_and_decode_state_invalid_signature() {
        let payload = "499602d2|00ff00ff|/";
        let state_data = format!("{}|{}", payload, "deadbeef");
        let encoded_state = URL_SAFE_NO_PAD.encode(state_data.as_bytes());

        let result = verify_and_decode_state(&encoded_state, b"secret_key", 1_234_567_890);
        assert_eq!(result, None);
    }

    #[test]
    fn test_verify_and_decode_state_wrong_secret() {
        let original = sample_state("/");
        let encoded = sign_state(&original, b"secret_key").unwrap();

        let result = verify_and_decode_state(&encoded, b"wrong_key", original.issued_at_ms);
        assert_eq!(result, None);
    }

    #[test]
    fn test_verify_and_decode_state_expired() {
        let original = sample_state("/");
        let encoded = sign_state(&original, b"secret_key").unwrap();

        let later = original.issued_at_ms + STATE_MAX_AGE_MS + 1;
        assert_eq!(verify_and_decode_state(&encoded, b"secret_key", later), None);
    }

    #[test]
    fn test_verify_and_decode_state_malformed() {
        let secret = b"secret_key";
        let encoded_state = URL_SAFE_NO_PAD.encode("invalid|format");
        assert_eq!(verify_and_decode_state(&encoded_state, secret, 0), None);
        assert_eq!(verify_and_decode_state("not base64!!", secret, 0), None);
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(None), "/");
        assert_eq!(safe_next(Some("/projects/create")), "/projects/create");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(Some("/\t/evil.example")), "/");
        assert_eq!(safe_next(Some("/\n")), "/");
        assert_eq!(safe_next(Some("/projects\r\nSet-Cookie: x=y")), "/");
        assert_eq!(safe_next(Some("/caf\u{e9}")), "/");
        assert_eq!(safe_next(Some("/projects/all?x=1")), "/projects/all?x=1");
    }

    #[test]
    fn test_nonce_is_random_hex() {
        let a = generate_nonce().unwrap();
        let b = generate_nonce().unwrap();
        assert_eq!(a.len(), NONCE_BYTES * 2);
        assert_ne!(a, b);
    }
}
