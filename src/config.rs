// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A single `SECRET_KEY` is expanded with HKDF into the separate keys used
//! for session tokens and OAuth state signatures.

use hkdf::Hkdf;
use sha2::Sha256;
use std::env;

const DEFAULT_SECRET_KEY: &str = "dev";

/// Which document store backs the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseBackend {
    /// Process-local store; contents are lost on restart.
    Memory,
    /// Google Cloud Firestore in the given project.
    Firestore { project_id: String },
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// GitHub OAuth app client ID (public)
    pub github_client_id: String,
    /// GitHub OAuth endpoints base, e.g. `https://github.com/login/oauth`
    pub github_oauth_url: String,
    /// GitHub REST API base, e.g. `https://api.github.com`
    pub github_api_url: String,
    /// Public origin of this service (no trailing slash)
    pub base_url: String,
    /// Server port
    pub port: u16,
    /// Document store selection
    pub database: DatabaseBackend,

    // --- Secrets ---
    /// GitHub OAuth app client secret
    pub github_client_secret: String,
    /// HS256 key for session tokens (derived)
    pub session_key: Vec<u8>,
    /// HMAC key for the OAuth state parameter (derived)
    pub oauth_state_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let secret_key = env::var("SECRET_KEY").unwrap_or_else(|_| {
            tracing::warn!("SECRET_KEY not set, using insecure development key");
            DEFAULT_SECRET_KEY.to_string()
        });
        let (session_key, oauth_state_key) = derive_keys(secret_key.as_bytes())?;

        let database = match env::var("DATABASE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .as_str()
        {
            "memory" => DatabaseBackend::Memory,
            "firestore" => DatabaseBackend::Firestore {
                project_id: env::var("GCP_PROJECT_ID")
                    .unwrap_or_else(|_| "local-dev".to_string()),
            },
            other => return Err(ConfigError::Invalid("DATABASE_BACKEND", other.to_string())),
        };

        Ok(Self {
            github_client_id: env::var("GITHUB_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("GITHUB_CLIENT_ID"))?,
            github_oauth_url: env::var("GITHUB_OAUTH_URL")
                .unwrap_or_else(|_| "https://github.com/login/oauth".to_string()),
            github_api_url: env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            base_url: env::var("BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            database,

            github_client_secret: env::var("GITHUB_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GITHUB_CLIENT_SECRET"))?,
            session_key,
            oauth_state_key,
        })
    }

    /// Deterministic configuration for tests.
    pub fn test_default() -> Self {
        let (session_key, oauth_state_key) =
            derive_keys(b"test_secret_key").expect("HKDF output length is valid");
        Self {
            github_client_id: "test_client_id".to_string(),
            github_oauth_url: "http://127.0.0.1:9/login/oauth".to_string(),
            github_api_url: "http://127.0.0.1:9".to_string(),
            base_url: "http://localhost:8080".to_string(),
            port: 8080,
            database: DatabaseBackend::Memory,
            github_client_secret: "test_secret".to_string(),
            session_key,
            oauth_state_key,
        }
    }

    /// Cookies carry the `Secure` attribute only when served over HTTPS.
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Redirect URI registered with the GitHub OAuth app.
    pub fn callback_url(&self) -> String {
        format!("{}/github-callback", self.base_url)
    }
}

/// Expand the master secret into (session key, OAuth state key).
fn derive_keys(secret: &[u8]) -> Result<(Vec<u8>, Vec<u8>), ConfigError> {
    let hk = Hkdf::<Sha256>::new(None, secret);

    let mut session_key = vec![0u8; 32];
    hk.expand(b"signup session token", &mut session_key)
        .map_err(|e| ConfigError::KeyDerivation(e.to_string()))?;

    let mut state_key = vec![0u8; 32];
    hk.expand(b"signup oauth state", &mut state_key)
        .map_err(|e| ConfigError::KeyDerivation(e.to_string()))?;

    Ok((session_key, state_key))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),
}
