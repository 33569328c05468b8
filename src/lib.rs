// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Signup: GitHub sign-in and project records
//!
//! This crate provides the web service that signs users in with GitHub and
//! lets them create, update and delete project records in a document store.

pub mod config;
pub mod db;
pub mod error;
pub mod flash;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod views;

use config::Config;
use db::Database;
use error::AppError;
use services::{GitHubClient, GitHubService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub github: GitHubService,
}

impl AppState {
    /// Wire the GitHub service to `db` using the credentials in `config`.
    pub fn new(config: Config, db: Database) -> Result<Self, AppError> {
        let client = GitHubClient::new(
            config.github_client_id.clone(),
            config.github_client_secret.clone(),
            config.github_oauth_url.clone(),
            config.github_api_url.clone(),
        )?;
        let github = GitHubService::new(client, db.clone());

        Ok(Self { config, db, github })
    }
}
