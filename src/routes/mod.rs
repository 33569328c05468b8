// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod auth;
pub mod pages;
pub mod projects;

use crate::middleware::{load_current_user, security::add_security_headers};
use crate::AppState;
use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Build the complete router with all routes.
///
/// Layers run outermost first: tracing, security headers, then the session
/// lookup that every handler relies on.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(pages::routes())
        .merge(auth::routes())
        .merge(projects::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            load_current_user,
        ))
        .layer(middleware::from_fn(add_security_headers))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
