// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Greeting endpoint and the home page.

use crate::error::Result;
use crate::flash::take_flash;
use crate::middleware::CurrentUser;
use crate::views;
use crate::AppState;
use axum::{
    extract::State,
    response::Html,
    routing::get,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/hello", get(hello))
        .route("/", get(home))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "static/js/generated/")
)]
pub struct HelloResponse {
    pub title: String,
}

async fn hello() -> Json<HelloResponse> {
    Json(HelloResponse {
        title: "Hello, World!".to_string(),
    })
}

/// Home page with the current user and every project.
async fn home(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>)> {
    let projects = state.db.list_projects().await?;
    let (jar, flash) = take_flash(jar);

    Ok((
        jar,
        Html(views::home_page(
            current.user.as_ref(),
            &projects,
            flash.as_deref(),
        )),
    ))
}
