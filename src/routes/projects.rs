// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Project CRUD routes.

use crate::error::{AppError, Result};
use crate::flash::{set_flash, take_flash};
use crate::middleware::CurrentUser;
use crate::models::Project;
use crate::views;
use crate::AppState;
use axum::{
    extract::{FromRequest, Path, Request, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Form, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{Map, Value};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/projects/all", get(list_projects))
        .route("/projects/create", get(create_form).post(create_project))
        .route("/projects/{slug}", get(get_project))
        .route("/projects/{slug}/update", post(update_project))
        .route("/projects/{slug}/delete", get(delete_project))
}

// ─── Request Bodies ──────────────────────────────────────────

/// A write request body: a JSON object, or the url-encoded creation form.
pub struct ProjectBody {
    pub fields: Map<String, Value>,
    /// Submitted by the HTML form rather than an API client
    pub from_form: bool,
}

impl<S> FromRequest<S> for ProjectBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Ok(Self {
                fields: form_fields(pairs),
                from_form: true,
            });
        }

        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        match value {
            Value::Object(fields) => Ok(Self {
                fields,
                from_form: false,
            }),
            _ => Err(AppError::BadRequest(
                "Request body must be a JSON object".to_string(),
            )),
        }
    }
}

/// Map form pairs onto JSON fields. Blank inputs count as absent and
/// `members` is a comma-separated list.
fn form_fields(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut fields = Map::new();
    for (key, value) in pairs {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let value = if key == "members" {
            Value::Array(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(|m| Value::String(m.to_string()))
                    .collect(),
            )
        } else {
            Value::String(value.to_string())
        };
        fields.insert(key, value);
    }
    fields
}

// ─── Reads ───────────────────────────────────────────────────

async fn list_projects(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Project>>> {
    Ok(Json(state.db.list_projects().await?))
}

/// One project, or `{}` when the slug is unknown.
async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    let body = match state.db.get_project(&slug).await? {
        Some(project) => serde_json::to_value(project)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Project serialization: {}", e)))?,
        None => Value::Object(Map::new()),
    };
    Ok(Json(body))
}

// ─── Create ──────────────────────────────────────────────────

async fn create_form(
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
) -> (CookieJar, Html<String>) {
    let (jar, flash) = take_flash(jar);
    (
        jar,
        Html(views::create_project_page(
            current.user.as_ref(),
            flash.as_deref(),
        )),
    )
}

async fn create_project(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    body: ProjectBody,
) -> Result<Response> {
    let user_id = current.require_user_id()?;
    let project = Project::from_body(&body.fields)?;

    if state.db.get_project(&project.slug).await?.is_some() {
        return Ok(duplicate_project(jar, &project, &state));
    }

    match state.db.insert_project(&project).await {
        Ok(()) => {}
        // Lost a race with a concurrent create of the same slug.
        Err(AppError::AlreadyExists(_)) => return Ok(duplicate_project(jar, &project, &state)),
        Err(e) => return Err(e),
    }

    tracing::info!(slug = %project.slug, user_id, "Project created");

    if body.from_form {
        let message = format!("Created project {}", project.project_name);
        let jar = set_flash(jar, &message, &state.config);
        return Ok((jar, Redirect::to("/")).into_response());
    }

    Ok((StatusCode::CREATED, Json(project)).into_response())
}

fn duplicate_project(jar: CookieJar, project: &Project, state: &AppState) -> Response {
    tracing::info!(slug = %project.slug, "Rejected duplicate project");
    let message = format!(
        "A project called {} already exists ({})",
        project.project_name, project.slug
    );
    let jar = set_flash(jar, &message, &state.config);
    (jar, Redirect::to("/projects/create")).into_response()
}

// ─── Update / Delete ─────────────────────────────────────────

/// Load `slug` and check that `user_id` owns it.
async fn load_owned_project(state: &AppState, slug: &str, user_id: &str) -> Result<Project> {
    let project = state
        .db
        .get_project(slug)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("No project with slug {}", slug)))?;

    if !project.is_owned_by(user_id) {
        tracing::warn!(slug, user_id, owner = %project.owner_id, "Rejected change by non-owner");
        return Err(AppError::Unauthorized(
            "Only the project owner can change this project".to_string(),
        ));
    }

    Ok(project)
}

async fn update_project(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(slug): Path<String>,
    body: ProjectBody,
) -> Result<Json<Project>> {
    let user_id = current.require_user_id()?;
    let mut project = load_owned_project(&state, &slug, user_id).await?;

    let applied = project.apply_update(&body.fields)?;
    state.db.upsert_project(&project).await?;

    tracing::info!(slug = %project.slug, user_id, fields = ?applied, "Project updated");

    Ok(Json(project))
}

async fn delete_project(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(slug): Path<String>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    let user_id = current.require_user_id()?;
    let project = load_owned_project(&state, &slug, user_id).await?;

    state.db.delete_project(&project.slug).await?;

    tracing::info!(slug = %project.slug, user_id, "Project deleted");

    let message = format!("Deleted project {}", project.project_name);
    Ok((set_flash(jar, &message, &state.config), Redirect::to("/")))
}
