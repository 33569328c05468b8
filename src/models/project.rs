// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Project model and its static schema.
//!
//! Request bodies arrive as loose JSON objects. `Project::from_body` projects
//! them onto the schema (whitelist, defaults, shape check) and
//! `Project::apply_update` overwrites existing keys on a stored record.

use crate::error::{AppError, Result};
use crate::services::slug::slugify;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Stored project record in the `projects` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "static/js/generated/")
)]
pub struct Project {
    /// URL-safe identifier derived from `project_name` (also the document ID)
    pub slug: String,
    pub project_name: String,
    /// GitHub login of the owner; compared against the session user
    pub owner_id: String,
    pub members: Vec<String>,
    pub comments: Vec<Comment>,
    pub project_repo: String,
    pub project_description: String,
    pub project_url: String,
}

/// A comment left on a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "static/js/generated/")
)]
pub struct Comment {
    pub body: String,
    pub user: String,
    pub posted: DateTime<Utc>,
}

/// Container/string shape a schema field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    Text,
    TextList,
    CommentList,
}

impl FieldShape {
    /// Value a field takes when the request leaves it out.
    pub fn default_value(self) -> Value {
        match self {
            FieldShape::Text => Value::String(String::new()),
            FieldShape::TextList | FieldShape::CommentList => Value::Array(Vec::new()),
        }
    }

    pub fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (FieldShape::Text, Value::String(_)) => true,
            (FieldShape::TextList, Value::Array(items)) => items.iter().all(Value::is_string),
            (FieldShape::CommentList, Value::Array(items)) => items
                .iter()
                .all(|item| serde_json::from_value::<Comment>(item.clone()).is_ok()),
            _ => false,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            FieldShape::Text => "a string",
            FieldShape::TextList => "a list of strings",
            FieldShape::CommentList => "a list of comments",
        }
    }
}

/// Every key a stored project carries, besides the derived `slug`.
pub const PROJECT_SCHEMA: &[(&str, FieldShape)] = &[
    ("project_name", FieldShape::Text),
    ("owner_id", FieldShape::Text),
    ("members", FieldShape::TextList),
    ("comments", FieldShape::CommentList),
    ("project_repo", FieldShape::Text),
    ("project_description", FieldShape::Text),
    ("project_url", FieldShape::Text),
];

/// Keys that are never taken from a create request.
const CREATE_IGNORED_FIELDS: &[&str] = &["comments"];

/// Keys an update can never change.
const IMMUTABLE_FIELDS: &[&str] = &["project_name", "slug"];

impl Project {
    /// Build a new project from a create request body.
    pub fn from_body(body: &Map<String, Value>) -> Result<Self> {
        let project_name = match body.get("project_name") {
            None | Some(Value::Null) => {
                return Err(AppError::BadRequest("project_name is required".to_string()))
            }
            Some(Value::String(name)) => name,
            Some(_) => {
                return Err(AppError::BadRequest(
                    "project_name must be a string".to_string(),
                ))
            }
        };

        let slug = slugify(project_name);
        if slug.is_empty() {
            return Err(AppError::BadRequest(
                "project_name must contain at least one letter or digit".to_string(),
            ));
        }

        let mut doc = Map::new();
        doc.insert("slug".to_string(), Value::String(slug));

        for &(field, shape) in PROJECT_SCHEMA {
            let value = match body.get(field) {
                Some(value) if !CREATE_IGNORED_FIELDS.contains(&field) => value.clone(),
                _ => shape.default_value(),
            };
            if !shape.matches(&value) {
                return Err(AppError::BadRequest(format!(
                    "{} must be {}",
                    field,
                    shape.describe()
                )));
            }
            doc.insert(field.to_string(), value);
        }

        serde_json::from_value(Value::Object(doc))
            .map_err(|e| AppError::BadRequest(format!("Invalid project: {}", e)))
    }

    /// Overwrite every existing, mutable key present in `body`.
    ///
    /// Returns the keys that were applied. On error `self` is left untouched.
    pub fn apply_update(&mut self, body: &Map<String, Value>) -> Result<Vec<String>> {
        let Value::Object(mut doc) = serde_json::to_value(&*self)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Project serialization: {}", e)))?
        else {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Project did not serialize to an object"
            )));
        };

        let mut applied = Vec::new();
        for (key, value) in body {
            if IMMUTABLE_FIELDS.contains(&key.as_str()) || !doc.contains_key(key) {
                continue;
            }
            doc.insert(key.clone(), value.clone());
            applied.push(key.clone());
        }

        let updated: Project = serde_json::from_value(Value::Object(doc)).map_err(|e| {
            AppError::BadRequest(format!("Update does not match the project schema: {}", e))
        })?;
        *self = updated;

        Ok(applied)
    }

    /// Whether `user_id` owns this project.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}
