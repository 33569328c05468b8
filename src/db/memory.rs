// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store used for local development and tests.

use crate::error::AppError;
use crate::models::{Project, User};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Collections held in concurrent maps keyed by document ID.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<DashMap<String, User>>,
    projects: Arc<DashMap<String, Project>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_user(&self, user_id: &str) -> Option<User> {
        self.users.get(user_id).map(|u| u.value().clone())
    }

    pub fn find_user_by_token(&self, access_token: &str) -> Option<User> {
        self.users
            .iter()
            .find(|u| u.github_access_token == access_token)
            .map(|u| u.value().clone())
    }

    pub fn upsert_user(&self, user: &User) {
        self.users.insert(user.user_id.clone(), user.clone());
    }

    pub fn list_projects(&self) -> Vec<Project> {
        let mut projects: Vec<Project> = self.projects.iter().map(|p| p.value().clone()).collect();
        projects.sort_by(|a, b| a.slug.cmp(&b.slug));
        projects
    }

    pub fn get_project(&self, slug: &str) -> Option<Project> {
        self.projects.get(slug).map(|p| p.value().clone())
    }

    pub fn insert_project(&self, project: &Project) -> Result<(), AppError> {
        match self.projects.entry(project.slug.clone()) {
            Entry::Occupied(_) => Err(AppError::AlreadyExists(format!(
                "Project {} already exists",
                project.slug
            ))),
            Entry::Vacant(slot) => {
                slot.insert(project.clone());
                Ok(())
            }
        }
    }

    pub fn upsert_project(&self, project: &Project) {
        self.projects.insert(project.slug.clone(), project.clone());
    }

    pub fn delete_project(&self, slug: &str) {
        self.projects.remove(slug);
    }
}
