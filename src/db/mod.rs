// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer: one facade over the Firestore and in-memory stores.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreStore;
pub use memory::MemoryStore;

use crate::config::DatabaseBackend;
use crate::error::AppError;
use crate::models::{Project, User};
use crate::services::slug::slugify;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "user";
    pub const PROJECTS: &str = "projects";
}

#[derive(Clone)]
enum Backend {
    Firestore(FirestoreStore),
    Memory(MemoryStore),
}

/// Document store handle shared by all requests.
#[derive(Clone)]
pub struct Database {
    backend: Backend,
}

impl Database {
    /// Connect to the configured backend.
    pub async fn connect(backend: &DatabaseBackend) -> Result<Self, AppError> {
        match backend {
            DatabaseBackend::Memory => {
                tracing::warn!("Using in-memory database, data is not persisted");
                Ok(Self::in_memory())
            }
            DatabaseBackend::Firestore { project_id } => Ok(Self {
                backend: Backend::Firestore(FirestoreStore::new(project_id).await?),
            }),
        }
    }

    /// A fresh, empty in-memory database.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(MemoryStore::new()),
        }
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by GitHub login.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.get_user(user_id).await,
            Backend::Memory(store) => Ok(store.get_user(user_id)),
        }
    }

    /// Find the user whose stored access token equals `access_token`.
    pub async fn find_user_by_token(&self, access_token: &str) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.find_user_by_token(access_token).await,
            Backend::Memory(store) => Ok(store.find_user_by_token(access_token)),
        }
    }

    /// Create or replace a user, keyed by `user_id`.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        if user.user_id.is_empty() {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Refusing to store a user without user_id"
            )));
        }
        match &self.backend {
            Backend::Firestore(store) => store.upsert_user(user).await,
            Backend::Memory(store) => {
                store.upsert_user(user);
                Ok(())
            }
        }
    }

    // ─── Project Operations ──────────────────────────────────────

    /// All projects, ordered by slug.
    pub async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.list_projects().await,
            Backend::Memory(store) => Ok(store.list_projects()),
        }
    }

    /// Get a project by slug. Strings `slugify` never produces (`a/b`, `..`)
    /// cannot name a project and are not valid document IDs, so they miss.
    pub async fn get_project(&self, slug: &str) -> Result<Option<Project>, AppError> {
        if slug.is_empty() || slugify(slug) != slug {
            tracing::debug!(slug, "Not a slug, treating as missing");
            return Ok(None);
        }
        match &self.backend {
            Backend::Firestore(store) => store.get_project(slug).await,
            Backend::Memory(store) => Ok(store.get_project(slug)),
        }
    }

    /// Insert a new project; `AppError::AlreadyExists` if the slug is taken.
    pub async fn insert_project(&self, project: &Project) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.insert_project(project).await,
            Backend::Memory(store) => store.insert_project(project),
        }
    }

    /// Create or replace a project, keyed by `slug`.
    pub async fn upsert_project(&self, project: &Project) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.upsert_project(project).await,
            Backend::Memory(store) => {
                store.upsert_project(project);
                Ok(())
            }
        }
    }

    pub async fn delete_project(&self, slug: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(store) => store.delete_project(slug).await,
            Backend::Memory(store) => {
                store.delete_project(slug);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(slug: &str) -> Project {
        Project {
            slug: slug.to_string(),
            project_name: slug.to_string(),
            ..Project::default()
        }
    }

    #[tokio::test]
    async fn test_get_project_rejects_non_slug_ids() {
        let db = Database::in_memory();
        db.insert_project(&project("my-cool-project")).await.unwrap();
        db.upsert_project(&project("a/b")).await.unwrap();

        assert!(db.get_project("my-cool-project").await.unwrap().is_some());
        for id in ["a/b", "..", "", "My-Cool-Project", "my cool project"] {
            assert!(db.get_project(id).await.unwrap().is_none(), "{id:?}");
        }
    }

    #[tokio::test]
    async fn test_upsert_user_requires_id() {
        let db = Database::in_memory();
        assert!(db.upsert_user(&User::with_access_token("gho_x")).await.is_err());
    }
}
