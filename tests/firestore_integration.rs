// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running with
//! FIRESTORE_EMULATOR_HOST set, and are skipped otherwise.

use signup::error::AppError;
use signup::models::{Project, User};

mod common;
use common::test_db;

/// Unique suffix for test isolation.
fn unique_suffix() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

fn test_project(slug: &str, owner_id: &str) -> Project {
    Project {
        slug: slug.to_string(),
        project_name: format!("Project {slug}"),
        owner_id: owner_id.to_string(),
        members: vec![owner_id.to_string()],
        ..Project::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_user_upsert_and_lookup_by_token() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let user_id = format!("user-{suffix}");
    let token = format!("gho_{suffix}");

    assert!(db.get_user(&user_id).await.unwrap().is_none());
    assert!(db.find_user_by_token(&token).await.unwrap().is_none());

    let user = User {
        user_id: user_id.clone(),
        github_access_token: token.clone(),
        email: "test@example.com".to_string(),
        name: "Test User".to_string(),
        created_at: chrono::Utc::now().to_rfc3339(),
        last_login: chrono::Utc::now().to_rfc3339(),
        ..User::default()
    };
    db.upsert_user(&user).await.unwrap();

    assert_eq!(db.get_user(&user_id).await.unwrap(), Some(user.clone()));
    assert_eq!(db.find_user_by_token(&token).await.unwrap(), Some(user));
}

#[tokio::test]
async fn test_user_without_id_is_rejected() {
    require_emulator!();

    let db = test_db().await;
    let result = db.upsert_user(&User::with_access_token("gho_orphan")).await;
    assert!(result.is_err());
}

// ═══════════════════════════════════════════════════════════════════════════
// PROJECT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_project_lifecycle() {
    require_emulator!();

    let db = test_db().await;
    let slug = format!("project-{}", unique_suffix());
    let mut project = test_project(&slug, "alice");

    db.insert_project(&project).await.unwrap();
    assert_eq!(db.get_project(&slug).await.unwrap(), Some(project.clone()));

    let listed = db.list_projects().await.unwrap();
    assert!(listed.iter().any(|p| p.slug == slug));

    project.project_description = "updated".to_string();
    db.upsert_project(&project).await.unwrap();
    assert_eq!(
        db.get_project(&slug).await.unwrap().unwrap().project_description,
        "updated"
    );

    db.delete_project(&slug).await.unwrap();
    assert!(db.get_project(&slug).await.unwrap().is_none());
}

#[tokio::test]
async fn test_insert_existing_slug_conflicts() {
    require_emulator!();

    let db = test_db().await;
    let slug = format!("taken-{}", unique_suffix());

    db.insert_project(&test_project(&slug, "alice")).await.unwrap();

    let result = db.insert_project(&test_project(&slug, "bob")).await;
    assert!(matches!(result, Err(AppError::AlreadyExists(_))));

    let stored = db.get_project(&slug).await.unwrap().unwrap();
    assert_eq!(stored.owner_id, "alice");

    db.delete_project(&slug).await.unwrap();
}
