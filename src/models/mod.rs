// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod project;
pub mod user;

pub use project::{Comment, FieldShape, Project, PROJECT_SCHEMA};
pub use user::User;
