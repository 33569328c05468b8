// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod github;
pub mod slug;

pub use github::{GitHubClient, GitHubProfile, GitHubService};
