// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-shot notices carried to the next rendered page in a cookie.

use crate::config::Config;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const FLASH_COOKIE: &str = "signup_flash";

/// Queue `message` for the next page render.
pub fn set_flash(jar: CookieJar, message: &str, config: &Config) -> CookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, urlencoding::encode(message).into_owned()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(config.secure_cookies())
            .build(),
    )
}

/// Read and clear the pending message, if any.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<String>) {
    let message = jar
        .get(FLASH_COOKIE)
        .and_then(|c| urlencoding::decode(c.value()).ok().map(|m| m.into_owned()))
        .filter(|m| !m.is_empty());

    match message {
        Some(message) => (
            jar.remove(Cookie::build((FLASH_COOKIE, "")).path("/")),
            Some(message),
        ),
        None => (jar, None),
    }
}
