// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! URL-safe identifiers derived from display names.

/// Lowercase, transliterate to ASCII and hyphenate `name`.
///
/// Not unique on its own; callers must check for an existing record.
/// Returns an empty string when `name` has no letters or digits.
pub fn slugify(name: &str) -> String {
    ::slug::slugify(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("My Cool Project"), "my-cool-project");
    }

    #[test]
    fn test_slugify_collapses_punctuation() {
        assert_eq!(slugify("  Hello,   World!! "), "hello-world");
        assert_eq!(slugify("my_cool--project"), "my-cool-project");
    }

    #[test]
    fn test_slugify_transliterates() {
        assert_eq!(slugify("Café Déjà Vu"), "cafe-deja-vu");
    }

    #[test]
    fn test_slugify_collisions_are_possible() {
        assert_eq!(slugify("My Cool Project"), slugify("my-cool project!"));
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }
}
