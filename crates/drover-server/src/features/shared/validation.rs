//! Shared validation utilities
//!
//! Common validation for identifiers used across commands.

use thiserror::Error;

/// Errors that can occur during slug validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SlugValidationError {
    #[error("name is required and cannot be empty")]
    Required,

    #[error("name must be between 1 and {max_length} characters")]
    TooLong { max_length: usize },

    #[error("name can only contain lowercase letters, numbers, and hyphens")]
    InvalidFormat,

    #[error("name must begin and end with a letter or number")]
    InvalidHyphenPlacement,

    #[error("name must not contain consecutive hyphens")]
    ConsecutiveHyphens,
}

/// Errors that can occur during actor id validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActorIdValidationError {
    #[error("actor id is required and cannot be empty")]
    Required,

    #[error("actor id must not exceed {max_length} characters")]
    TooLong { max_length: usize },

    #[error("actor id must not contain whitespace")]
    ContainsWhitespace,
}

/// Validate a dataset name (URL-safe slug).
///
/// Must be non-empty, at most `max_length` characters, lowercase
/// alphanumerics and hyphens only, must begin and end with an alphanumeric,
/// and must not contain consecutive hyphens.
pub fn validate_slug(slug: &str, max_length: usize) -> Result<(), SlugValidationError> {
    if slug.is_empty() {
        return Err(SlugValidationError::Required);
    }

    if slug.len() > max_length {
        return Err(SlugValidationError::TooLong { max_length });
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(SlugValidationError::InvalidFormat);
    }

    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(SlugValidationError::InvalidHyphenPlacement);
    }

    if slug.contains("--") {
        return Err(SlugValidationError::ConsecutiveHyphens);
    }

    Ok(())
}

/// Validate a provider actor id.
///
/// Actor ids are opaque to drover; only basic shape is enforced.
pub fn validate_actor_id(actor_id: &str, max_length: usize) -> Result<(), ActorIdValidationError> {
    if actor_id.is_empty() {
        return Err(ActorIdValidationError::Required);
    }

    if actor_id.len() > max_length {
        return Err(ActorIdValidationError::TooLong { max_length });
    }

    if actor_id.chars().any(|c| c.is_whitespace()) {
        return Err(ActorIdValidationError::ContainsWhitespace);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slugs() {
        assert!(validate_slug("common-crawl", 64).is_ok());
        assert!(validate_slug("dataset2", 64).is_ok());
        assert!(validate_slug("a", 64).is_ok());
    }

    #[test]
    fn test_invalid_slugs() {
        assert_eq!(validate_slug("", 64), Err(SlugValidationError::Required));
        assert_eq!(
            validate_slug("UpperCase", 64),
            Err(SlugValidationError::InvalidFormat)
        );
        assert_eq!(
            validate_slug("-leading", 64),
            Err(SlugValidationError::InvalidHyphenPlacement)
        );
        assert_eq!(
            validate_slug("trailing-", 64),
            Err(SlugValidationError::InvalidHyphenPlacement)
        );
        assert_eq!(
            validate_slug("double--hyphen", 64),
            Err(SlugValidationError::ConsecutiveHyphens)
        );
        assert_eq!(
            validate_slug("abcd", 3),
            Err(SlugValidationError::TooLong { max_length: 3 })
        );
    }

    #[test]
    fn test_actor_ids() {
        assert!(validate_actor_id("f01000", 64).is_ok());
        assert_eq!(
            validate_actor_id("", 64),
            Err(ActorIdValidationError::Required)
        );
        assert_eq!(
            validate_actor_id("f0 1000", 64),
            Err(ActorIdValidationError::ContainsWhitespace)
        );
    }
}
