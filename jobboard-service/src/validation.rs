//! Field validation rules
//!
//! Rules are written per field as a short chain; the first rule that fails
//! settles that field's message, and every failing field is reported.
//!
//! ```rust
//! use jobboard_service::validation::{text, FieldErrors};
//!
//! let mut errors = FieldErrors::new();
//! errors.check(text("email", "not-an-email").required().email());
//! errors.check(text("name", "Al").required().min_len(3).max_len(100));
//! errors.check(text("logo_url", "").optional().url());
//!
//! assert_eq!(errors.len(), 2);
//! assert_eq!(errors.iter().next().map(|e| e.message.as_str()), Some("Invalid email format"));
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::ids::DocumentId;

const REQUIRED: &str = "This field is required";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$")
        .expect("valid email pattern")
});

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://[^\s/?#]+(?:[/?#]\S*)?$").expect("valid url pattern")
});

/// One failed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name as it appears in the JSON body
    pub field: String,
    /// What is wrong with it
    pub message: String,
}

impl FieldError {
    /// Create a field error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Field errors collected while validating one payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    /// Record the outcome of a rule, if it failed
    pub fn check(&mut self, outcome: impl Into<Option<FieldError>>) {
        if let Some(error) = outcome.into() {
            self.0.push(error);
        }
    }

    /// True when nothing failed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failed fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Failed fields in the order they were checked
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// True when `field` has an error
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Consume into the underlying list
    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }
}

impl From<FieldError> for FieldErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

/// Rule chain for a string field
#[derive(Debug)]
#[must_use]
pub struct TextRule<'a> {
    field: &'static str,
    value: &'a str,
    error: Option<String>,
    skip: bool,
}

/// Start a rule chain for a string field
pub fn text<'a>(field: &'static str, value: &'a str) -> TextRule<'a> {
    TextRule {
        field,
        value,
        error: None,
        skip: false,
    }
}

impl<'a> TextRule<'a> {
    fn apply(mut self, passes: impl FnOnce(&str) -> bool, message: impl FnOnce() -> String) -> Self {
        if self.error.is_none() && !self.skip && !passes(self.value) {
            self.error = Some(message());
        }
        self
    }

    /// Value must be non-empty
    pub fn required(self) -> Self {
        self.apply(|v| !v.is_empty(), || REQUIRED.to_string())
    }

    /// An empty value passes and skips the remaining rules
    pub fn optional(mut self) -> Self {
        if self.value.is_empty() {
            self.skip = true;
        }
        self
    }

    /// At least `min` characters
    pub fn min_len(self, min: usize) -> Self {
        self.apply(
            |v| v.chars().count() >= min,
            || format!("Value is too short (minimum: {})", min),
        )
    }

    /// At most `max` characters
    pub fn max_len(self, max: usize) -> Self {
        self.apply(
            |v| v.chars().count() <= max,
            || format!("Value is too long (maximum: {})", max),
        )
    }

    /// Structurally valid email address
    pub fn email(self) -> Self {
        self.apply(|v| EMAIL_PATTERN.is_match(v), || "Invalid email format".to_string())
    }

    /// Absolute URL with a scheme and host
    pub fn url(self) -> Self {
        self.apply(|v| URL_PATTERN.is_match(v), || "Invalid URL format".to_string())
    }

    /// One of a fixed set of values
    pub fn one_of(self, allowed: &[&str]) -> Self {
        self.apply(
            |v| allowed.contains(&v),
            || format!("Invalid value. Allowed values: {}", allowed.join(" ")),
        )
    }
}

impl From<TextRule<'_>> for Option<FieldError> {
    fn from(rule: TextRule<'_>) -> Self {
        rule.error.map(|message| FieldError::new(rule.field, message))
    }
}

/// A reference field that must be present
pub fn required_id(field: &'static str, value: &Option<DocumentId>) -> Option<FieldError> {
    value
        .is_none()
        .then(|| FieldError::new(field, REQUIRED))
}

/// A required integer greater than zero
///
/// Zero counts as missing.
pub fn positive(field: &'static str, value: i64) -> Option<FieldError> {
    match value {
        0 => Some(FieldError::new(field, REQUIRED)),
        v if v < 0 => Some(FieldError::new(field, "Value must be greater than 0")),
        _ => None,
    }
}
