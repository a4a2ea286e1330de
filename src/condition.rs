//! Typed POST policy conditions.
//!
//! A [`Condition`] is validated when it is constructed; once built it is an immutable value.
//! Field names are given without the `$` sigil, which is added when the policy is serialized.

use {
    crate::{constants::*, PostPolicyError},
    serde::ser::{Serialize, SerializeTuple, Serializer},
};

/// The form field must equal a value exactly.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExactMatch {
    field: String,
    value: String,
}

impl ExactMatch {
    /// The form field name.
    #[inline]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The required value.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// The form field must begin with a prefix. An empty prefix allows any value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StartsWith {
    field: String,
    prefix: String,
}

impl StartsWith {
    /// The form field name.
    #[inline]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The required prefix.
    #[inline]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// Bounds on the uploaded object's size in bytes, inclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentLengthRange {
    min: u64,
    max: u64,
}

impl ContentLengthRange {
    /// The minimum allowed size.
    #[inline]
    pub fn min(&self) -> u64 {
        self.min
    }

    /// The maximum allowed size.
    #[inline]
    pub fn max(&self) -> u64 {
        self.max
    }
}

/// A single constraint the POST request's form fields must satisfy.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Condition {
    /// `["eq", "$field", "value"]`
    ExactMatch(ExactMatch),

    /// `["starts-with", "$field", "prefix"]`
    StartsWith(StartsWith),

    /// `["content-length-range", min, max]`
    ContentLengthRange(ContentLengthRange),
}

fn validate_field(field: &str) -> Result<(), PostPolicyError> {
    if field.is_empty() {
        return Err(PostPolicyError::InvalidCondition("Condition field must not be empty".to_string()));
    }

    if field.starts_with('$') {
        return Err(PostPolicyError::InvalidCondition(format!(
            "Condition field must be given without the '$' prefix: '{}'",
            field
        )));
    }

    Ok(())
}

impl Condition {
    /// Require `field` to equal `value` exactly.
    pub fn exact_match<F: Into<String>, V: Into<String>>(field: F, value: V) -> Result<Self, PostPolicyError> {
        let field = field.into();
        validate_field(&field)?;
        Ok(Self::ExactMatch(ExactMatch {
            field,
            value: value.into(),
        }))
    }

    /// Require `field` to begin with `prefix`. An empty prefix allows any value.
    pub fn starts_with<F: Into<String>, P: Into<String>>(field: F, prefix: P) -> Result<Self, PostPolicyError> {
        let field = field.into();
        validate_field(&field)?;
        Ok(Self::StartsWith(StartsWith {
            field,
            prefix: prefix.into(),
        }))
    }

    /// Require the uploaded object to be between `min` and `max` bytes, inclusive.
    pub fn content_length_range(min: u64, max: u64) -> Result<Self, PostPolicyError> {
        if min > max {
            return Err(PostPolicyError::InvalidCondition(format!(
                "Content length range minimum {} exceeds maximum {}",
                min, max
            )));
        }

        Ok(Self::ContentLengthRange(ContentLengthRange {
            min,
            max,
        }))
    }

    /// The form field this condition constrains, if any. Content length ranges constrain the
    /// upload body rather than a form field.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ExactMatch(c) => Some(c.field()),
            Self::StartsWith(c) => Some(c.field()),
            Self::ContentLengthRange(_) => None,
        }
    }

    /// Well-known fields; their names are non-empty and never start with `$`.
    fn known_exact(field: &str, value: impl Into<String>) -> Self {
        Self::ExactMatch(ExactMatch {
            field: field.to_string(),
            value: value.into(),
        })
    }

    fn known_starts_with(field: &str, prefix: impl Into<String>) -> Self {
        Self::StartsWith(StartsWith {
            field: field.to_string(),
            prefix: prefix.into(),
        })
    }

    /// `acl` must equal `value`, e.g. `public-read`.
    pub fn acl_equals(value: impl Into<String>) -> Self {
        Self::known_exact("acl", value)
    }

    /// `acl` must begin with `prefix`.
    pub fn acl_starts_with(prefix: impl Into<String>) -> Self {
        Self::known_starts_with("acl", prefix)
    }

    /// `bucket` must equal `name`.
    pub fn bucket_equals(name: impl Into<String>) -> Self {
        Self::known_exact(FIELD_BUCKET, name)
    }

    /// `Cache-Control` must equal `value`.
    pub fn cache_control_equals(value: impl Into<String>) -> Self {
        Self::known_exact("Cache-Control", value)
    }

    /// `Cache-Control` must begin with `prefix`.
    pub fn cache_control_starts_with(prefix: impl Into<String>) -> Self {
        Self::known_starts_with("Cache-Control", prefix)
    }

    /// `Content-Type` must equal `value`.
    pub fn content_type_equals(value: impl Into<String>) -> Self {
        Self::known_exact("Content-Type", value)
    }

    /// `Content-Type` must begin with `prefix`, e.g. `image/`.
    pub fn content_type_starts_with(prefix: impl Into<String>) -> Self {
        Self::known_starts_with("Content-Type", prefix)
    }

    /// `Content-Disposition` must equal `value`.
    pub fn content_disposition_equals(value: impl Into<String>) -> Self {
        Self::known_exact("Content-Disposition", value)
    }

    /// `Content-Disposition` must begin with `prefix`.
    pub fn content_disposition_starts_with(prefix: impl Into<String>) -> Self {
        Self::known_starts_with("Content-Disposition", prefix)
    }

    /// `Content-Encoding` must equal `value`.
    pub fn content_encoding_equals(value: impl Into<String>) -> Self {
        Self::known_exact("Content-Encoding", value)
    }

    /// `Content-Encoding` must begin with `prefix`.
    pub fn content_encoding_starts_with(prefix: impl Into<String>) -> Self {
        Self::known_starts_with("Content-Encoding", prefix)
    }

    /// `Expires` must equal `value`.
    pub fn expires_equals(value: impl Into<String>) -> Self {
        Self::known_exact("Expires", value)
    }

    /// `Expires` must begin with `prefix`.
    pub fn expires_starts_with(prefix: impl Into<String>) -> Self {
        Self::known_starts_with("Expires", prefix)
    }

    /// `key` must equal `value`.
    pub fn key_equals(value: impl Into<String>) -> Self {
        Self::known_exact(FIELD_KEY, value)
    }

    /// `key` must begin with `prefix`, e.g. `uploads/`.
    pub fn key_starts_with(prefix: impl Into<String>) -> Self {
        Self::known_starts_with(FIELD_KEY, prefix)
    }

    /// `success_action_redirect` must equal `value`.
    pub fn success_action_redirect_equals(value: impl Into<String>) -> Self {
        Self::known_exact("success_action_redirect", value)
    }

    /// `success_action_redirect` must begin with `prefix`.
    pub fn success_action_redirect_starts_with(prefix: impl Into<String>) -> Self {
        Self::known_starts_with("success_action_redirect", prefix)
    }

    /// `redirect` must equal `value`.
    pub fn redirect_equals(value: impl Into<String>) -> Self {
        Self::known_exact("redirect", value)
    }

    /// `redirect` must begin with `prefix`.
    pub fn redirect_starts_with(prefix: impl Into<String>) -> Self {
        Self::known_starts_with("redirect", prefix)
    }

    /// `success_action_status` must equal `value`, e.g. `201`.
    pub fn success_action_status_equals(value: impl Into<String>) -> Self {
        Self::known_exact("success_action_status", value)
    }

    /// `x-amz-meta-<name>` must equal `value`.
    pub fn amz_meta_equals(name: &str, value: impl Into<String>) -> Self {
        Self::known_exact(&format!("{}{}", FIELD_X_AMZ_META_PREFIX, name), value)
    }

    /// `x-amz-meta-<name>` must begin with `prefix`.
    pub fn amz_meta_starts_with(name: &str, prefix: impl Into<String>) -> Self {
        Self::known_starts_with(&format!("{}{}", FIELD_X_AMZ_META_PREFIX, name), prefix)
    }

    /// `x-amz-<name>` must equal `value`, e.g. `server-side-encryption` = `AES256`.
    pub fn amz_header_equals(name: &str, value: impl Into<String>) -> Self {
        Self::known_exact(&format!("{}{}", FIELD_X_AMZ_PREFIX, name), value)
    }

    pub(crate) fn algorithm_equals(value: impl Into<String>) -> Self {
        Self::known_exact(FIELD_X_AMZ_ALGORITHM, value)
    }

    pub(crate) fn credential_equals(value: impl Into<String>) -> Self {
        Self::known_exact(FIELD_X_AMZ_CREDENTIAL, value)
    }

    pub(crate) fn date_equals(value: impl Into<String>) -> Self {
        Self::known_exact(FIELD_X_AMZ_DATE, value)
    }

    pub(crate) fn security_token_equals(value: impl Into<String>) -> Self {
        Self::known_exact(FIELD_X_AMZ_SECURITY_TOKEN, value)
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_tuple(3)?;
        match self {
            Self::ExactMatch(c) => {
                seq.serialize_element(COND_EQ)?;
                seq.serialize_element(&format!("${}", c.field))?;
                seq.serialize_element(&c.value)?;
            }
            Self::StartsWith(c) => {
                seq.serialize_element(COND_STARTS_WITH)?;
                seq.serialize_element(&format!("${}", c.field))?;
                seq.serialize_element(&c.prefix)?;
            }
            Self::ContentLengthRange(c) => {
                seq.serialize_element(COND_CONTENT_LENGTH_RANGE)?;
                seq.serialize_element(&c.min)?;
                seq.serialize_element(&c.max)?;
            }
        }
        seq.end()
    }
}
