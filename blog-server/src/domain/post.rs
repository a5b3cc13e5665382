use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::error::{DomainError, FieldViolation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct PostId(i64);

impl PostId {
    pub(crate) fn new(value: i64) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidId(value.to_string()));
        }
        Ok(Self(value))
    }

    pub(crate) fn get(self) -> i64 {
        self.0
    }
}

impl FromStr for PostId {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidId(raw.to_string()));
        }
        let value = raw
            .parse::<i64>()
            .map_err(|_| DomainError::InvalidId(raw.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Post {
    pub(crate) id: PostId,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) tags: Vec<String>,
    pub(crate) created_at: DateTime<Utc>,
}

impl Post {
    /// Title rules apply to incoming requests only; stored rows are taken as they are.
    pub(crate) fn new(
        id: i64,
        title: impl Into<String>,
        content: impl Into<String>,
        tags: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id: PostId::new(id)?,
            title: title.into(),
            content: content.into(),
            tags,
            created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) tags: Vec<String>,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let mut violations = Vec::new();
        violations.extend(title_violation(&self.title));
        if !violations.is_empty() {
            return Err(DomainError::Validation(violations));
        }

        Ok(self)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) tags: Option<Vec<String>>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let mut violations = Vec::new();
        if let Some(title) = &self.title {
            violations.extend(title_violation(title));
        }
        if !violations.is_empty() {
            return Err(DomainError::Validation(violations));
        }

        Ok(self)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }
}

/// A title is accepted as sent, but whitespace alone does not count as one.
pub(crate) fn title_violation(title: &str) -> Option<FieldViolation> {
    if title.trim().is_empty() {
        return Some(FieldViolation::new("title", "blank", "must not be blank"));
    }
    None
}
