//! User-submitted claim text.

use std::fmt;

use serde::Serialize;

use crate::core::errors::{DteError, Result};

/// A non-empty claim. Immutable once built; identical text submitted twice is
/// still two separate investigations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Claim(String);

impl Claim {
    /// Build a claim, rejecting whitespace-only text. The text is kept as
    /// typed apart from surrounding whitespace.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(DteError::EmptyClaim);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// JSON body of `POST /api/check-claim`.
#[derive(Debug, Serialize)]
pub struct ClaimRequest<'a> {
    pub claim: &'a str,
}

impl<'a> From<&'a Claim> for ClaimRequest<'a> {
    fn from(claim: &'a Claim) -> Self {
        Self {
            claim: claim.as_str(),
        }
    }
}
