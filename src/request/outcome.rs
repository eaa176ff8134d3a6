//! Settlement classification for one request attempt.

#![allow(missing_docs)]

use serde::Serialize;

use super::service::ServiceResponse;
use crate::core::errors::{DteError, FailureKind, Result};
use crate::verdict::{OutOfScopeNotice, RawPayload, VerdictData, normalize};

/// Diagnostic record of a failed attempt. Every kind renders the same error
/// screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    pub kind: FailureKind,
    pub code: &'static str,
    pub message: String,
}

impl FailureReport {
    /// Build from an error raised while settling an attempt.
    #[must_use]
    pub fn from_error(error: &DteError) -> Self {
        Self {
            kind: error
                .failure_kind()
                .unwrap_or(FailureKind::TransportFailure),
            code: error.code(),
            message: error.to_string(),
        }
    }
}

/// Terminal result of a request attempt that was not cancelled.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Resolved(Box<VerdictData>),
    OutOfScope(OutOfScopeNotice),
    Failed(FailureReport),
}

impl AttemptOutcome {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Resolved(_) => "resolved",
            Self::OutOfScope(_) => "out_of_scope",
            Self::Failed(_) => "failed",
        }
    }
}

/// Classify a settled call.
///
/// Priority: transport failure, then non-success status, then the explicit
/// out-of-scope flag, then normalization (whose failure also counts as a
/// failed attempt).
#[must_use]
pub fn classify(settled: Result<ServiceResponse>) -> AttemptOutcome {
    match classify_inner(settled) {
        Ok(outcome) => outcome,
        Err(error) => AttemptOutcome::Failed(FailureReport::from_error(&error)),
    }
}

fn classify_inner(settled: Result<ServiceResponse>) -> Result<AttemptOutcome> {
    let response = settled?;

    if !response.is_success() {
        return Err(DteError::Service {
            status: response.status,
            details: service_error_message(&response.body),
        });
    }

    let payload: RawPayload = serde_json::from_str(&response.body)
        .map_err(|e| DteError::malformed(format!("body: {e}")))?;

    if payload.is_out_of_scope() {
        return Ok(AttemptOutcome::OutOfScope(OutOfScopeNotice::from_payload(
            &payload,
        )));
    }

    Ok(AttemptOutcome::Resolved(Box::new(normalize(payload)?)))
}

/// Best-effort extraction of `{"message": ...}` or `{"detail": ...}` from an
/// error body.
fn service_error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.get("message").or_else(|| v.get("detail")))
        .and_then(serde_json::Value::as_str)
        .map_or_else(
            || {
                if body.trim().is_empty() {
                    "empty response body".to_string()
                } else {
                    body.chars().take(200).collect()
                }
            },
            str::to_owned,
        )
}
