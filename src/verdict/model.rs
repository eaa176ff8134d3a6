//! Wire-level and canonical verdict types.
//!
//! [`RawPayload`] mirrors what the verdict service sends, with every field
//! optional so that validation happens in one place
//! ([`super::normalize::normalize`]). [`VerdictData`] is the immutable,
//! render-ready result.

use std::fmt;

use serde::{Deserialize, Serialize};

// ──────────────────── canonical model ────────────────────

/// Outcome of fact-checking a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Busted,
    Confirmed,
    Complicated,
}

impl Verdict {
    /// Parse the service's wire label. Unknown labels are rejected.
    #[must_use]
    pub fn from_wire(label: &str) -> Option<Self> {
        match label {
            "busted" => Some(Self::Busted),
            "confirmed" => Some(Self::Confirmed),
            "complicated" => Some(Self::Complicated),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Busted => "busted",
            Self::Confirmed => "confirmed",
            Self::Complicated => "complicated",
        }
    }

    /// Badge text: upper-case, dashes shown as spaces.
    #[must_use]
    pub fn badge(self) -> String {
        self.as_str().replace('-', " ").to_uppercase()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One point of the headline chart, in the order the service sent it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub year: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// One step of the backend's data-retrieval trace.
///
/// `id` is kept as sent; records without a usable id stay in the trace but
/// never match a backstage stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McpStep {
    pub id: Option<i64>,
    pub time: String,
    pub raw_data: String,
}

/// Normalized result of a successful investigation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictData {
    pub(super) verdict: Verdict,
    pub(super) headline_stat: String,
    pub(super) explanation: String,
    pub(super) chart_data: Vec<ChartPoint>,
    pub(super) source: String,
    pub(super) mcp_steps: Vec<McpStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) dataset_code: Option<String>,
}

impl VerdictData {
    #[must_use]
    pub const fn verdict(&self) -> Verdict {
        self.verdict
    }

    #[must_use]
    pub fn headline_stat(&self) -> &str {
        &self.headline_stat
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn chart_data(&self) -> &[ChartPoint] {
        &self.chart_data
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn mcp_steps(&self) -> &[McpStep] {
        &self.mcp_steps
    }

    /// Dataset code parsed from the leading token of [`Self::source`].
    ///
    /// Shared by the loading narrative and the backstage panel.
    #[must_use]
    pub fn dataset_code(&self) -> Option<&str> {
        self.dataset_code.as_deref()
    }

    /// Metric name carried by the first chart point, if any.
    #[must_use]
    pub fn metric_label(&self) -> Option<&str> {
        self.chart_data.first().and_then(|p| p.label.as_deref())
    }

    /// First trace record with the given id.
    #[must_use]
    pub fn step(&self, id: u8) -> Option<&McpStep> {
        self.mcp_steps.iter().find(|s| s.id == Some(i64::from(id)))
    }
}

// ──────────────────── wire model ────────────────────

/// Response body of `POST /api/check-claim`, as loosely as it may arrive.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPayload {
    pub verdict: Option<String>,
    pub headline_stat: Option<String>,
    pub explanation: Option<String>,
    pub chart_data: Option<Vec<RawChartPoint>>,
    pub source: Option<String>,
    pub mcp_steps: Option<Vec<RawStep>>,
    pub out_of_scope: Option<bool>,
    pub available_topics: Option<String>,
    pub error: Option<bool>,
    pub message: Option<String>,
}

impl RawPayload {
    /// Whether the service explicitly flagged the claim as unanswerable.
    #[must_use]
    pub fn is_out_of_scope(&self) -> bool {
        self.out_of_scope.unwrap_or(false)
    }
}

/// Chart point before validation. `year` may arrive as text or a number.
#[derive(Debug, Clone, Deserialize)]
pub struct RawChartPoint {
    pub year: Option<serde_json::Value>,
    pub value: Option<f64>,
    pub label: Option<String>,
}

/// Trace record before validation. The raw response string has been sent
/// both as `rawData` and as `rawJson`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStep {
    pub id: Option<serde_json::Value>,
    pub time: Option<String>,
    #[serde(alias = "rawJson")]
    pub raw_data: Option<String>,
}

/// Information shown on the out-of-scope screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutOfScopeNotice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_topics: Option<String>,
}

impl OutOfScopeNotice {
    #[must_use]
    pub fn from_payload(payload: &RawPayload) -> Self {
        Self {
            explanation: payload.explanation.clone(),
            available_topics: payload.available_topics.clone(),
        }
    }
}
