//! Raw payload → [`VerdictData`].
//!
//! Normalization is all-or-nothing: any missing required field or unknown
//! verdict label rejects the whole payload so that no partial verdict is ever
//! shown.

use std::sync::LazyLock;

use regex::Regex;

use super::model::{ChartPoint, McpStep, RawChartPoint, RawPayload, RawStep, Verdict, VerdictData};
use crate::core::errors::{DteError, Result};

/// Leading all-caps token followed by whitespace or end of text.
static DATASET_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]+)(?:\s|$)").expect("dataset code regex is valid"));

/// Extract the dataset code from a citation string.
///
/// `"CPI Data 2024, Ministry of Statistics"` yields `Some("CPI")`;
/// `"Periodic Labour Force Survey"` yields `None`.
#[must_use]
pub fn dataset_code(source: &str) -> Option<&str> {
    DATASET_CODE_RE
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse a response body and normalize it.
pub fn normalize_body(body: &str) -> Result<VerdictData> {
    let raw: RawPayload =
        serde_json::from_str(body).map_err(|e| DteError::malformed(format!("body: {e}")))?;
    normalize(raw)
}

/// Validate and canonicalize a successful response payload.
pub fn normalize(raw: RawPayload) -> Result<VerdictData> {
    let label = required_text(raw.verdict, "verdict")?;
    let verdict = Verdict::from_wire(&label)
        .ok_or_else(|| DteError::malformed(format!("unknown verdict label {label:?}")))?;
    let headline_stat = required_text(raw.headline_stat, "headlineStat")?;
    let explanation = required_text(raw.explanation, "explanation")?;
    let source = required_text(raw.source, "source")?;

    let chart_data = raw
        .chart_data
        .ok_or_else(|| DteError::malformed("chartData is absent"))?
        .into_iter()
        .enumerate()
        .map(|(idx, point)| chart_point(idx, point))
        .collect::<Result<Vec<_>>>()?;

    let mcp_steps = raw
        .mcp_steps
        .unwrap_or_default()
        .into_iter()
        .map(mcp_step)
        .collect();

    let dataset_code = dataset_code(&source).map(str::to_owned);

    Ok(VerdictData {
        verdict,
        headline_stat,
        explanation,
        chart_data,
        source,
        mcp_steps,
        dataset_code,
    })
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        Some(_) => Err(DteError::malformed(format!("{field} is blank"))),
        None => Err(DteError::malformed(format!("{field} is absent"))),
    }
}

fn chart_point(idx: usize, raw: RawChartPoint) -> Result<ChartPoint> {
    let year = match raw.year {
        Some(serde_json::Value::String(text)) if !text.trim().is_empty() => text,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => return Err(DteError::malformed(format!("chartData[{idx}].year is absent"))),
    };
    let value = raw
        .value
        .filter(|v| v.is_finite())
        .ok_or_else(|| DteError::malformed(format!("chartData[{idx}].value is absent")))?;
    Ok(ChartPoint {
        year,
        value,
        label: raw.label.filter(|l| !l.trim().is_empty()),
    })
}

/// Trace records are diagnostics only, so a bad id never rejects the verdict.
fn mcp_step(raw: RawStep) -> McpStep {
    McpStep {
        id: raw.id.as_ref().and_then(serde_json::Value::as_i64),
        time: raw.time.unwrap_or_default(),
        raw_data: raw.raw_data.unwrap_or_default(),
    }
}
