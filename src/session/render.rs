//! Plain-text frames for each session screen.
//!
//! Frames carry no styling; the CLI decorates them for terminals that want
//! color.

#![allow(missing_docs)]

use std::fmt::Write as _;

use super::model::{SUGGESTED_CLAIMS, SUPPORTED_DOMAINS, Screen, SessionModel};
use crate::animator::{INTERPRETING_LABEL, StageStatus};
use crate::verdict::{BackstageStage, ChartPoint, VerdictData, backstage_narrative};

const CHART_WIDTH: usize = 32;

/// Render the current screen.
#[must_use]
pub fn render(model: &SessionModel) -> String {
    let mut out = String::new();
    match model.screen {
        Screen::Landing => render_landing(&mut out),
        Screen::Pending => render_pending(model, &mut out),
        Screen::Verdict => match model.verdict.as_deref() {
            Some(data) => render_verdict(model, data, &mut out),
            None => render_error(model, &mut out),
        },
        Screen::OutOfScope => render_out_of_scope(model, &mut out),
        Screen::Error => render_error(model, &mut out),
    }
    out
}

fn render_landing(out: &mut String) {
    let _ = writeln!(out, "The Dinner Table Economist");
    let _ = writeln!(out, "What did your uncle claim at dinner?");
    let _ = writeln!(out);
    let _ = writeln!(out, "Or try one of these common myths:");
    render_suggestions(out);
}

fn render_pending(model: &SessionModel, out: &mut String) {
    if let Some(claim) = &model.claim {
        let _ = writeln!(out, "Investigating: \"{claim}\"");
    }
    let timeline = &model.timeline;
    for (idx, stage) in timeline.stages().iter().enumerate() {
        match timeline.status(idx) {
            StageStatus::Done => {
                let _ = writeln!(
                    out,
                    "  [x] {}  {}  ({})",
                    stage.done_label(),
                    timeline.completed_text(idx, model.dataset_hint()),
                    stage.duration_badge()
                );
            }
            StageStatus::Active => {
                let _ = writeln!(out, "  [>] {}", stage.label);
            }
            StageStatus::Waiting => {
                let _ = writeln!(out, "  [ ] {}", stage.label);
            }
        }
    }
    if timeline.interpreting() {
        let _ = writeln!(out, "  [>] {INTERPRETING_LABEL}");
    }
}

fn render_verdict(model: &SessionModel, data: &VerdictData, out: &mut String) {
    if let Some(claim) = &model.claim {
        let _ = writeln!(out, "\"{claim}\"");
    }
    let _ = writeln!(out, "[{}]", data.verdict().badge());
    let _ = writeln!(out, "{}", data.headline_stat());
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", data.explanation());
    if !data.chart_data().is_empty() {
        let _ = writeln!(out);
        if let Some(metric) = data.metric_label() {
            let _ = writeln!(out, "Metric: {metric}");
        }
        render_chart(data.chart_data(), out);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Source: {}", data.source());
    if let Some(code) = data.dataset_code() {
        let _ = writeln!(out, "Dataset: {code}");
    }
}

/// Horizontal bars scaled to the largest magnitude; negative values are
/// marked with `-`.
fn render_chart(points: &[ChartPoint], out: &mut String) {
    let max = points.iter().map(|p| p.value.abs()).fold(0.0_f64, f64::max);
    let year_width = points.iter().map(|p| p.year.len()).max().unwrap_or(4);
    for point in points {
        let len = if max > 0.0 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let scaled = ((point.value.abs() / max) * CHART_WIDTH as f64).round() as usize;
            scaled.min(CHART_WIDTH)
        } else {
            0
        };
        let glyph = if point.value < 0.0 { "-" } else { "#" };
        let _ = writeln!(
            out,
            "  {:>year_width$} | {:<CHART_WIDTH$} {}",
            point.year,
            glyph.repeat(len),
            point.value
        );
    }
}

fn render_out_of_scope(model: &SessionModel, out: &mut String) {
    let _ = writeln!(out, "This claim can't be fact-checked with available economic data");
    if let Some(notice) = &model.out_of_scope {
        if let Some(explanation) = &notice.explanation {
            let _ = writeln!(out, "{explanation}");
        }
        if let Some(topics) = &notice.available_topics {
            let _ = writeln!(out, "Available topics: {topics}");
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "The MoSPI MCP covers:");
    for domain in SUPPORTED_DOMAINS {
        let _ = writeln!(out, "  - {domain}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Try one of these instead:");
    render_suggestions(out);
}

fn render_error(model: &SessionModel, out: &mut String) {
    let _ = writeln!(out, "The government data server isn't responding right now");
    let _ = writeln!(out, "This sometimes happens. It's a beta service.");
    if let Some(failure) = &model.failure {
        let _ = writeln!(out, "({}: {})", failure.kind.as_str(), failure.code);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Or try a different claim:");
    render_suggestions(out);
}

fn render_suggestions(out: &mut String) {
    for (idx, claim) in SUGGESTED_CLAIMS.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {claim}", idx + 1);
    }
}

/// Render the five-stage backstage panel for a verdict.
#[must_use]
pub fn render_backstage(data: &VerdictData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Backstage: how we got this data");
    for stage in backstage_narrative(data) {
        render_backstage_stage(&stage, &mut out);
    }
    out
}

fn render_backstage_stage(stage: &BackstageStage, out: &mut String) {
    if stage.time.is_empty() {
        let _ = writeln!(out, "  {}. {}", stage.id, stage.name);
    } else {
        let _ = writeln!(out, "  {}. {}  ({})", stage.id, stage.name, stage.time);
    }
    let _ = writeln!(out, "     {}", stage.description);
    let _ = writeln!(out, "     -> {}", stage.result);
    for line in stage.raw_data.lines() {
        let _ = writeln!(out, "     | {line}");
    }
}
