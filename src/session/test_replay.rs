//! Deterministic replay suite for the session state machine.
//!
//! Each scenario runs a step sequence through the headless harness, then
//! asserts model state, frame content, and (where it matters) that a second
//! run produces the same trace digest. Property tests cover the join's order
//! independence and generation safety under arbitrary interleavings.

#![allow(clippy::too_many_lines)] // Test fixtures are verbose by nature.

use std::collections::HashMap;

use proptest::prelude::*;

use super::harness::{HarnessStep, SessionHarness};
use super::model::Screen;
use crate::core::errors::{DteError, FailureKind};
use crate::core::generation::Generation;
use crate::request::{AttemptOutcome, FailureReport};
use crate::verdict::{OutOfScopeNotice, normalize_body};

// ──────────────────── outcome fixtures ────────────────────

fn verdict_for(claim: &str, source: &str) -> AttemptOutcome {
    let body = serde_json::json!({
        "verdict": "complicated",
        "headlineStat": claim,
        "explanation": "Headline inflation has moderated; food inflation persists.",
        "chartData": [
            {"year": "2022", "value": 6.7},
            {"year": "2023", "value": 5.4},
            {"year": "2024", "value": 5.1}
        ],
        "source": source,
        "mcpSteps": [
            {"id": 1, "time": "0.65s", "rawJson": "{\"datasets\": [\"CPI_Combined\"]}"},
            {"id": 3, "time": "0.4s", "rawJson": "{\"range\": \"2020-2024\"}"}
        ]
    });
    AttemptOutcome::Resolved(Box::new(normalize_body(&body.to_string()).unwrap()))
}

fn cpi_verdict() -> AttemptOutcome {
    verdict_for(
        "CPI is 5.1%, down from peak but food inflation persists",
        "CPI Data 2024, Ministry of Statistics & Programme Implementation",
    )
}

fn transport_failure() -> AttemptOutcome {
    AttemptOutcome::Failed(FailureReport::from_error(&DteError::Transport {
        details: "request timed out".into(),
    }))
}

fn out_of_scope() -> AttemptOutcome {
    AttemptOutcome::OutOfScope(OutOfScopeNotice {
        explanation: Some(
            "This question can't be answered using government economic statistics.".into(),
        ),
        available_topics: Some("Employment & wages (PLFS), retail inflation (CPI)".into()),
    })
}

// ──────────────────── helper: run trace twice, verify determinism ────────────────────

fn run_and_digest(f: impl Fn(&mut SessionHarness)) -> String {
    let mut h = SessionHarness::default();
    f(&mut h);
    h.trace_digest()
}

fn assert_deterministic(f: impl Fn(&mut SessionHarness)) {
    let d1 = run_and_digest(&f);
    let d2 = run_and_digest(&f);
    assert_eq!(d1, d2, "trace digest mismatch: reducer is non-deterministic");
}

// ══════════════════════════════════════════════════════════════
//  Scenario 1: verdict with dataset code
// ══════════════════════════════════════════════════════════════

#[test]
fn replay_inflation_claim_selects_cpi() {
    let mut h = SessionHarness::default();
    let g = h.submit("Inflation is out of control").unwrap();
    assert_eq!(g, Generation::new(1));

    h.settle(g, cpi_verdict());
    assert_eq!(h.screen(), Screen::Pending, "fast data waits for the narrative");

    h.stage_completed(g, 1);
    assert!(h.last_frame().text.contains("Found 7 datasets → Selected CPI"));

    for stage in 2..=4 {
        h.stage_completed(g, stage);
    }
    assert!(h.last_frame().text.contains("Interpreting results..."));
    assert_eq!(h.screen(), Screen::Pending);

    h.animation_finished(g);
    assert_eq!(h.screen(), Screen::Verdict);
    assert!(h.last_frame().text.contains("[COMPLICATED]"));
    assert!(h.last_frame().text.contains("Dataset: CPI"));
    assert_eq!(
        h.screen_history(),
        vec![Screen::Landing, Screen::Pending, Screen::Verdict]
    );
}

#[test]
fn replay_inflation_claim_is_deterministic() {
    assert_deterministic(|h| {
        let g = h.submit("Inflation is out of control").unwrap();
        h.settle(g, cpi_verdict());
        h.run_animation(g);
    });
}

// ══════════════════════════════════════════════════════════════
//  Scenario 2: out-of-scope regardless of animation state
// ══════════════════════════════════════════════════════════════

#[test]
fn replay_out_of_scope_before_and_after_animation() {
    // Early: the animator is still running and gets torn down.
    let mut h = SessionHarness::default();
    let g = h.submit("India doesn't care about environment").unwrap();
    h.stage_completed(g, 1);
    h.settle(g, out_of_scope());
    assert_eq!(h.screen(), Screen::OutOfScope);
    assert!(!h.animation_running());
    assert!(h.last_frame().text.contains("Environment Statistics"));
    assert!(h.last_frame().text.contains("Available topics: Employment & wages"));

    // Late: the animation already finished.
    let mut h = SessionHarness::default();
    let g = h.submit("India doesn't care about environment").unwrap();
    h.run_animation(g);
    assert_eq!(h.screen(), Screen::Pending);
    h.settle(g, out_of_scope());
    assert_eq!(h.screen(), Screen::OutOfScope);
}

// ══════════════════════════════════════════════════════════════
//  Scenario 3: failure mid-animation
// ══════════════════════════════════════════════════════════════

#[test]
fn replay_transport_failure_mid_animation() {
    let mut h = SessionHarness::default();
    let g = h.submit("Manufacturing is dead in India").unwrap();
    h.stage_completed(g, 1);
    h.stage_completed(g, 2);
    assert!(h.animation_running());

    h.settle(g, transport_failure());
    assert_eq!(h.screen(), Screen::Error);
    assert!(!h.animation_running(), "animator torn down on failure");
    assert_eq!(
        h.model().failure.as_ref().map(|f| f.kind),
        Some(FailureKind::TransportFailure)
    );

    // Timer events that raced the teardown change nothing.
    h.stage_completed(g, 3);
    h.animation_finished(g);
    assert_eq!(h.screen(), Screen::Error);
    assert_eq!(h.model().stale_signals, 2);
    assert!(
        !h.screen_history().contains(&Screen::Verdict),
        "verdict must never follow a failure"
    );
}

// ══════════════════════════════════════════════════════════════
//  Scenario 4: superseded submission
// ══════════════════════════════════════════════════════════════

#[test]
fn replay_superseded_submission_is_invisible() {
    let mut h = SessionHarness::default();
    let y = h.submit("Youth unemployment is a crisis").unwrap();
    h.stage_completed(y, 1);
    let z = h.submit("Wholesale prices are rising").unwrap();
    assert!(z > y);

    // Y's request resolves and its stale timers fire after Z started.
    h.settle(y, verdict_for("Youth unemployment is a crisis", "PLFS 2024"));
    h.run_animation(y);
    assert_eq!(h.screen(), Screen::Pending);
    assert!(!h.model().data_ready);
    assert_eq!(h.model().timeline.completed(), 0);

    h.settle(z, verdict_for("Wholesale prices are rising", "WPI 2024"));
    h.run_animation(z);
    assert_eq!(h.screen(), Screen::Verdict);
    let data = h.model().verdict.as_deref().unwrap();
    assert_eq!(data.headline_stat(), "Wholesale prices are rising");
    assert_eq!(data.dataset_code(), Some("WPI"));
}

// ══════════════════════════════════════════════════════════════
//  Scenario 5: partial trace in the backstage panel
// ══════════════════════════════════════════════════════════════

#[test]
fn replay_partial_trace_backstage() {
    let mut h = SessionHarness::default();
    let g = h.submit("Inflation is out of control").unwrap();
    h.settle(g, cpi_verdict());
    h.run_animation(g);

    let data = h.model().verdict.as_deref().unwrap();
    let panel = super::render::render_backstage(data);
    assert!(panel.contains("  2. Selector-A agent\n"));
    assert!(panel.contains("  4. MCP fetch\n"));
    assert!(panel.contains("Used MCP tool 4_get_data to retrieve data points."));
    assert!(panel.contains("  3. Selector-B agent  (0.4s)"));
}

// ══════════════════════════════════════════════════════════════
//  Scenario 6: reset and retry
// ══════════════════════════════════════════════════════════════

#[test]
fn replay_retry_after_error_then_reset() {
    let mut h = SessionHarness::default();
    let g1 = h.submit("Factory output is increasing").unwrap();
    h.settle(g1, transport_failure());
    assert_eq!(h.screen(), Screen::Error);

    let g2 = h.retry().unwrap();
    assert_eq!(g2, g1.next());
    assert_eq!(h.screen(), Screen::Pending);
    assert_eq!(
        h.model().claim.as_ref().map(|c| c.as_str()),
        Some("Factory output is increasing")
    );

    h.reset();
    assert_eq!(h.screen(), Screen::Landing);
    assert!(h.model().claim.is_none());
    assert!(!h.request_pending() && !h.animation_running());

    // Retry is only offered on the error screen.
    assert!(h.retry().is_none());
}

#[test]
fn replay_scripted_sequence_via_run_script() {
    let script = vec![
        HarnessStep::SelectSuggestion(0), // g1: Inflation is out of control
        HarnessStep::StageCompleted {
            generation: 1,
            stage: 1,
        },
        HarnessStep::Submit("Energy consumption is rising".into()), // g2
        HarnessStep::Settle {
            generation: 1,
            outcome: cpi_verdict(),
        },
        HarnessStep::Settle {
            generation: 2,
            outcome: transport_failure(),
        },
        HarnessStep::Retry, // g3
        HarnessStep::AnimationFinished { generation: 3 },
        HarnessStep::Settle {
            generation: 3,
            outcome: cpi_verdict(),
        },
        HarnessStep::Reset,
    ];

    let mut h = SessionHarness::default();
    h.run_script(&script);
    assert_eq!(h.screen(), Screen::Landing);
    assert_eq!(h.latest_generation(), Generation::new(3));
    assert_eq!(
        h.screen_history(),
        vec![
            Screen::Landing,
            Screen::Pending,
            Screen::Error,
            Screen::Pending,
            Screen::Verdict,
            Screen::Landing
        ]
    );

    let mut again = SessionHarness::default();
    again.run_script(&script);
    assert_eq!(h.trace_digest(), again.trace_digest());
}

// ──────────────────── properties ────────────────────

#[derive(Debug, Clone, Copy)]
enum OutcomeKind {
    Resolved,
    Failed,
    OutOfScope,
}

#[derive(Debug, Clone)]
enum Op {
    Submit(usize),
    /// Settle the attempt `back` generations behind the latest.
    Settle { back: u64, kind: OutcomeKind },
    Stage { back: u64, stage: u8 },
    Finish { back: u64 },
    Reset,
    Retry,
}

const CLAIMS: [&str; 3] = [
    "Inflation is out of control",
    "Only services sector is growing",
    "Rural India has it worse than cities",
];

fn arb_kind() -> impl Strategy<Value = OutcomeKind> {
    prop_oneof![
        3 => Just(OutcomeKind::Resolved),
        1 => Just(OutcomeKind::Failed),
        1 => Just(OutcomeKind::OutOfScope),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => (0..CLAIMS.len()).prop_map(Op::Submit),
        3 => (0..3_u64, arb_kind()).prop_map(|(back, kind)| Op::Settle { back, kind }),
        3 => (0..3_u64, 1..=4_u8).prop_map(|(back, stage)| Op::Stage { back, stage }),
        2 => (0..3_u64).prop_map(|back| Op::Finish { back }),
        1 => Just(Op::Reset),
        1 => Just(Op::Retry),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The verdict appears exactly when both signals are in, whichever
    /// arrives last.
    #[test]
    fn prop_join_is_order_independent(settle_at in 0..=5_usize) {
        let mut h = SessionHarness::default();
        let g = h.submit("Inflation is out of control").unwrap();
        let mut settled = false;
        let mut finished = false;

        for position in 0..=5 {
            if position == settle_at {
                h.settle(g, cpi_verdict());
                settled = true;
                prop_assert_eq!(h.screen() == Screen::Verdict, finished);
            }
            if position < 4 {
                h.stage_completed(g, u8::try_from(position + 1).unwrap());
            } else if position == 4 {
                h.animation_finished(g);
                finished = true;
            }
            prop_assert_eq!(h.screen() == Screen::Verdict, settled && finished);
        }
        prop_assert_eq!(h.screen(), Screen::Verdict);
    }

    /// Whatever the interleaving, the visible verdict always belongs to the
    /// claim of the accepted generation, and reset always lands clean.
    #[test]
    fn prop_stale_generations_never_leak(ops in prop::collection::vec(arb_op(), 1..40)) {
        let mut h = SessionHarness::default();
        let mut claims: HashMap<Generation, &str> = HashMap::new();

        for op in ops {
            let latest = h.latest_generation().get();
            let target = |back: u64| Generation::new(latest.saturating_sub(back).max(1));
            match op {
                Op::Submit(idx) => {
                    if let Some(g) = h.submit(CLAIMS[idx]) {
                        claims.insert(g, CLAIMS[idx]);
                    }
                }
                Op::Settle { back, kind } => {
                    if latest == 0 {
                        continue;
                    }
                    let g = target(back);
                    let claim = claims.get(&g).copied().unwrap_or("unknown");
                    let outcome = match kind {
                        OutcomeKind::Resolved => verdict_for(claim, "CPI Data 2024"),
                        OutcomeKind::Failed => transport_failure(),
                        OutcomeKind::OutOfScope => out_of_scope(),
                    };
                    h.settle(g, outcome);
                }
                Op::Stage { back, stage } => {
                    if latest > 0 {
                        h.stage_completed(target(back), stage);
                    }
                }
                Op::Finish { back } => {
                    if latest > 0 {
                        h.animation_finished(target(back));
                    }
                }
                Op::Reset => {
                    h.reset();
                    prop_assert_eq!(h.screen(), Screen::Landing);
                    prop_assert!(h.model().claim.is_none());
                }
                Op::Retry => {
                    if let Some(g) = h.retry() {
                        let claim = h.model().claim.as_ref().map(|c| c.as_str()).unwrap();
                        let claim = CLAIMS.iter().copied().find(|c| *c == claim).unwrap();
                        claims.insert(g, claim);
                    }
                }
            }

            let model = h.model();
            if model.screen != Screen::Landing {
                prop_assert_eq!(model.generation, Some(h.latest_generation()));
            }
            if model.screen == Screen::Verdict {
                let headline = model.verdict.as_deref().map(|v| v.headline_stat());
                let claim = model.claim.as_ref().map(|c| c.as_str());
                prop_assert_eq!(headline, claim);
                prop_assert!(model.data_ready && model.animation_ready);
            }
        }
    }
}
