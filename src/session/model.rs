//! Elm-style state model for one investigation session.
//!
//! All display state lives in [`SessionModel`]. User intents and completion
//! signals arrive as [`SessionMsg`] values; side-effects are represented as
//! [`SessionCmd`] values returned from [`super::update::update`].
//!
//! **Design invariant:** the model is deterministic and testable. No I/O,
//! threads or clocks are touched here.

#![allow(missing_docs)]

use crate::animator::{AnimationEvent, ProgressTimeline};
use crate::core::claim::Claim;
use crate::core::config::AnimationConfig;
use crate::core::generation::Generation;
use crate::request::{AttemptOutcome, FailureReport};
use crate::verdict::{OutOfScopeNotice, VerdictData};

// ──────────────────── screens ────────────────────

/// Which screen is visible. `Landing` is initial; the three terminal screens
/// stay until the user acts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Landing,
    Pending,
    Verdict,
    OutOfScope,
    Error,
}

impl Screen {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Verdict | Self::OutOfScope | Self::Error)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Landing => "landing",
            Self::Pending => "pending",
            Self::Verdict => "verdict",
            Self::OutOfScope => "out_of_scope",
            Self::Error => "error",
        }
    }
}

// ──────────────────── suggestions ────────────────────

/// Claims offered as one-tap suggestions on every screen that accepts input.
pub const SUGGESTED_CLAIMS: [&str; 11] = [
    "Inflation is out of control",
    "Manufacturing is dead in India",
    "India's economy is slowing down",
    "Only services sector is growing",
    "Wholesale prices are rising",
    "Industrial production is growing",
    "Factory output is increasing",
    "Energy consumption is rising",
    "Rural India has it worse than cities",
    "Youth unemployment is a crisis",
    "Women are leaving the workforce",
];

/// Data domains the verdict service can answer, listed on the out-of-scope
/// screen.
pub const SUPPORTED_DOMAINS: [&str; 6] = [
    "Employment & Labour Statistics",
    "Inflation (CPI & WPI)",
    "GDP & National Accounts",
    "Industrial Output (IIP)",
    "Energy Statistics",
    "Environment Statistics",
];

// ──────────────────── model ────────────────────

#[derive(Debug)]
pub struct SessionModel {
    pub screen: Screen,
    /// Claim under investigation (or last investigated, on terminal screens).
    pub claim: Option<Claim>,
    /// Generation accepted for the current investigation. Completion signals
    /// from any other generation are ignored.
    pub generation: Option<Generation>,
    pub data_ready: bool,
    pub animation_ready: bool,
    pub verdict: Option<Box<VerdictData>>,
    pub out_of_scope: Option<OutOfScopeNotice>,
    pub failure: Option<FailureReport>,
    pub timeline: ProgressTimeline,
    pub animation: AnimationConfig,
    /// Count of signals dropped for belonging to a superseded generation.
    pub stale_signals: u64,
    pub quit: bool,
}

impl SessionModel {
    #[must_use]
    pub fn new(animation: AnimationConfig) -> Self {
        Self {
            screen: Screen::Landing,
            claim: None,
            generation: None,
            data_ready: false,
            animation_ready: false,
            verdict: None,
            out_of_scope: None,
            failure: None,
            timeline: ProgressTimeline::new(&animation),
            animation,
            stale_signals: 0,
            quit: false,
        }
    }

    /// Drop every per-investigation field and show `screen`.
    pub(super) fn clear_investigation(&mut self, screen: Screen) {
        self.screen = screen;
        self.generation = None;
        self.data_ready = false;
        self.animation_ready = false;
        self.verdict = None;
        self.out_of_scope = None;
        self.failure = None;
        self.timeline = ProgressTimeline::new(&self.animation);
    }

    /// Whether a completion signal tagged `generation` may touch the model.
    #[must_use]
    pub fn accepts(&self, generation: Generation) -> bool {
        self.screen == Screen::Pending && self.generation == Some(generation)
    }

    /// Dataset code of the received verdict, used as the stage 1 label hint.
    #[must_use]
    pub fn dataset_hint(&self) -> Option<&str> {
        self.verdict.as_deref().and_then(VerdictData::dataset_code)
    }
}

impl Default for SessionModel {
    fn default() -> Self {
        Self::new(AnimationConfig::default())
    }
}

// ──────────────────── messages ────────────────────

#[derive(Debug)]
pub enum SessionMsg {
    /// User typed and submitted a claim.
    Submit(String),
    /// User picked entry `n` (zero-based) from [`SUGGESTED_CLAIMS`].
    SelectSuggestion(usize),
    /// The runtime accepted a submission under this generation.
    AttemptStarted(Generation),
    /// A request attempt settled without being cancelled.
    RequestSettled {
        generation: Generation,
        outcome: AttemptOutcome,
    },
    Animation {
        generation: Generation,
        event: AnimationEvent,
    },
    Reset,
    Retry,
    Quit,
}

impl SessionMsg {
    /// Short name for activity logs and trace digests.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Submit(_) => "submit",
            Self::SelectSuggestion(_) => "select_suggestion",
            Self::AttemptStarted(_) => "attempt_started",
            Self::RequestSettled { .. } => "request_settled",
            Self::Animation { .. } => "animation",
            Self::Reset => "reset",
            Self::Retry => "retry",
            Self::Quit => "quit",
        }
    }
}

// ──────────────────── commands ────────────────────

#[derive(Debug, PartialEq)]
pub enum SessionCmd {
    None,
    /// Cancel outstanding work, then start a request and an animation for
    /// `claim` under a fresh generation.
    StartInvestigation(Claim),
    /// Tear down the animator; the request has already settled.
    StopAnimation,
    /// Cancel both the pending request and the animator.
    CancelAll,
    Quit,
    Batch(Vec<Self>),
}

// ──────────────────── tests ────────────────────
