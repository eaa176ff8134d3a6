//! Headless session harness: drives the pure update loop without threads or
//! clocks and records every frame and transition.
//!
//! Generations are allocated the way the runtime's request controller
//! allocates them (monotonic, starting at `g1`), so scripted signals can
//! name the generation they belong to.

#![allow(missing_docs)]

use std::fmt::Write as _;

use sha2::{Digest, Sha256};

use super::model::{Screen, SessionCmd, SessionModel, SessionMsg};
use super::{render, update};
use crate::animator::AnimationEvent;
use crate::core::config::{AnimationConfig, TIMED_STAGE_COUNT};
use crate::core::generation::Generation;
use crate::request::AttemptOutcome;

/// One scripted input for [`SessionHarness::run_script`].
#[derive(Debug, Clone)]
pub enum HarnessStep {
    Submit(String),
    SelectSuggestion(usize),
    Settle {
        generation: u64,
        outcome: AttemptOutcome,
    },
    StageCompleted {
        generation: u64,
        stage: u8,
    },
    AnimationFinished {
        generation: u64,
    },
    Reset,
    Retry,
}

/// Rendered frame captured after a message was applied.
#[derive(Debug, Clone)]
pub struct Frame {
    pub screen: Screen,
    pub text: String,
}

#[derive(Debug)]
pub struct SessionHarness {
    model: SessionModel,
    latest: Generation,
    frames: Vec<Frame>,
    trace: Vec<String>,
    animation_running: bool,
    request_pending: bool,
}

impl Default for SessionHarness {
    fn default() -> Self {
        Self::new(AnimationConfig::default())
    }
}

impl SessionHarness {
    #[must_use]
    pub fn new(animation: AnimationConfig) -> Self {
        let model = SessionModel::new(animation);
        let frames = vec![Frame {
            screen: model.screen,
            text: render::render(&model),
        }];
        Self {
            model,
            latest: Generation::default(),
            frames,
            trace: Vec::new(),
            animation_running: false,
            request_pending: false,
        }
    }

    // ── inputs ──

    /// Submit `text`; returns the generation the runtime would allocate, or
    /// `None` if the submission was rejected.
    pub fn submit(&mut self, text: &str) -> Option<Generation> {
        let before = self.latest;
        self.dispatch(SessionMsg::Submit(text.to_string()));
        (self.latest != before).then_some(self.latest)
    }

    pub fn select_suggestion(&mut self, index: usize) -> Option<Generation> {
        let before = self.latest;
        self.dispatch(SessionMsg::SelectSuggestion(index));
        (self.latest != before).then_some(self.latest)
    }

    pub fn settle(&mut self, generation: Generation, outcome: AttemptOutcome) {
        // The controller never emits for a superseded attempt; the model's
        // own generation gate is what this harness exercises.
        if generation == self.latest {
            self.request_pending = false;
        }
        self.dispatch(SessionMsg::RequestSettled {
            generation,
            outcome,
        });
    }

    pub fn stage_completed(&mut self, generation: Generation, stage: u8) {
        self.dispatch(SessionMsg::Animation {
            generation,
            event: AnimationEvent::StageCompleted { stage },
        });
    }

    pub fn animation_finished(&mut self, generation: Generation) {
        if generation == self.latest {
            self.animation_running = false;
        }
        self.dispatch(SessionMsg::Animation {
            generation,
            event: AnimationEvent::Finished,
        });
    }

    /// Play every timed stage and the completion signal for `generation`.
    pub fn run_animation(&mut self, generation: Generation) {
        for stage in 1..=TIMED_STAGE_COUNT {
            self.stage_completed(generation, u8::try_from(stage).unwrap_or(u8::MAX));
        }
        self.animation_finished(generation);
    }

    pub fn reset(&mut self) {
        self.dispatch(SessionMsg::Reset);
    }

    pub fn retry(&mut self) -> Option<Generation> {
        let before = self.latest;
        self.dispatch(SessionMsg::Retry);
        (self.latest != before).then_some(self.latest)
    }

    pub fn run_script(&mut self, script: &[HarnessStep]) {
        for step in script {
            match step.clone() {
                HarnessStep::Submit(text) => {
                    self.submit(&text);
                }
                HarnessStep::SelectSuggestion(index) => {
                    self.select_suggestion(index);
                }
                HarnessStep::Settle {
                    generation,
                    outcome,
                } => self.settle(Generation::new(generation), outcome),
                HarnessStep::StageCompleted { generation, stage } => {
                    self.stage_completed(Generation::new(generation), stage);
                }
                HarnessStep::AnimationFinished { generation } => {
                    self.animation_finished(Generation::new(generation));
                }
                HarnessStep::Reset => self.reset(),
                HarnessStep::Retry => {
                    self.retry();
                }
            }
        }
    }

    // ── observations ──

    #[must_use]
    pub fn model(&self) -> &SessionModel {
        &self.model
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.model.screen
    }

    #[must_use]
    pub fn latest_generation(&self) -> Generation {
        self.latest
    }

    /// Whether the runtime would still have an animator running.
    #[must_use]
    pub const fn animation_running(&self) -> bool {
        self.animation_running
    }

    /// Whether the runtime would still have a request in flight.
    #[must_use]
    pub const fn request_pending(&self) -> bool {
        self.request_pending
    }

    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[must_use]
    pub fn last_frame(&self) -> &Frame {
        // Construction always records the initial frame.
        &self.frames[self.frames.len() - 1]
    }

    /// Screens visited, in order, with consecutive repeats collapsed.
    #[must_use]
    pub fn screen_history(&self) -> Vec<Screen> {
        let mut screens: Vec<Screen> = self.frames.iter().map(|f| f.screen).collect();
        screens.dedup();
        screens
    }

    #[must_use]
    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    /// SHA-256 over the transition trace, hex-encoded.
    #[must_use]
    pub fn trace_digest(&self) -> String {
        let mut hasher = Sha256::new();
        for line in &self.trace {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }
        hasher
            .finalize()
            .iter()
            .fold(String::with_capacity(64), |mut hex, byte| {
                let _ = write!(hex, "{byte:02x}");
                hex
            })
    }

    // ── loop ──

    fn dispatch(&mut self, msg: SessionMsg) {
        let name = msg.name();
        let cmd = update::update(&mut self.model, msg);
        self.record(name);
        self.execute(cmd);
    }

    fn execute(&mut self, cmd: SessionCmd) {
        match cmd {
            SessionCmd::None | SessionCmd::Quit => {}
            SessionCmd::StartInvestigation(_) => {
                self.latest = self.latest.next();
                self.request_pending = true;
                self.animation_running = true;
                self.dispatch(SessionMsg::AttemptStarted(self.latest));
            }
            SessionCmd::StopAnimation => self.animation_running = false,
            SessionCmd::CancelAll => {
                self.animation_running = false;
                self.request_pending = false;
            }
            SessionCmd::Batch(cmds) => {
                for cmd in cmds {
                    self.execute(cmd);
                }
            }
        }
    }

    fn record(&mut self, msg: &str) {
        let model = &self.model;
        let generation = model
            .generation
            .map_or_else(|| "-".to_string(), |g| g.to_string());
        self.trace.push(format!(
            "{msg} screen={} gen={generation} data={} anim={} stages={} stale={}",
            model.screen.as_str(),
            model.data_ready,
            model.animation_ready,
            model.timeline.completed(),
            model.stale_signals,
        ));
        self.frames.push(Frame {
            screen: model.screen,
            text: render::render(model),
        });
    }
}
