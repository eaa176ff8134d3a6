//! Event loop that owns the session model.
//!
//! Request workers, animator threads and input readers only ever send
//! [`SessionMsg`] values into one channel. This loop is the single mutator of
//! [`SessionModel`]: it applies each message through the pure update function
//! and bridges the returned [`SessionCmd`] to the request controller and the
//! animation driver.

#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

use super::model::{Screen, SessionCmd, SessionModel, SessionMsg};
use super::{render, update};
use crate::animator::{AnimationEvent, AnimationHandle, driver};
use crate::core::claim::Claim;
use crate::core::config::AnimationConfig;
use crate::core::errors::{DteError, Result};
use crate::logger::{JsonlLogger, LogEntry};
use crate::request::{AttemptOutcome, RequestController, VerdictService};

/// Receives a frame every time the rendered screen changes.
pub trait FrameSink {
    fn frame(&mut self, model: &SessionModel, frame: &str);
}

impl<F: FnMut(&SessionModel, &str)> FrameSink for F {
    fn frame(&mut self, model: &SessionModel, frame: &str) {
        self(model, frame);
    }
}

/// Sink that discards frames.
#[derive(Debug, Default)]
pub struct NullFrameSink;

impl FrameSink for NullFrameSink {
    fn frame(&mut self, _model: &SessionModel, _frame: &str) {}
}

pub struct SessionRuntime {
    model: SessionModel,
    controller: RequestController,
    animation: Option<AnimationHandle>,
    tx: Sender<SessionMsg>,
    rx: Receiver<SessionMsg>,
    logger: JsonlLogger,
    last_frame: String,
}

impl SessionRuntime {
    #[must_use]
    pub fn new(
        service: Arc<dyn VerdictService>,
        animation: AnimationConfig,
        logger: JsonlLogger,
    ) -> Self {
        let (tx, rx) = unbounded();
        Self {
            model: SessionModel::new(animation),
            controller: RequestController::new(service),
            animation: None,
            tx,
            rx,
            logger,
            last_frame: String::new(),
        }
    }

    #[must_use]
    pub fn model(&self) -> &SessionModel {
        &self.model
    }

    /// Handle for input sources that feed user intents into the loop.
    #[must_use]
    pub fn sender(&self) -> Sender<SessionMsg> {
        self.tx.clone()
    }

    #[must_use]
    pub fn logger(&self) -> &JsonlLogger {
        &self.logger
    }

    /// Submit `claim` and run until a terminal screen is reached.
    pub fn investigate(&mut self, claim: &str, sink: &mut dyn FrameSink) -> Result<Screen> {
        let claim = Claim::new(claim)?;
        self.apply(SessionMsg::Submit(claim.as_str().to_string()), sink)?;
        self.run_until(|model| model.screen != Screen::Pending, sink, None)?;
        Ok(self.model.screen)
    }

    /// Process messages until `done` holds, the model quits, or `timeout`
    /// elapses without any message.
    pub fn run_until(
        &mut self,
        done: impl Fn(&SessionModel) -> bool,
        sink: &mut dyn FrameSink,
        timeout: Option<Duration>,
    ) -> Result<()> {
        while !done(&self.model) && !self.model.quit {
            let msg = match timeout {
                Some(limit) => match self.rx.recv_timeout(limit) {
                    Ok(msg) => msg,
                    Err(RecvTimeoutError::Timeout) => return Ok(()),
                    Err(RecvTimeoutError::Disconnected) => {
                        return Err(DteError::ChannelClosed {
                            component: "session loop",
                        });
                    }
                },
                // The runtime holds a sender itself, so this only fails if
                // the channel is torn down underneath us.
                None => self.rx.recv().map_err(|_| DteError::ChannelClosed {
                    component: "session loop",
                })?,
            };
            self.apply(msg, sink)?;
        }
        Ok(())
    }

    /// Apply one message, perform its command, log, and emit a frame if the
    /// screen changed.
    pub fn apply(&mut self, msg: SessionMsg, sink: &mut dyn FrameSink) -> Result<()> {
        let before = self.model.screen;
        let stale_before = self.model.stale_signals;
        let entry = self.entry_for(&msg);

        let cmd = update::update(&mut self.model, msg);

        if let Some(entry) = entry {
            if self.model.stale_signals > stale_before {
                self.logger.log(&entry.detail("stale generation discarded"));
            } else {
                self.logger.log(&entry);
            }
        }
        self.execute(cmd)?;

        if self.model.screen != before {
            self.logger.log(
                &LogEntry::new("screen_transition")
                    .screen(self.model.screen.as_str())
                    .detail(format!("{} -> {}", before.as_str(), self.model.screen.as_str())),
            );
        }
        self.emit_frame(sink);
        Ok(())
    }

    /// Bridge between the pure state machine and the worker threads.
    fn execute(&mut self, cmd: SessionCmd) -> Result<()> {
        match cmd {
            SessionCmd::None | SessionCmd::Quit => Ok(()),
            SessionCmd::StartInvestigation(claim) => {
                self.stop_animation();
                let tx = self.tx.clone();
                let generation = self.controller.submit(claim, move |generation, outcome| {
                    let _ = tx.send(SessionMsg::RequestSettled {
                        generation,
                        outcome,
                    });
                })?;
                update::update(&mut self.model, SessionMsg::AttemptStarted(generation));
                self.logger.log(
                    &LogEntry::new("submission_accepted")
                        .generation(generation)
                        .screen(self.model.screen.as_str()),
                );

                let tx = self.tx.clone();
                let handle = driver::start(
                    generation,
                    self.model.animation.stage_durations(),
                    self.model.animation.grace(),
                    move |generation, event| {
                        tx.send(SessionMsg::Animation { generation, event }).is_ok()
                    },
                )?;
                self.animation = Some(handle);
                Ok(())
            }
            SessionCmd::StopAnimation => {
                self.stop_animation();
                Ok(())
            }
            SessionCmd::CancelAll => {
                self.controller.cancel();
                self.stop_animation();
                Ok(())
            }
            SessionCmd::Batch(cmds) => cmds.into_iter().try_for_each(|c| self.execute(c)),
        }
    }

    fn stop_animation(&mut self) {
        if let Some(mut handle) = self.animation.take() {
            handle.cancel();
        }
    }

    fn emit_frame(&mut self, sink: &mut dyn FrameSink) {
        let frame = render::render(&self.model);
        if frame != self.last_frame {
            sink.frame(&self.model, &frame);
            self.last_frame = frame;
        }
    }

    fn entry_for(&self, msg: &SessionMsg) -> Option<LogEntry> {
        let entry = match msg {
            SessionMsg::RequestSettled {
                generation,
                outcome,
            } => {
                let entry = LogEntry::new("request_settled")
                    .generation(*generation)
                    .detail(outcome.label());
                match outcome {
                    AttemptOutcome::Failed(report) => entry
                        .code(report.code)
                        .detail(format!("{}: {}", report.kind.as_str(), report.message)),
                    AttemptOutcome::Resolved(_) | AttemptOutcome::OutOfScope(_) => entry,
                }
            }
            SessionMsg::Animation { generation, event } => {
                let name = match event {
                    AnimationEvent::StageCompleted { .. } => "stage_advanced",
                    AnimationEvent::Finished => "animation_finished",
                };
                LogEntry::new(name)
                    .generation(*generation)
                    .detail(format!("{event:?}"))
            }
            SessionMsg::Reset => LogEntry::new("reset"),
            SessionMsg::Retry => LogEntry::new("retry"),
            SessionMsg::Submit(_) | SessionMsg::SelectSuggestion(_) => {
                LogEntry::new("submit_requested")
            }
            SessionMsg::AttemptStarted(_) | SessionMsg::Quit => return None,
        };
        Some(entry.screen(self.model.screen.as_str()))
    }
}

impl Drop for SessionRuntime {
    fn drop(&mut self) {
        self.controller.cancel();
        self.stop_animation();
    }
}
