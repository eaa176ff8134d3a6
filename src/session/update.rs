//! Pure transition function for the session state machine.
//!
//! The verdict screen is a 2-of-2 join: it needs both the resolved request
//! ("data ready") and the finished animation ("animation ready"), in either
//! order. Failed and out-of-scope outcomes short-circuit the join.

#![allow(missing_docs)]

use super::model::{SUGGESTED_CLAIMS, Screen, SessionCmd, SessionModel, SessionMsg};
use crate::animator::AnimationEvent;
use crate::core::claim::Claim;
use crate::core::errors::DteError;
use crate::request::{AttemptOutcome, FailureReport};

/// Apply one message and return the side-effect the runtime must perform.
pub fn update(model: &mut SessionModel, msg: SessionMsg) -> SessionCmd {
    match msg {
        SessionMsg::Submit(text) => match Claim::new(text) {
            Ok(claim) => begin(model, claim),
            Err(_) => SessionCmd::None,
        },
        SessionMsg::SelectSuggestion(index) => SUGGESTED_CLAIMS
            .get(index)
            .and_then(|text| Claim::new(*text).ok())
            .map_or(SessionCmd::None, |claim| begin(model, claim)),
        SessionMsg::AttemptStarted(generation) => {
            if model.screen == Screen::Pending && model.generation.is_none() {
                model.generation = Some(generation);
            } else {
                model.stale_signals += 1;
            }
            SessionCmd::None
        }
        SessionMsg::RequestSettled {
            generation,
            outcome,
        } => {
            if !model.accepts(generation) {
                model.stale_signals += 1;
                return SessionCmd::None;
            }
            settle(model, outcome)
        }
        SessionMsg::Animation { generation, event } => {
            if !model.accepts(generation) {
                model.stale_signals += 1;
                return SessionCmd::None;
            }
            animate(model, event)
        }
        SessionMsg::Reset => {
            if model.screen == Screen::Landing && model.claim.is_none() {
                return SessionCmd::None;
            }
            model.claim = None;
            model.clear_investigation(Screen::Landing);
            SessionCmd::CancelAll
        }
        SessionMsg::Retry => match (model.screen, model.claim.clone()) {
            (Screen::Error, Some(claim)) => begin(model, claim),
            _ => SessionCmd::None,
        },
        SessionMsg::Quit => {
            model.quit = true;
            SessionCmd::Batch(vec![SessionCmd::CancelAll, SessionCmd::Quit])
        }
    }
}

/// Enter `Pending` for `claim`. The generation arrives with
/// [`SessionMsg::AttemptStarted`] once the runtime has issued the request.
fn begin(model: &mut SessionModel, claim: Claim) -> SessionCmd {
    model.clear_investigation(Screen::Pending);
    model.claim = Some(claim.clone());
    SessionCmd::StartInvestigation(claim)
}

fn settle(model: &mut SessionModel, outcome: AttemptOutcome) -> SessionCmd {
    match outcome {
        AttemptOutcome::Resolved(data) => {
            model.verdict = Some(data);
            model.data_ready = true;
            try_join(model);
            SessionCmd::None
        }
        AttemptOutcome::OutOfScope(notice) => {
            model.out_of_scope = Some(notice);
            model.screen = Screen::OutOfScope;
            stop_animation_unless_done(model)
        }
        AttemptOutcome::Failed(report) => {
            model.failure = Some(report);
            model.screen = Screen::Error;
            stop_animation_unless_done(model)
        }
    }
}

fn animate(model: &mut SessionModel, event: AnimationEvent) -> SessionCmd {
    match event {
        AnimationEvent::StageCompleted { stage } => {
            model.timeline.complete_stage(stage);
        }
        AnimationEvent::Finished => {
            // A dropped stage event must not wedge the join.
            while let Some(stage) = model.timeline.current_stage() {
                model.timeline.complete_stage(stage);
            }
            model.timeline.finish();
            model.animation_ready = true;
            try_join(model);
        }
    }
    SessionCmd::None
}

fn try_join(model: &mut SessionModel) {
    if !(model.data_ready && model.animation_ready) {
        return;
    }
    if model.verdict.is_some() {
        model.screen = Screen::Verdict;
    } else {
        model.failure = Some(FailureReport::from_error(&DteError::malformed(
            "join reached without a normalized verdict",
        )));
        model.screen = Screen::Error;
    }
}

fn stop_animation_unless_done(model: &SessionModel) -> SessionCmd {
    if model.animation_ready {
        SessionCmd::None
    } else {
        SessionCmd::StopAnimation
    }
}
