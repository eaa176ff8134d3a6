//! Session state machine: which screen is visible, and the event loop that
//! drives it.
//!
//! Split along the same seams as any Elm-style app: `model` (state, messages,
//! commands), `update` (pure transitions), `render` (text frames), `runtime`
//! (threads and channels), plus a test-only headless `harness` for
//! deterministic replays.

#![allow(missing_docs)]

#[cfg(test)]
pub mod harness;
pub mod model;
pub mod render;
pub mod report;
pub mod runtime;
pub mod update;

#[cfg(test)]
mod test_replay;

#[cfg(test)]
pub use harness::{HarnessStep, SessionHarness};
pub use model::{SUGGESTED_CLAIMS, SUPPORTED_DOMAINS, Screen, SessionCmd, SessionModel, SessionMsg};
pub use report::SessionReport;
pub use runtime::{FrameSink, NullFrameSink, SessionRuntime};
