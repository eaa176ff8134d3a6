//! Progress animator: the timed investigation narrative.
//!
//! [`timeline`] holds the pure cursor state rendered by the session;
//! [`driver`] runs the wall-clock timer chain on its own thread.

pub mod driver;
pub mod timeline;

pub use driver::{AnimationEvent, AnimationHandle};
pub use timeline::{INTERPRETING_LABEL, ProgressTimeline, StageSpec, StageStatus};
