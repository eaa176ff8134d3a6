//! Wall-clock driver for the progress timeline.
//!
//! One thread per animation walks the stage durations with
//! [`crossbeam_channel::after`] timers and reports through an emit callback.
//! The thread never looks at network state. Cancelling disconnects the cancel
//! channel, which wakes the thread out of whatever timer it is waiting on.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, after, bounded, select};

use crate::core::errors::{DteError, Result};
use crate::core::generation::Generation;

/// Signals emitted by a running animation, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEvent {
    /// The stage with this 1-based id reached the end of its duration.
    StageCompleted { stage: u8 },
    /// Grace period after the last stage elapsed. Emitted at most once.
    Finished,
}

/// Owner of one running animation. Dropping it cancels the animation.
#[derive(Debug)]
pub struct AnimationHandle {
    generation: Generation,
    cancelled: Arc<AtomicBool>,
    cancel_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl AnimationHandle {
    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Stop the animation and wait for its thread to exit.
    ///
    /// Once this returns no further event is emitted for this handle.
    /// Idempotent.
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        self.cancel_tx.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Drop for AnimationHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Start an animation for `generation`.
///
/// `emit` is called from the animation thread; returning `false` (receiver
/// gone) stops the animation early.
pub fn start<F>(
    generation: Generation,
    stage_durations: Vec<Duration>,
    grace: Duration,
    emit: F,
) -> Result<AnimationHandle>
where
    F: Fn(Generation, AnimationEvent) -> bool + Send + 'static,
{
    let cancelled = Arc::new(AtomicBool::new(false));
    let (cancel_tx, cancel_rx) = bounded::<()>(1);
    let flag = Arc::clone(&cancelled);

    let thread = thread::Builder::new()
        .name(format!("dte-animator-{generation}"))
        .spawn(move || run(generation, &stage_durations, grace, &cancel_rx, &flag, &emit))
        .map_err(|e| DteError::Runtime {
            details: format!("failed to spawn animator thread: {e}"),
        })?;

    Ok(AnimationHandle {
        generation,
        cancelled,
        cancel_tx: Some(cancel_tx),
        thread: Some(thread),
    })
}

fn run<F>(
    generation: Generation,
    stage_durations: &[Duration],
    grace: Duration,
    cancel_rx: &Receiver<()>,
    cancelled: &AtomicBool,
    emit: &F,
) where
    F: Fn(Generation, AnimationEvent) -> bool,
{
    for (idx, duration) in stage_durations.iter().enumerate() {
        if !wait(*duration, cancel_rx) || cancelled.load(Ordering::Acquire) {
            return;
        }
        let stage = u8::try_from(idx + 1).unwrap_or(u8::MAX);
        if !emit(generation, AnimationEvent::StageCompleted { stage }) {
            return;
        }
    }
    if !wait(grace, cancel_rx) || cancelled.load(Ordering::Acquire) {
        return;
    }
    emit(generation, AnimationEvent::Finished);
}

/// Sleep for `duration` unless cancelled first. Returns `false` on cancel.
fn wait(duration: Duration, cancel_rx: &Receiver<()>) -> bool {
    select! {
        recv(cancel_rx) -> _ => false,
        recv(after(duration)) -> _ => true,
    }
}
