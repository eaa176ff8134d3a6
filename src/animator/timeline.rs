//! Pure state of the investigation narrative shown while a claim is pending.
//!
//! The timeline only knows stage order, durations, and a cursor. Wall-clock
//! scheduling lives in [`super::driver`]; the session model advances the
//! timeline when the driver's events arrive.

#![allow(missing_docs)]

use std::time::Duration;

use crate::core::config::AnimationConfig;

/// Static description of one timed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSpec {
    pub id: u8,
    /// Label while the stage is running (ends in `...`).
    pub label: &'static str,
    pub duration: Duration,
    generic_completed: &'static str,
}

impl StageSpec {
    /// Label once the stage is done (trailing `...` dropped).
    #[must_use]
    pub fn done_label(&self) -> &'static str {
        self.label.trim_end_matches("...")
    }

    /// Nominal duration as shown next to a finished stage, e.g. `0.7s`.
    #[must_use]
    pub fn duration_badge(&self) -> String {
        format!("{:.1}s", self.duration.as_secs_f64())
    }
}

/// Display status of a stage relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Done,
    Active,
    Waiting,
}

const STAGE_TEXT: [(&str, &str); 4] = [
    ("Discovering datasets...", "Found 7 datasets"),
    ("Finding indicators...", "Matched indicators"),
    ("Preparing filters...", "Filtered for latest years"),
    ("Fetching data...", "Retrieved data points"),
];

/// Label of the untimed closing stage shown during the grace period.
pub const INTERPRETING_LABEL: &str = "Interpreting results...";

/// Cursor over the fixed narrative stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressTimeline {
    stages: Vec<StageSpec>,
    grace: Duration,
    completed: usize,
    finished: bool,
}

impl ProgressTimeline {
    /// Build the four timed stages from configured durations.
    ///
    /// Durations beyond the fourth are ignored; missing ones default to zero.
    #[must_use]
    pub fn new(config: &AnimationConfig) -> Self {
        let durations = config.stage_durations();
        let stages = STAGE_TEXT
            .iter()
            .enumerate()
            .map(|(idx, &(label, generic_completed))| StageSpec {
                id: u8::try_from(idx + 1).unwrap_or(u8::MAX),
                label,
                duration: durations.get(idx).copied().unwrap_or_default(),
                generic_completed,
            })
            .collect();
        Self {
            stages,
            grace: config.grace(),
            completed: 0,
            finished: false,
        }
    }

    #[must_use]
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    #[must_use]
    pub const fn grace(&self) -> Duration {
        self.grace
    }

    /// Number of stages whose duration has elapsed.
    #[must_use]
    pub const fn completed(&self) -> usize {
        self.completed
    }

    /// 1-based id of the running stage, `None` once every stage is done.
    #[must_use]
    pub fn current_stage(&self) -> Option<u8> {
        self.stages.get(self.completed).map(|s| s.id)
    }

    /// All timed stages are done; the closing "interpreting" stage shows.
    #[must_use]
    pub fn interpreting(&self) -> bool {
        self.completed >= self.stages.len()
    }

    /// Grace period elapsed after the last stage.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Mark stage `id` complete. Stages complete strictly in order; an
    /// out-of-order or repeated id is ignored and returns `false`.
    pub fn complete_stage(&mut self, id: u8) -> bool {
        match self.current_stage() {
            Some(current) if current == id => {
                self.completed += 1;
                true
            }
            _ => false,
        }
    }

    /// Record the completion signal. Only valid once every stage is done.
    pub fn finish(&mut self) -> bool {
        if !self.interpreting() || self.finished {
            return false;
        }
        self.finished = true;
        true
    }

    #[must_use]
    pub fn status(&self, idx: usize) -> StageStatus {
        match idx.cmp(&self.completed) {
            std::cmp::Ordering::Less => StageStatus::Done,
            std::cmp::Ordering::Equal => StageStatus::Active,
            std::cmp::Ordering::Greater => StageStatus::Waiting,
        }
    }

    /// Completed-description for stage `idx` (0-based).
    ///
    /// Stage 1 names the selected dataset when `dataset_hint` is known by the
    /// time it is rendered.
    #[must_use]
    pub fn completed_text(&self, idx: usize, dataset_hint: Option<&str>) -> String {
        let Some(stage) = self.stages.get(idx) else {
            return String::new();
        };
        match (stage.id, dataset_hint) {
            (1, Some(code)) => format!("{} → Selected {code}", stage.generic_completed),
            _ => stage.generic_completed.to_string(),
        }
    }

    /// Wall-clock time from start to completion signal.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum::<Duration>() + self.grace
    }
}
