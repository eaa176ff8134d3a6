//! Request controller: issues claim checks, cancels superseded ones, and
//! classifies how each attempt settled.

pub mod controller;
pub mod mock;
pub mod outcome;
pub mod service;

pub use controller::{AttemptStatus, RequestController};
pub use mock::{MockVerdictService, OUT_OF_SCOPE_CLAIM};
pub use outcome::{AttemptOutcome, FailureReport, classify};
pub use service::{HttpVerdictService, ServiceResponse, VerdictService};
