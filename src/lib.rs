//! Dinner Table Economist: fact-check informal economic claims against
//! government statistics while narrating the investigation.
//!
//! One submission runs a verdict-service request and a timed progress
//! narrative side by side; the session state machine joins the two into
//! exactly one terminal screen (verdict, out-of-scope, or error).
//!
//! Layout, leaves first:
//! - [`verdict`]: wire payloads, normalization, backstage narrative.
//! - [`animator`]: the timed stage narrative and its wall-clock driver.
//! - [`request`]: the service seam, request controller, and demo service.
//! - [`session`]: state machine, rendering, event loop, replay harness.
//! - [`core`] and [`logger`]: config, errors, generations, activity log.

pub mod animator;
pub mod core;
pub mod logger;
pub mod request;
pub mod session;
pub mod verdict;

#[cfg(feature = "cli")]
pub mod cli_app;

pub use crate::core::errors::{DteError, Result};
