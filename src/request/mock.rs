//! Offline demo service: canned verdicts, one out-of-scope claim, and
//! injected random failures.

#![allow(missing_docs)]

use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use serde_json::json;

use super::service::{ServiceResponse, VerdictService};
use crate::core::claim::Claim;
use crate::core::errors::{DteError, Result};

/// Claim the demo service always answers as out of scope.
pub const OUT_OF_SCOPE_CLAIM: &str = "India doesn't care about environment";

/// Fixture served for claims without a canned answer.
pub const FALLBACK_CLAIM: &str = "Nobody's hiring anymore";

/// Default share of calls that fail with a 503.
pub const DEFAULT_FAILURE_RATE: f64 = 0.1;

const FIXTURES: &str = include_str!("fixtures/verdicts.json");

#[derive(Debug, Deserialize)]
struct Fixture {
    claim: String,
    response: serde_json::Value,
}

/// Demo stand-in for the verdict service.
pub struct MockVerdictService {
    fixtures: Vec<Fixture>,
    failure_rate: f64,
    latency: Duration,
    rng: Mutex<StdRng>,
}

impl MockVerdictService {
    /// Build with the given failure rate (clamped to `0.0..=1.0`). A `seed`
    /// makes the failure sequence reproducible.
    pub fn new(failure_rate: f64, seed: Option<u64>) -> Result<Self> {
        let fixtures: Vec<Fixture> =
            serde_json::from_str(FIXTURES).map_err(|e| DteError::Serialization {
                context: "mock fixtures",
                details: e.to_string(),
            })?;
        if !failure_rate.is_finite() {
            return Err(DteError::InvalidConfig {
                details: format!("failure rate must be a number, got {failure_rate}"),
            });
        }
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Ok(Self {
            fixtures,
            failure_rate: failure_rate.clamp(0.0, 1.0),
            latency: Duration::ZERO,
            rng: Mutex::new(rng),
        })
    }

    /// Sleep this long before answering each call.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Claims with a canned verdict.
    pub fn known_claims(&self) -> impl Iterator<Item = &str> {
        self.fixtures.iter().map(|f| f.claim.as_str())
    }

    fn fixture_for(&self, claim: &str) -> Option<&Fixture> {
        self.fixtures
            .iter()
            .find(|f| f.claim == claim)
            .or_else(|| self.fixtures.iter().find(|f| f.claim == FALLBACK_CLAIM))
    }

    fn roll_failure(&self) -> bool {
        if self.failure_rate <= 0.0 {
            return false;
        }
        self.rng.lock().random::<f64>() < self.failure_rate
    }
}

impl VerdictService for MockVerdictService {
    fn check_claim(&self, claim: &Claim) -> Result<ServiceResponse> {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }

        if claim.as_str() == OUT_OF_SCOPE_CLAIM {
            let body = json!({
                "verdict": "out_of_scope",
                "explanation": "This question can't be answered using government economic statistics.",
                "availableTopics": "Employment & wages (PLFS), retail inflation (CPI), wholesale prices (WPI), \
                    industrial output (IIP, ASI), GDP & national accounts (NAS), and energy statistics.",
                "mcpSteps": [],
                "outOfScope": true,
            });
            return Ok(ServiceResponse::new(200, body.to_string()));
        }

        if self.roll_failure() {
            let body = json!({"error": true, "message": "MCP server not responding"});
            return Ok(ServiceResponse::new(503, body.to_string()));
        }

        let fixture = self
            .fixture_for(claim.as_str())
            .ok_or_else(|| DteError::malformed("no fixture available"))?;
        Ok(ServiceResponse::new(200, fixture.response.to_string()))
    }
}
