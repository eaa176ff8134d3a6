//! Transport seam to the verdict-computation service.

#![allow(missing_docs)]

use crate::core::claim::{Claim, ClaimRequest};
use crate::core::config::ServiceConfig;
use crate::core::errors::{DteError, Result};

/// Raw HTTP-level answer: status plus undecoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: String,
}

impl ServiceResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Something that can answer a claim check.
///
/// `Err` means the call never produced a response (connect failure, timeout,
/// broken body stream). Any response, whatever its status, is `Ok`.
pub trait VerdictService: Send + Sync {
    fn check_claim(&self, claim: &Claim) -> Result<ServiceResponse>;
}

/// Production client: `POST {base_url}/api/check-claim`.
#[derive(Debug, Clone)]
pub struct HttpVerdictService {
    url: String,
    http_client: reqwest::blocking::Client,
}

impl HttpVerdictService {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let http_client = reqwest::blocking::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(concat!("dte/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| DteError::Transport {
                details: format!("cannot initialize HTTP client: {error}"),
            })?;
        Ok(Self {
            url: config.check_claim_url(),
            http_client,
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl VerdictService for HttpVerdictService {
    fn check_claim(&self, claim: &Claim) -> Result<ServiceResponse> {
        let response = self
            .http_client
            .post(&self.url)
            .header("Accept", "application/json")
            .json(&ClaimRequest::from(claim))
            .send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(ServiceResponse { status, body })
    }
}
