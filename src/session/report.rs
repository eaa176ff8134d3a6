//! Machine-readable summary of a finished investigation (`--json`).

#![allow(missing_docs)]

use serde::Serialize;

use super::model::{Screen, SessionModel};
use crate::request::FailureReport;
use crate::verdict::{BackstageStage, OutOfScopeNotice, VerdictData, backstage_narrative};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim: Option<&'a str>,
    pub screen: Screen,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<&'a VerdictData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backstage: Option<Vec<BackstageStage>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_of_scope: Option<&'a OutOfScopeNotice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<&'a FailureReport>,
}

impl<'a> SessionReport<'a> {
    /// Snapshot the model. Verdict details are included only on the verdict
    /// screen, so a superseded or failed attempt never leaks into the report.
    #[must_use]
    pub fn from_model(model: &'a SessionModel, include_backstage: bool) -> Self {
        let verdict = match model.screen {
            Screen::Verdict => model.verdict.as_deref(),
            _ => None,
        };
        Self {
            claim: model.claim.as_ref().map(|c| c.as_str()),
            screen: model.screen,
            verdict,
            dataset_code: verdict.and_then(VerdictData::dataset_code),
            backstage: verdict
                .filter(|_| include_backstage)
                .map(backstage_narrative),
            out_of_scope: model
                .out_of_scope
                .as_ref()
                .filter(|_| model.screen == Screen::OutOfScope),
            failure: model
                .failure
                .as_ref()
                .filter(|_| model.screen == Screen::Error),
        }
    }
}
