//! Five-stage "how did we get this data" narrative.
//!
//! The service reports four traced steps; the fifth (interpretation) is never
//! traced and is synthesized here with empty timing and raw data.

use serde::Serialize;

use super::model::VerdictData;

/// Number of stages in the narrative.
pub const BACKSTAGE_STAGE_COUNT: usize = 5;

/// Placeholder when the citation carries no dataset code.
const GENERIC_DATASET: &str = "dataset";

/// One rendered stage of the narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackstageStage {
    pub id: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub result: String,
    pub time: String,
    pub raw_data: String,
}

struct StageTemplate {
    id: u8,
    name: &'static str,
    description: &'static str,
    result: &'static str,
}

const TRACED_STAGES: [StageTemplate; 4] = [
    StageTemplate {
        id: 1,
        name: "Classifier agent",
        description: "Used MCP tool 1_know_about_mospi_api (cached) and selected a dataset.",
        result: "Selected",
    },
    StageTemplate {
        id: 2,
        name: "Selector-A agent",
        description: "Used MCP tool 2_get_indicators to choose indicator parameters.",
        result: "Indicators selected",
    },
    StageTemplate {
        id: 3,
        name: "Selector-B agent",
        description: "Used MCP tool 3_get_metadata to choose filters.",
        result: "Filters selected",
    },
    StageTemplate {
        id: 4,
        name: "MCP fetch",
        description: "Used MCP tool 4_get_data to retrieve data points.",
        result: "Data points retrieved",
    },
];

/// Build the narrative for a verdict.
///
/// Stages 1–4 take timing and raw data from the first trace record with the
/// matching id; a missing record leaves both empty but keeps the description.
#[must_use]
pub fn backstage_narrative(data: &VerdictData) -> Vec<BackstageStage> {
    let dataset = data.dataset_code().unwrap_or(GENERIC_DATASET);
    let mut stages: Vec<BackstageStage> = TRACED_STAGES
        .iter()
        .map(|template| {
            let (time, raw_data) = data
                .step(template.id)
                .map(|step| (step.time.clone(), step.raw_data.clone()))
                .unwrap_or_default();
            let result = if template.id == 1 {
                format!("{} {dataset}", template.result)
            } else {
                template.result.to_string()
            };
            BackstageStage {
                id: template.id,
                name: template.name,
                description: template.description,
                result,
                time,
                raw_data,
            }
        })
        .collect();

    stages.push(BackstageStage {
        id: 5,
        name: "Interpreter agent",
        description: "Interpreted the data points to produce the verdict.",
        result: "Verdict generated".to_string(),
        time: String::new(),
        raw_data: String::new(),
    });
    stages
}
