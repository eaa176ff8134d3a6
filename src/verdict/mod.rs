//! Verdict model: wire payloads, normalization, and the backstage narrative.

pub mod backstage;
pub mod model;
pub mod normalize;

pub use backstage::{BackstageStage, backstage_narrative};
pub use model::{ChartPoint, McpStep, OutOfScopeNotice, RawPayload, Verdict, VerdictData};
pub use normalize::{dataset_code, normalize, normalize_body};
