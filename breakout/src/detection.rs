use serde::Serialize;

use crate::baseline::BaselineStats;
use crate::constant::{BreakoutMode, RejectReason};
use crate::score::ScoreBreakdown;
use crate::threshold::TierBreach;

/// Today's observed figures as the engine saw them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodayStats {
    pub price: f64,
    pub change_pct: f64,
    pub volume: f64,
    pub volume_ratio: f64,
}

/// A symbol that survived the full pipeline, with everything a caller
/// needs to explain why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub symbol: String,
    pub today: TodayStats,
    pub baseline: BaselineStats,
    pub breaches: Vec<TierBreach>,
    pub modes: Vec<BreakoutMode>,
    pub similar_day_count: Option<usize>,
    pub recent_max_ratio: f64,
    pub scores: ScoreBreakdown,
}

/// Whatever was known at the point the pipeline stopped. Later stages
/// leave earlier fields populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub today: Option<TodayStats>,
    pub baseline: Option<BaselineStats>,
    pub breaches: Option<Vec<TierBreach>>,
    pub scores: Option<ScoreBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub symbol: String,
    pub reason: RejectReason,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Evaluation {
    Accepted(Detection),
    Rejected(Rejection),
}

impl Evaluation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Evaluation::Accepted(_))
    }

    pub fn detection(&self) -> Option<&Detection> {
        match self {
            Evaluation::Accepted(detection) => Some(detection),
            Evaluation::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Evaluation::Accepted(_) => None,
            Evaluation::Rejected(rejection) => Some(rejection),
        }
    }
}
