use serde::{Deserialize, Serialize};

use crate::bar::DailyBar;
use crate::constant::BreakoutMode;
use crate::threshold::TierBreach;

/// Threshold-of-today's-volume formulation: three OR-combined modes over
/// the per-tier breach counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierModeConfig {
    pub strict_enabled: bool,
    pub loose_enabled: bool,
    pub recent_breakthrough_enabled: bool,
    pub strict_tier: String,
    pub loose_tier: String,
    pub max_loose_days: usize,
    pub max_recent_strict_days: usize,
}

/// Ratio-to-baseline formulation: count recent days whose ratio reaches a
/// fraction of today's ratio, reject when too many did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarDayConfig {
    pub fraction: f64,
    pub max_similar_days: usize,
}

/// The two first-occurrence formulations found across the source
/// strategies. They are not equivalent and the selected one's semantics
/// are preserved exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoveltyRule {
    TierModes(TierModeConfig),
    SimilarDay(SimilarDayConfig),
}

/// Classifier output: the set of passing modes (empty means reject), the
/// similar-day count when that rule is active, and the largest
/// ratio-to-baseline seen in the recent window.
#[derive(Debug, Clone, PartialEq)]
pub struct NoveltyOutcome {
    pub modes: Vec<BreakoutMode>,
    pub similar_day_count: Option<usize>,
    pub recent_max_ratio: f64,
}

pub fn classify(
    rule: &NoveltyRule,
    breaches: &[TierBreach],
    recent: &[DailyBar],
    baseline_mean: f64,
    today_ratio: f64,
) -> NoveltyOutcome {
    let recent_max_ratio = recent
        .iter()
        .map(|bar| bar.volume / baseline_mean)
        .fold(0.0, f64::max);

    match rule {
        NoveltyRule::TierModes(config) => {
            let strict = breaches.iter().find(|b| b.tier == config.strict_tier);
            let loose = breaches.iter().find(|b| b.tier == config.loose_tier);

            let mut modes = Vec::new();
            if config.strict_enabled && strict.is_some_and(|b| b.long_count == 0) {
                modes.push(BreakoutMode::Strict);
            }
            if config.recent_breakthrough_enabled && strict.is_some_and(|b| b.recent_count == 0) {
                modes.push(BreakoutMode::RecentBreakthrough);
            }
            if config.loose_enabled
                && loose.is_some_and(|b| b.long_count <= config.max_loose_days)
                && strict.is_some_and(|b| b.recent_count <= config.max_recent_strict_days)
            {
                modes.push(BreakoutMode::Loose);
            }

            NoveltyOutcome {
                modes,
                similar_day_count: None,
                recent_max_ratio,
            }
        }
        NoveltyRule::SimilarDay(config) => {
            let cutoff = today_ratio * config.fraction;
            let similar = recent
                .iter()
                .filter(|bar| bar.volume / baseline_mean >= cutoff)
                .count();

            let modes = if similar <= config.max_similar_days {
                vec![BreakoutMode::FirstSurge]
            } else {
                Vec::new()
            };

            NoveltyOutcome {
                modes,
                similar_day_count: Some(similar),
                recent_max_ratio,
            }
        }
    }
}
