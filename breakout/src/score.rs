use serde::{Deserialize, Serialize};

use crate::classify::NoveltyOutcome;
use crate::constant::BreakoutMode;

/// An inclusive score band: `min <= value <= max` earns `score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
    pub score: f64,
}

impl Band {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Magnitude/change fit curves. `Banded` is stepped, not smooth; the ideal
/// band is checked first, then the wider acceptable band, then the
/// fallback. `CappedLinear` is `min(cap, value * scale)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCurve {
    Banded {
        ideal: Band,
        acceptable: Band,
        fallback: f64,
    },
    CappedLinear {
        scale: f64,
        cap: f64,
    },
}

impl ScoreCurve {
    pub fn score(&self, value: f64) -> f64 {
        match self {
            Self::Banded {
                ideal,
                acceptable,
                fallback,
            } => {
                if ideal.contains(value) {
                    ideal.score
                } else if acceptable.contains(value) {
                    acceptable.score
                } else {
                    *fallback
                }
            }
            Self::CappedLinear { scale, cap } => (value * scale).min(*cap),
        }
    }
}

/// Flat bonuses awarded per passing mode under the tier formulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeBonuses {
    pub strict: f64,
    pub recent_breakthrough: f64,
    pub loose: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreConfig {
    pub stability_base: f64,
    pub stability_cv_penalty: f64,
    pub novelty_base: f64,
    pub novelty_similar_penalty: f64,
    pub novelty_peak_bonus: f64,
    pub mode_bonuses: ModeBonuses,
    pub magnitude: ScoreCurve,
    pub change: ScoreCurve,
    pub score_threshold: f64,
}

/// All four sub-scores and the total are retained on the detection so
/// batch runs can be dissected afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub stability: f64,
    pub novelty: f64,
    pub magnitude: f64,
    pub change: f64,
    pub total: f64,
}

pub fn score(
    config: &ScoreConfig,
    cv: f64,
    outcome: &NoveltyOutcome,
    today_ratio: f64,
    change_pct: f64,
) -> ScoreBreakdown {
    // Flatter history scores higher, floored so a wild baseline cannot
    // drag the total negative.
    let stability = (config.stability_base - cv * config.stability_cv_penalty).max(0.0);

    let novelty = match outcome.similar_day_count {
        Some(similar_days) => {
            let base = config.novelty_base - similar_days as f64 * config.novelty_similar_penalty;
            let peak = if today_ratio > 0.0 && config.novelty_peak_bonus > 0.0 {
                (config.novelty_peak_bonus
                    - (outcome.recent_max_ratio / today_ratio) * config.novelty_peak_bonus)
                    .max(0.0)
            } else {
                0.0
            };
            base + peak
        }
        None => outcome
            .modes
            .iter()
            .map(|mode| match mode {
                BreakoutMode::Strict => config.mode_bonuses.strict,
                BreakoutMode::RecentBreakthrough => config.mode_bonuses.recent_breakthrough,
                BreakoutMode::Loose => config.mode_bonuses.loose,
                BreakoutMode::FirstSurge => 0.0,
            })
            .sum(),
    };

    let magnitude = config.magnitude.score(today_ratio);
    let change = config.change.score(change_pct);
    let total = stability + novelty + magnitude + change;

    ScoreBreakdown {
        stability,
        novelty,
        magnitude,
        change,
        total,
    }
}
