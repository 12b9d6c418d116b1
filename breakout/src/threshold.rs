use serde::{Deserialize, Serialize};

use crate::bar::DailyBar;

/// A named fraction of today's volume used as a bar for "did history ever
/// get close to today". Fractions live in (0,1); the thresholds are
/// intentionally relative to today's volume, not the baseline mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTier {
    pub name: String,
    pub fraction: f64,
}

impl ThresholdTier {
    pub fn new(name: impl Into<String>, fraction: f64) -> Self {
        Self {
            name: name.into(),
            fraction,
        }
    }
}

/// Breach counts for one tier over the long lookback and the recent window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierBreach {
    pub tier: String,
    pub fraction: f64,
    pub threshold: f64,
    pub long_count: usize,
    pub recent_count: usize,
}

/// Pure counting, no pass/fail policy. A day breaches a tier only when its
/// volume is strictly greater than the threshold; exact equality does not
/// count. `history` is the full pre-today sequence, bounded here to the
/// trailing `long_lookback_days`.
pub fn breach_counts(
    tiers: &[ThresholdTier],
    today_volume: f64,
    history: &[DailyBar],
    recent: &[DailyBar],
    long_lookback_days: usize,
) -> Vec<TierBreach> {
    let long_start = history.len().saturating_sub(long_lookback_days);
    let long = &history[long_start..];

    tiers
        .iter()
        .map(|tier| {
            let threshold = today_volume * tier.fraction;
            TierBreach {
                tier: tier.name.clone(),
                fraction: tier.fraction,
                threshold,
                long_count: long.iter().filter(|bar| bar.volume > threshold).count(),
                recent_count: recent.iter().filter(|bar| bar.volume > threshold).count(),
            }
        })
        .collect()
}
