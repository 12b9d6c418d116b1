use serde::Serialize;

use crate::bar::DailyBar;
use crate::constant::RejectReason;

/// Volume statistics over the stable window, computed after dropping
/// non-positive-volume days (halts, bad feed rows).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineStats {
    pub mean: f64,
    pub stdev: f64,
    pub cv: f64,
    pub max: f64,
    pub min: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineConfig {
    pub min_avg_volume: f64,
    pub max_cv: f64,
    pub min_valid_fraction: f64,
}

/// Computes baseline statistics from the stable window. Fails with
/// `InsufficientStableSamples` when fewer than
/// `ceil(stable_days * min_valid_fraction)` positive-volume days survive
/// the filter.
pub fn compute(
    stable: &[DailyBar],
    stable_days: usize,
    min_valid_fraction: f64,
) -> Result<BaselineStats, RejectReason> {
    let volumes: Vec<f64> = stable
        .iter()
        .map(|bar| bar.volume)
        .filter(|volume| *volume > 0.0)
        .collect();

    let min_samples = (stable_days as f64 * min_valid_fraction).ceil() as usize;
    if volumes.is_empty() || volumes.len() < min_samples {
        return Err(RejectReason::InsufficientStableSamples);
    }

    let count = volumes.len() as f64;
    let mean = volumes.iter().sum::<f64>() / count;

    // Sample standard deviation; a single sample carries no spread.
    let stdev = if volumes.len() > 1 {
        let sum_sq = volumes
            .iter()
            .map(|volume| (volume - mean) * (volume - mean))
            .sum::<f64>();
        (sum_sq / (count - 1.0)).sqrt()
    } else {
        0.0
    };

    let cv = if mean > 0.0 { stdev / mean } else { f64::INFINITY };
    let max = volumes.iter().copied().fold(f64::MIN, f64::max);
    let min = volumes.iter().copied().fold(f64::MAX, f64::min);

    Ok(BaselineStats {
        mean,
        stdev,
        cv,
        max,
        min,
        samples: volumes.len(),
    })
}

/// Validates a computed baseline against the configured floor and
/// stability ceiling. The two failures stay distinct: a thin baseline and
/// an unstable baseline are different diagnoses.
pub fn validate(stats: &BaselineStats, config: &BaselineConfig) -> Result<(), RejectReason> {
    if stats.mean < config.min_avg_volume {
        return Err(RejectReason::BaselineTooThin);
    }
    if stats.cv > config.max_cv {
        return Err(RejectReason::BaselineUnstable);
    }
    Ok(())
}
