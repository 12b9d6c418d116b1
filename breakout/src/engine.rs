use tracing::debug;

use crate::bar::{DailyBar, Snapshot};
use crate::baseline::{self, BaselineConfig};
use crate::classify;
use crate::config::EngineConfig;
use crate::constant::RejectReason;
use crate::detection::{Detection, Diagnostics, Evaluation, Rejection, TodayStats};
use crate::score;
use crate::threshold;
use crate::window::{self, WindowSpec};

/// Deterministic single-symbol pipeline. All policy lives in the
/// [`EngineConfig`]; evaluating the same inputs twice yields identical
/// results, so the engine is freely shared across scan workers.
pub struct BreakoutEngine {
    config: EngineConfig,
}

impl BreakoutEngine {
    pub fn new(config: EngineConfig) -> Result<Self, crate::constant::ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Bars required for a full evaluation: both windows plus today.
    pub fn min_history_days(&self) -> usize {
        self.config.stable_days + self.config.recent_days + 1
    }

    /// Cheap range gates on today's figures, checked in a fixed order
    /// (price, then change, then volume) so rejection reasons are stable.
    /// Callers may run this before fetching any history.
    pub fn prefilter(&self, snapshot: &Snapshot) -> Result<(), RejectReason> {
        let c = &self.config;
        if snapshot.current_price < c.min_price || snapshot.current_price > c.max_price {
            return Err(RejectReason::PriceOutOfRange);
        }
        if snapshot.change_pct < c.min_change_pct || snapshot.change_pct > c.max_change_pct {
            return Err(RejectReason::ChangeOutOfRange);
        }
        if snapshot.today_volume < c.min_today_volume {
            return Err(RejectReason::VolumeOutOfRange);
        }
        Ok(())
    }

    /// Runs the full pipeline for one symbol. `bars` is the daily history,
    /// oldest first. With a live snapshot, a trailing bar carrying the
    /// snapshot's date is treated as a stale duplicate of today and
    /// dropped from the history; without a snapshot, the trailing bar
    /// itself is today.
    pub fn evaluate(
        &self,
        symbol: &str,
        bars: &[DailyBar],
        snapshot: Option<&Snapshot>,
    ) -> Evaluation {
        let c = &self.config;
        let mut diagnostics = Diagnostics::default();

        let (today, history): (Snapshot, &[DailyBar]) = match snapshot {
            Some(snap) => {
                let history = match (snap.date, bars.last()) {
                    (Some(date), Some(last)) if last.date == date => &bars[..bars.len() - 1],
                    _ => bars,
                };
                (snap.clone(), history)
            }
            None => match bars.last() {
                Some(last) => (
                    Snapshot::from_trailing_bar(symbol, last),
                    &bars[..bars.len() - 1],
                ),
                None => return self.reject(symbol, RejectReason::InsufficientHistory, diagnostics),
            },
        };

        if let Err(reason) = self.prefilter(&today) {
            diagnostics.today = Some(TodayStats {
                price: today.current_price,
                change_pct: today.change_pct,
                volume: today.today_volume,
                volume_ratio: 0.0,
            });
            return self.reject(symbol, reason, diagnostics);
        }

        let spec = WindowSpec {
            stable_days: c.stable_days,
            recent_days: c.recent_days,
        };
        let windows = match window::partition(history, spec) {
            Some(windows) => windows,
            None => return self.reject(symbol, RejectReason::InsufficientHistory, diagnostics),
        };

        let stats = match baseline::compute(windows.stable, c.stable_days, c.min_valid_fraction) {
            Ok(stats) => stats,
            Err(reason) => return self.reject(symbol, reason, diagnostics),
        };
        diagnostics.baseline = Some(stats.clone());

        let baseline_config = BaselineConfig {
            min_avg_volume: c.min_avg_volume,
            max_cv: c.max_cv,
            min_valid_fraction: c.min_valid_fraction,
        };
        if let Err(reason) = baseline::validate(&stats, &baseline_config) {
            return self.reject(symbol, reason, diagnostics);
        }

        let volume_ratio = today.today_volume / stats.mean;
        let today_stats = TodayStats {
            price: today.current_price,
            change_pct: today.change_pct,
            volume: today.today_volume,
            volume_ratio,
        };
        diagnostics.today = Some(today_stats.clone());

        if volume_ratio < c.min_volume_ratio || volume_ratio > c.max_volume_ratio {
            return self.reject(symbol, RejectReason::VolumeRatioOutOfRange, diagnostics);
        }

        let breaches = threshold::breach_counts(
            &c.tiers,
            today.today_volume,
            history,
            windows.recent,
            c.long_lookback_days,
        );
        diagnostics.breaches = Some(breaches.clone());

        let outcome = classify::classify(&c.novelty, &breaches, windows.recent, stats.mean, volume_ratio);
        if outcome.modes.is_empty() {
            return self.reject(symbol, RejectReason::NotFirstOccurrence, diagnostics);
        }

        let scores = score::score(&c.score, stats.cv, &outcome, volume_ratio, today.change_pct);
        diagnostics.scores = Some(scores.clone());
        if scores.total < c.score.score_threshold {
            return self.reject(symbol, RejectReason::ScoreBelowThreshold, diagnostics);
        }

        Evaluation::Accepted(Detection {
            symbol: symbol.to_string(),
            today: today_stats,
            baseline: stats,
            breaches,
            modes: outcome.modes,
            similar_day_count: outcome.similar_day_count,
            recent_max_ratio: outcome.recent_max_ratio,
            scores,
        })
    }

    fn reject(&self, symbol: &str, reason: RejectReason, diagnostics: Diagnostics) -> Evaluation {
        debug!(symbol, %reason, "symbol rejected");
        Evaluation::Rejected(Rejection {
            symbol: symbol.to_string(),
            reason,
            diagnostics,
        })
    }
}
