use crate::bar::DailyBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    pub stable_days: usize,
    pub recent_days: usize,
}

/// The two disjoint lookback windows carved out of the pre-today history:
/// `stable` is the quiet baseline, `recent` the short novelty lookback.
#[derive(Debug, Clone, Copy)]
pub struct Windows<'a> {
    pub stable: &'a [DailyBar],
    pub recent: &'a [DailyBar],
}

/// Splits `history` (oldest first, today already excluded) into the stable
/// and recent windows. Returns `None` when fewer than
/// `stable_days + recent_days` bars are available.
pub fn partition(history: &[DailyBar], spec: WindowSpec) -> Option<Windows<'_>> {
    let need = spec.stable_days + spec.recent_days;
    if spec.stable_days == 0 || spec.recent_days == 0 || history.len() < need {
        return None;
    }

    let recent_start = history.len() - spec.recent_days;
    let stable_start = recent_start - spec.stable_days;

    Some(Windows {
        stable: &history[stable_start..recent_start],
        recent: &history[recent_start..],
    })
}
