use chrono::NaiveDate;
use serde::Serialize;

/// One trading day of an instrument. Volume is normalized to the feed's
/// fixed unit (10k-share lots in the upstream feed); `change_pct` is the
/// close-over-prior-close move in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub change_pct: f64,
}

/// The still-forming "today" bar from the live feed. `date` is optional:
/// when present and equal to the trailing history bar's date, that bar is
/// excluded from every window so today never contaminates its own baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub symbol: String,
    pub current_price: f64,
    pub change_pct: f64,
    pub today_volume: f64,
    pub date: Option<NaiveDate>,
}

impl Snapshot {
    pub fn new(symbol: impl Into<String>, current_price: f64, change_pct: f64, today_volume: f64) -> Self {
        Self {
            symbol: symbol.into(),
            current_price,
            change_pct,
            today_volume,
            date: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Today synthesized from the trailing bar of a history that already
    /// contains it.
    pub fn from_trailing_bar(symbol: impl Into<String>, bar: &DailyBar) -> Self {
        Self {
            symbol: symbol.into(),
            current_price: bar.close,
            change_pct: bar.change_pct,
            today_volume: bar.volume,
            date: Some(bar.date),
        }
    }
}
