use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use breakout::DailyBar;

use crate::error::FeedError;
use crate::provider::BarProvider;

#[derive(Debug, Deserialize)]
struct CsvBarRow {
	#[serde(alias = "trade_date")]
	date: String,
	#[serde(default)]
	open: f64,
	#[serde(default)]
	high: f64,
	#[serde(default)]
	low: f64,
	close: f64,
	#[serde(alias = "vol")]
	volume: f64,
	#[serde(default, alias = "pct_chg")]
	change_pct: Option<f64>,
}

/// 以目录为单位的 CSV 日线仓库：每个标的对应 `<symbol>.csv`，列为
/// date/open/high/low/close/volume，涨跌幅缺失时由相邻收盘价推导。
#[derive(Debug, Clone)]
pub struct CsvBarStore {
	dir: PathBuf,
}

impl CsvBarStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	pub fn symbols(&self) -> Result<Vec<String>, FeedError> {
		let entries = fs::read_dir(&self.dir)
			.map_err(|err| FeedError::Unavailable(err.to_string()))?;

		let mut out = Vec::new();
		for entry in entries {
			let entry = entry.map_err(|err| FeedError::Unavailable(err.to_string()))?;
			let path = entry.path();
			if path.extension().and_then(|x| x.to_str()) == Some("csv") {
				if let Some(stem) = path.file_stem().and_then(|x| x.to_str()) {
					out.push(stem.to_string());
				}
			}
		}
		out.sort();
		Ok(out)
	}

	fn symbol_path(&self, symbol: &str) -> PathBuf {
		self.dir.join(format!("{}.csv", symbol))
	}
}

impl BarProvider for CsvBarStore {
	fn daily_bars(&self, symbol: &str, days: usize) -> Result<Vec<DailyBar>, FeedError> {
		let path = self.symbol_path(symbol);
		let bars = load_daily_bars(&path, symbol)?;
		debug!(symbol, total = bars.len(), requested = days, "loaded csv history");
		let start = bars.len().saturating_sub(days);
		Ok(bars[start..].to_vec())
	}
}

fn load_daily_bars(path: &Path, symbol: &str) -> Result<Vec<DailyBar>, FeedError> {
	let mut reader = match csv::Reader::from_path(path) {
		Ok(reader) => reader,
		Err(err) => {
			return Err(match err.kind() {
				csv::ErrorKind::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound => {
					FeedError::NotFound(symbol.to_string())
				}
				_ => FeedError::Malformed(err.to_string()),
			});
		}
	};

	let mut out: Vec<DailyBar> = Vec::new();
	for row in reader.deserialize::<CsvBarRow>() {
		let row = row?;
		let date = parse_date(&row.date)?;
		let change_pct = match row.change_pct {
			Some(pct) => pct,
			None => derive_change_pct(out.last(), row.close),
		};
		out.push(DailyBar {
			date,
			open: row.open,
			high: row.high,
			low: row.low,
			close: row.close,
			volume: row.volume,
			change_pct,
		});
	}

	out.sort_by_key(|bar| bar.date);
	Ok(out)
}

fn derive_change_pct(prev: Option<&DailyBar>, close: f64) -> f64 {
	match prev {
		Some(prev) if prev.close > 0.0 => (close - prev.close) / prev.close * 100.0,
		_ => 0.0,
	}
}

fn parse_date(value: &str) -> Result<NaiveDate, FeedError> {
	let patterns = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];
	for pattern in patterns {
		if let Ok(date) = NaiveDate::parse_from_str(value, pattern) {
			return Ok(date);
		}
	}
	Err(FeedError::Malformed(format!("invalid date: {}", value)))
}
