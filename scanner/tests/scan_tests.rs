use chrono::{Duration, NaiveDate};

use breakout::{
	BreakoutEngine, DailyBar, EngineConfig, RejectReason, Snapshot,
};
use market::MemoryProvider;
use scanner::{CancelToken, ScanConfig, ScanJob, Scanner};

fn day(offset: i64, close: f64, volume: f64, change_pct: f64) -> DailyBar {
	let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset);
	DailyBar {
		date,
		open: close,
		high: close * 1.02,
		low: close * 0.98,
		close,
		volume,
		change_pct,
	}
}

fn history(stable: f64, today: f64) -> Vec<DailyBar> {
	let mut bars: Vec<DailyBar> = (0..15)
		.map(|i| day(i, 10.0, stable, 2.0))
		.collect();
	bars.push(day(15, 10.0, today, 2.0));
	bars
}

fn test_config() -> EngineConfig {
	let mut config = EngineConfig::threshold_breakout();
	config.stable_days = 10;
	config.recent_days = 5;
	config.min_valid_fraction = 0.8;
	config.min_avg_volume = 1.0;
	config.max_cv = 0.5;
	config.min_price = 4.0;
	config.max_price = 40.0;
	config.min_change_pct = -100.0;
	config.max_change_pct = 100.0;
	config.min_today_volume = 0.0;
	config.min_volume_ratio = 1.5;
	config.max_volume_ratio = 10.0;
	config
}

fn scanner(workers: usize) -> Scanner {
	let engine = BreakoutEngine::new(test_config()).unwrap();
	Scanner::new(
		engine,
		ScanConfig {
			workers,
			progress_every: 0,
		},
	)
}

#[test]
fn ranking_is_stable_across_input_orders() {
	let mut provider = MemoryProvider::new();
	// Distinct ratios produce distinct totals under the capped linear fit.
	provider.insert_bars("600000", history(10.0, 20.0));
	provider.insert_bars("600001", history(10.0, 25.0));
	provider.insert_bars("600002", history(10.0, 30.0));

	let forward: Vec<ScanJob> = ["600000", "600001", "600002"]
		.into_iter()
		.map(ScanJob::new)
		.collect();
	let reverse: Vec<ScanJob> = ["600002", "600001", "600000"]
		.into_iter()
		.map(ScanJob::new)
		.collect();

	let scan = scanner(2);
	let a = scan.scan(&provider, forward);
	let b = scan.scan(&provider, reverse);

	let symbols_a: Vec<&str> = a.detections.iter().map(|d| d.symbol.as_str()).collect();
	let symbols_b: Vec<&str> = b.detections.iter().map(|d| d.symbol.as_str()).collect();
	assert_eq!(symbols_a, symbols_b);
	assert_eq!(symbols_a, vec!["600002", "600001", "600000"]);
}

#[test]
fn one_feed_failure_does_not_abort_the_batch() {
	let mut provider = MemoryProvider::new();
	provider.insert_bars("600000", history(10.0, 20.0));
	// "600001" is deliberately absent from the provider.

	let jobs = vec![ScanJob::new("600000"), ScanJob::new("600001")];
	let report = scanner(2).scan(&provider, jobs);

	assert_eq!(report.detections.len(), 1);
	assert_eq!(report.detections[0].symbol, "600000");

	let failed = report
		.rejections
		.iter()
		.find(|r| r.symbol == "600001")
		.expect("missing feed rejection");
	assert!(matches!(failed.reason, RejectReason::Feed(_)));
}

#[test]
fn every_symbol_lands_in_exactly_one_list() {
	let mut provider = MemoryProvider::new();
	provider.insert_bars("600000", history(10.0, 20.0));
	provider.insert_bars("600001", history(10.0, 11.0)); // ratio 1.1, rejected
	provider.insert_bars("600002", history(10.0, 25.0));

	let jobs: Vec<ScanJob> = ["600000", "600001", "600002", "600003"]
		.into_iter()
		.map(ScanJob::new)
		.collect();
	let report = scanner(3).scan(&provider, jobs);

	assert_eq!(report.processed, 4);
	assert_eq!(report.detections.len() + report.rejections.len(), 4);
	assert!(!report.cancelled);
}

#[test]
fn snapshot_prefilter_rejects_without_touching_the_feed() {
	// Empty provider: any history fetch would come back as a feed error.
	let provider = MemoryProvider::new();
	let snapshot = Snapshot::new("600000", 100.0, 2.0, 20.0);
	let jobs = vec![ScanJob::with_snapshot("600000", snapshot)];

	let report = scanner(1).scan(&provider, jobs);
	assert_eq!(report.rejections.len(), 1);
	assert_eq!(report.rejections[0].reason, RejectReason::PriceOutOfRange);
	assert_eq!(report.processed, 1);
}

#[test]
fn cancelled_scan_keeps_partial_results_usable() {
	let mut provider = MemoryProvider::new();
	provider.insert_bars("600000", history(10.0, 20.0));
	provider.insert_bars("600001", history(10.0, 25.0));

	let cancel = CancelToken::new();
	cancel.cancel();

	let jobs = vec![ScanJob::new("600000"), ScanJob::new("600001")];
	let report = scanner(1).scan_with_cancel(&provider, jobs, &cancel);

	assert!(report.cancelled);
	assert_eq!(report.processed, 0);
	assert!(report.detections.is_empty());
}

#[test]
fn fetch_days_covers_the_long_lookback_plus_padding() {
	let scan = scanner(1);
	// long_lookback 60 dominates the 16-day analytical minimum.
	assert_eq!(scan.fetch_days(), 61 + 10);
}
