use std::fs;

use tracing::{error, info};

use breakout::{BreakoutEngine, EngineConfig, EngineConfigPatch};
use market::CsvBarStore;
use scanner::{ScanConfig, ScanJob, Scanner};

fn main() {
	breakout::init_logging();

	if let Err(err) = run() {
		error!(%err, "scan failed");
		std::process::exit(1);
	}
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
	let preset = std::env::var("SCAN_PRESET").unwrap_or_else(|_| "moderate".to_string());
	let data_dir = std::env::var("SCAN_DATA_DIR").unwrap_or_else(|_| "data".to_string());
	let out_path = std::env::var("SCAN_OUT").unwrap_or_else(|_| "detections.json".to_string());
	let workers = std::env::var("SCAN_WORKERS")
		.ok()
		.and_then(|raw| raw.parse::<usize>().ok())
		.unwrap_or(3);

	let mut config = EngineConfig::preset(&preset)
		.ok_or_else(|| format!("unknown preset: {}", preset))?;
	if let Ok(patch_path) = std::env::var("SCAN_CONFIG") {
		let raw = fs::read_to_string(&patch_path)?;
		let patch: EngineConfigPatch = serde_yaml::from_str(&raw)?;
		config = config.apply_patch(patch);
	}

	let engine = BreakoutEngine::new(config)?;
	let scanner = Scanner::new(
		engine,
		ScanConfig {
			workers,
			progress_every: 50,
		},
	);

	let store = CsvBarStore::new(&data_dir);
	let symbols = store.symbols()?;
	info!(
		preset = preset.as_str(),
		data_dir = data_dir.as_str(),
		workers,
		symbols = symbols.len(),
		"scan starting"
	);

	let jobs: Vec<ScanJob> = symbols.into_iter().map(ScanJob::new).collect();
	let report = scanner.scan(&store, jobs);

	for detection in report.detections.iter().take(10) {
		info!(
			symbol = detection.symbol.as_str(),
			total = detection.scores.total,
			ratio = detection.today.volume_ratio,
			change = detection.today.change_pct,
			"detection"
		);
	}

	if !report.detections.is_empty() {
		let frame = breakout::detections_dataframe(&report.detections);
		println!("{}", frame);
	}

	let json = serde_json::to_string_pretty(&report.detections)?;
	fs::write(&out_path, json)?;
	info!(
		accepted = report.detections.len(),
		rejected = report.rejections.len(),
		out = out_path.as_str(),
		"scan done"
	);

	Ok(())
}
