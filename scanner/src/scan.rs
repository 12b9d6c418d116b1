use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, info};

use breakout::{
	BreakoutEngine, Const, Detection, Diagnostics, Evaluation, RejectReason, Rejection, Snapshot,
};
use market::{BarProvider, FeedError};

use crate::rank;

#[derive(Debug, Clone, Copy)]
pub struct ScanConfig {
	pub workers: usize,
	pub progress_every: usize,
}

impl Default for ScanConfig {
	fn default() -> Self {
		Self {
			workers: 3,
			progress_every: 50,
		}
	}
}

/// 协作式取消令牌。取消后不再分发新任务，已完成的结果全部保留。
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
	flag: Arc<AtomicBool>,
}

impl CancelToken {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.flag.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.flag.load(Ordering::SeqCst)
	}
}

#[derive(Debug, Clone)]
pub struct ScanJob {
	pub symbol: String,
	pub snapshot: Option<Snapshot>,
}

impl ScanJob {
	pub fn new(symbol: impl Into<String>) -> Self {
		Self {
			symbol: symbol.into(),
			snapshot: None,
		}
	}

	pub fn with_snapshot(symbol: impl Into<String>, snapshot: Snapshot) -> Self {
		Self {
			symbol: symbol.into(),
			snapshot: Some(snapshot),
		}
	}
}

/// 一次批量扫描的完整结果。`detections` 已按总分降序排好。
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
	pub detections: Vec<Detection>,
	pub rejections: Vec<Rejection>,
	pub processed: usize,
	pub cancelled: bool,
}

/// 批量扫描编排器：先用快照做零取数预筛，再把幸存标的按当日成交量
/// 降序分发给工作线程池。单个标的的取数失败只淘汰该标的。
pub struct Scanner {
	engine: BreakoutEngine,
	config: ScanConfig,
}

impl Scanner {
	pub fn new(engine: BreakoutEngine, config: ScanConfig) -> Self {
		Self { engine, config }
	}

	pub fn engine(&self) -> &BreakoutEngine {
		&self.engine
	}

	/// 单标的评估所需的取数天数：覆盖两个窗口加当日，也覆盖长回看
	/// 窗口，再加节假日与停牌的余量。
	pub fn fetch_days(&self) -> usize {
		let config = self.engine.config();
		self.engine
			.min_history_days()
			.max(config.long_lookback_days + 1)
			+ Const::HISTORY_PADDING_DAYS
	}

	pub fn scan<P>(&self, provider: &P, jobs: Vec<ScanJob>) -> ScanReport
	where
		P: BarProvider,
	{
		self.scan_with_cancel(provider, jobs, &CancelToken::new())
	}

	pub fn scan_with_cancel<P>(
		&self,
		provider: &P,
		jobs: Vec<ScanJob>,
		cancel: &CancelToken,
	) -> ScanReport
	where
		P: BarProvider,
	{
		let total = jobs.len();
		let mut rejections = Vec::new();
		let mut survivors = Vec::new();

		// 预筛只看快照，不触发任何历史取数。
		for job in jobs {
			match &job.snapshot {
				Some(snapshot) => match self.engine.prefilter(snapshot) {
					Ok(()) => survivors.push(job),
					Err(reason) => rejections.push(Rejection {
						symbol: job.symbol,
						reason,
						diagnostics: Diagnostics::default(),
					}),
				},
				None => survivors.push(job),
			}
		}

		// 当日放量最大的标的优先出结果。
		survivors.sort_by(|a, b| {
			let va = a.snapshot.as_ref().map(|s| s.today_volume).unwrap_or(0.0);
			let vb = b.snapshot.as_ref().map(|s| s.today_volume).unwrap_or(0.0);
			vb.total_cmp(&va).then_with(|| a.symbol.cmp(&b.symbol))
		});

		let prefiltered = rejections.len();
		let mut report = self.run_workers(provider, survivors, cancel);
		report.processed += prefiltered;
		report.rejections.extend(rejections);
		report.cancelled = cancel.is_cancelled();

		rank::sort_detections(&mut report.detections);
		info!(
			total,
			processed = report.processed,
			accepted = report.detections.len(),
			cancelled = report.cancelled,
			"scan finished"
		);
		report
	}

	fn run_workers<P>(&self, provider: &P, jobs: Vec<ScanJob>, cancel: &CancelToken) -> ScanReport
	where
		P: BarProvider,
	{
		let mut report = ScanReport::default();
		if jobs.is_empty() {
			return report;
		}

		let workers = self.config.workers.min(jobs.len()).max(1);
		let fetch_days = self.fetch_days();
		let processed = AtomicUsize::new(0);
		let started = Instant::now();

		let (job_tx, job_rx) = channel::unbounded::<ScanJob>();
		let (result_tx, result_rx) = channel::unbounded::<Evaluation>();
		for job in jobs {
			let _ = job_tx.send(job);
		}
		drop(job_tx);

		thread::scope(|scope| {
			for _ in 0..workers {
				let job_rx = job_rx.clone();
				let result_tx = result_tx.clone();
				let processed = &processed;
				scope.spawn(move || {
					self.worker_loop(
						provider, fetch_days, job_rx, result_tx, cancel, processed, started,
					);
				});
			}
			drop(result_tx);

			// 汇集线程独占结果列表，工作线程之间互不共享可变状态。
			for evaluation in result_rx {
				match evaluation {
					Evaluation::Accepted(detection) => report.detections.push(detection),
					Evaluation::Rejected(rejection) => report.rejections.push(rejection),
				}
			}
		});

		report.processed = processed.load(Ordering::SeqCst);
		report
	}

	fn worker_loop<P>(
		&self,
		provider: &P,
		fetch_days: usize,
		job_rx: Receiver<ScanJob>,
		result_tx: Sender<Evaluation>,
		cancel: &CancelToken,
		processed: &AtomicUsize,
		started: Instant,
	) where
		P: BarProvider,
	{
		while let Ok(job) = job_rx.recv() {
			if cancel.is_cancelled() {
				break;
			}

			let evaluation = self.evaluate_job(provider, fetch_days, &job);
			let done = processed.fetch_add(1, Ordering::SeqCst) + 1;
			if self.config.progress_every > 0 && done % self.config.progress_every == 0 {
				info!(
					processed = done,
					elapsed_secs = started.elapsed().as_secs_f64(),
					"scan progress"
				);
			}

			if result_tx.send(evaluation).is_err() {
				break;
			}
		}
	}

	fn evaluate_job<P>(&self, provider: &P, fetch_days: usize, job: &ScanJob) -> Evaluation
	where
		P: BarProvider,
	{
		let bars = match provider.daily_bars(&job.symbol, fetch_days) {
			Ok(bars) => bars,
			Err(err) => return feed_rejection(&job.symbol, err),
		};

		debug!(symbol = job.symbol.as_str(), bars = bars.len(), "evaluating symbol");
		self.engine.evaluate(&job.symbol, &bars, job.snapshot.as_ref())
	}
}

fn feed_rejection(symbol: &str, err: FeedError) -> Evaluation {
	Evaluation::Rejected(Rejection {
		symbol: symbol.to_string(),
		reason: RejectReason::Feed(err.to_string()),
		diagnostics: Diagnostics::default(),
	})
}
