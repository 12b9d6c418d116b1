use std::collections::HashMap;
use std::thread;
use std::time::Duration as StdDuration;

use breakout::{DailyBar, Snapshot};

use crate::error::FeedError;

/// 日线历史数据源。实现方保证返回的序列按日期升序排列。
pub trait BarProvider: Send + Sync {
	fn daily_bars(&self, symbol: &str, days: usize) -> Result<Vec<DailyBar>, FeedError>;
}

/// 当日实时快照数据源。
pub trait SnapshotProvider: Send + Sync {
	fn snapshot(&self, symbol: &str) -> Result<Snapshot, FeedError>;

	/// 批量拉取，单个标的失败只缺席，不影响其余结果。
	fn snapshots(&self, symbols: &[String]) -> HashMap<String, Snapshot> {
		let mut out = HashMap::new();
		for symbol in symbols {
			if let Ok(snapshot) = self.snapshot(symbol) {
				out.insert(symbol.clone(), snapshot);
			}
		}
		out
	}
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
	pub initial_delay_ms: u64,
	pub max_delay_ms: u64,
	pub max_retries: u32,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			initial_delay_ms: 50,
			max_delay_ms: 2000,
			max_retries: 8,
		}
	}
}

fn compute_backoff_ms(policy: RetryPolicy, attempt: u32) -> u64 {
	let shift = attempt.saturating_sub(1).min(16);
	let backoff = policy.initial_delay_ms.saturating_mul(1u64 << shift);
	backoff.min(policy.max_delay_ms)
}

/// 在任意数据源外层包一层指数退避重试。仅对 `Unavailable` 类瞬时故障
/// 重试；`NotFound` 与 `Malformed` 是确定性错误，立即上抛。
pub struct RetryingProvider<P> {
	inner: P,
	policy: RetryPolicy,
}

impl<P> RetryingProvider<P> {
	pub fn new(inner: P, policy: RetryPolicy) -> Self {
		Self { inner, policy }
	}

	pub fn into_inner(self) -> P {
		self.inner
	}

	fn with_retries<T>(
		&self,
		mut call: impl FnMut() -> Result<T, FeedError>,
	) -> Result<T, FeedError> {
		let retries = self.policy.max_retries.max(1);
		let mut last = FeedError::Unavailable("retries exhausted".to_string());

		for attempt in 0..retries {
			if attempt > 0 {
				let backoff = compute_backoff_ms(self.policy, attempt);
				if backoff > 0 {
					thread::sleep(StdDuration::from_millis(backoff));
				}
			}

			match call() {
				Ok(value) => return Ok(value),
				Err(err @ FeedError::Unavailable(_)) => {
					last = err;
				}
				Err(err) => return Err(err),
			}
		}

		Err(last)
	}
}

impl<P: BarProvider> BarProvider for RetryingProvider<P> {
	fn daily_bars(&self, symbol: &str, days: usize) -> Result<Vec<DailyBar>, FeedError> {
		self.with_retries(|| self.inner.daily_bars(symbol, days))
	}
}

impl<P: SnapshotProvider> SnapshotProvider for RetryingProvider<P> {
	fn snapshot(&self, symbol: &str) -> Result<Snapshot, FeedError> {
		self.with_retries(|| self.inner.snapshot(symbol))
	}
}

/// 纯内存数据源，测试与回放场景使用。
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
	bars: HashMap<String, Vec<DailyBar>>,
	snapshots: HashMap<String, Snapshot>,
}

impl MemoryProvider {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert_bars(&mut self, symbol: impl Into<String>, bars: Vec<DailyBar>) {
		self.bars.insert(symbol.into(), bars);
	}

	pub fn insert_snapshot(&mut self, snapshot: Snapshot) {
		self.snapshots.insert(snapshot.symbol.clone(), snapshot);
	}

	pub fn symbols(&self) -> Vec<String> {
		let mut out: Vec<String> = self.bars.keys().cloned().collect();
		out.sort();
		out
	}
}

impl BarProvider for MemoryProvider {
	fn daily_bars(&self, symbol: &str, days: usize) -> Result<Vec<DailyBar>, FeedError> {
		let bars = self
			.bars
			.get(symbol)
			.ok_or_else(|| FeedError::NotFound(symbol.to_string()))?;
		let start = bars.len().saturating_sub(days);
		Ok(bars[start..].to_vec())
	}
}

impl SnapshotProvider for MemoryProvider {
	fn snapshot(&self, symbol: &str) -> Result<Snapshot, FeedError> {
		self.snapshots
			.get(symbol)
			.cloned()
			.ok_or_else(|| FeedError::NotFound(symbol.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicU32, Ordering};

	struct FlakyProvider {
		calls: AtomicU32,
		fail_times: u32,
	}

	impl BarProvider for FlakyProvider {
		fn daily_bars(&self, symbol: &str, _days: usize) -> Result<Vec<DailyBar>, FeedError> {
			let n = self.calls.fetch_add(1, Ordering::SeqCst);
			if n < self.fail_times {
				Err(FeedError::Unavailable("flaky".to_string()))
			} else {
				Err(FeedError::NotFound(symbol.to_string()))
			}
		}
	}

	fn fast_policy() -> RetryPolicy {
		RetryPolicy {
			initial_delay_ms: 0,
			max_delay_ms: 0,
			max_retries: 4,
		}
	}

	#[test]
	fn retries_unavailable_then_surfaces_terminal_error() {
		let flaky = FlakyProvider {
			calls: AtomicU32::new(0),
			fail_times: 2,
		};
		let provider = RetryingProvider::new(flaky, fast_policy());

		let err = provider.daily_bars("600000", 30).unwrap_err();
		assert!(matches!(err, FeedError::NotFound(_)));
		assert_eq!(provider.into_inner().calls.load(Ordering::SeqCst), 3);
	}

	#[test]
	fn not_found_is_not_retried() {
		let flaky = FlakyProvider {
			calls: AtomicU32::new(0),
			fail_times: 0,
		};
		let provider = RetryingProvider::new(flaky, fast_policy());

		let err = provider.daily_bars("600000", 30).unwrap_err();
		assert!(matches!(err, FeedError::NotFound(_)));
		assert_eq!(provider.into_inner().calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn exhausted_retries_return_unavailable() {
		let flaky = FlakyProvider {
			calls: AtomicU32::new(0),
			fail_times: 100,
		};
		let provider = RetryingProvider::new(flaky, fast_policy());

		let err = provider.daily_bars("600000", 30).unwrap_err();
		assert!(matches!(err, FeedError::Unavailable(_)));
	}

	#[test]
	fn memory_provider_serves_bars_and_snapshots() {
		let mut provider = MemoryProvider::new();
		provider.insert_snapshot(Snapshot::new("600000", 10.0, 2.0, 20.0));
		assert!(provider.snapshot("600000").is_ok());
		assert!(matches!(
			provider.snapshot("600001"),
			Err(FeedError::NotFound(_))
		));
	}

	#[test]
	fn batch_snapshots_return_partial_results() {
		let mut provider = MemoryProvider::new();
		provider.insert_snapshot(Snapshot::new("600000", 10.0, 2.0, 20.0));

		let universe = vec!["600000".to_string(), "600001".to_string()];
		let snapshots = provider.snapshots(&universe);
		assert_eq!(snapshots.len(), 1);
		assert!(snapshots.contains_key("600000"));
	}

	#[test]
	fn backoff_is_capped() {
		let policy = RetryPolicy {
			initial_delay_ms: 50,
			max_delay_ms: 2000,
			max_retries: 12,
		};
		assert_eq!(compute_backoff_ms(policy, 1), 50);
		assert_eq!(compute_backoff_ms(policy, 2), 100);
		assert_eq!(compute_backoff_ms(policy, 11), 2000);
	}
}
