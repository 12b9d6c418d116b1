use breakout::Detection;

/// 按总分降序排序；总分相同按标的代码升序，保证输出全序、可复现。
pub fn sort_detections(detections: &mut [Detection]) {
	detections.sort_by(|a, b| {
		b.scores
			.total
			.total_cmp(&a.scores.total)
			.then_with(|| a.symbol.cmp(&b.symbol))
	});
}

#[cfg(test)]
mod tests {
	use super::*;
	use breakout::{BaselineStats, ScoreBreakdown, TodayStats};

	fn detection(symbol: &str, total: f64) -> Detection {
		Detection {
			symbol: symbol.to_string(),
			today: TodayStats {
				price: 10.0,
				change_pct: 2.0,
				volume: 20.0,
				volume_ratio: 2.0,
			},
			baseline: BaselineStats {
				mean: 10.0,
				stdev: 1.0,
				cv: 0.1,
				max: 12.0,
				min: 8.0,
				samples: 20,
			},
			breaches: Vec::new(),
			modes: Vec::new(),
			similar_day_count: None,
			recent_max_ratio: 1.0,
			scores: ScoreBreakdown {
				stability: 0.0,
				novelty: 0.0,
				magnitude: 0.0,
				change: 0.0,
				total,
			},
		}
	}

	#[test]
	fn orders_by_total_descending() {
		let mut list = vec![detection("b", 60.0), detection("a", 80.0)];
		sort_detections(&mut list);
		assert_eq!(list[0].symbol, "a");
		assert_eq!(list[1].symbol, "b");
	}

	#[test]
	fn ties_break_on_symbol_ascending() {
		let mut list = vec![detection("b", 70.0), detection("a", 70.0), detection("c", 70.0)];
		sort_detections(&mut list);
		let symbols: Vec<&str> = list.iter().map(|d| d.symbol.as_str()).collect();
		assert_eq!(symbols, vec!["a", "b", "c"]);
	}

	#[test]
	fn sorting_is_idempotent() {
		let mut once = vec![detection("b", 70.0), detection("a", 90.0), detection("c", 70.0)];
		sort_detections(&mut once);
		let mut twice = once.clone();
		sort_detections(&mut twice);
		assert_eq!(once, twice);
	}
}
