use breakout::{
    BaselineStats, BreakoutMode, Detection, ScoreBreakdown, TodayStats, detections_dataframe,
};

fn detection(symbol: &str, ratio: f64, total: f64, modes: Vec<BreakoutMode>) -> Detection {
    Detection {
        symbol: symbol.to_string(),
        today: TodayStats {
            price: 10.0,
            change_pct: 2.0,
            volume: 9.5 * ratio,
            volume_ratio: ratio,
        },
        baseline: BaselineStats {
            mean: 9.5,
            stdev: 1.08,
            cv: 0.1137,
            max: 11.0,
            min: 8.0,
            samples: 10,
        },
        breaches: Vec::new(),
        modes,
        similar_day_count: None,
        recent_max_ratio: 1.16,
        scores: ScoreBreakdown {
            stability: 25.0,
            novelty: 40.0,
            magnitude: 20.0,
            change: 10.0,
            total,
        },
    }
}

#[test]
fn frame_carries_one_row_per_detection() {
    let detections = vec![
        detection("600519", 2.1, 95.0, vec![BreakoutMode::Strict]),
        detection(
            "000001",
            1.9,
            88.0,
            vec![BreakoutMode::RecentBreakthrough, BreakoutMode::Loose],
        ),
    ];

    let frame = detections_dataframe(&detections);
    assert_eq!(frame.height(), 2);

    let names = frame.get_column_names();
    for expected in [
        "symbol",
        "price",
        "change_pct",
        "volume",
        "volume_ratio",
        "baseline_mean",
        "baseline_cv",
        "modes",
        "stability_score",
        "novelty_score",
        "magnitude_score",
        "change_score",
        "total_score",
    ] {
        assert!(names.contains(&expected), "missing column {expected}");
    }

    let totals = frame.column("total_score").unwrap().f64().unwrap();
    assert_eq!(totals.get(0), Some(95.0));
    assert_eq!(totals.get(1), Some(88.0));

    let modes = frame.column("modes").unwrap().str().unwrap();
    assert_eq!(modes.get(0), Some("strict"));
    assert_eq!(modes.get(1), Some("recent_breakthrough|loose"));
}

#[test]
fn empty_detection_list_yields_an_empty_frame() {
    let frame = detections_dataframe(&[]);
    assert_eq!(frame.height(), 0);
    assert_eq!(frame.width(), 13);
}
