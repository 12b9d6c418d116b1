use polars::prelude::*;

use crate::detection::Detection;

/// Flattens a ranked detection list into a DataFrame for downstream
/// analysis. Column order mirrors the score breakdown.
pub fn detections_dataframe(detections: &[Detection]) -> DataFrame {
    let symbols: Vec<&str> = detections.iter().map(|x| x.symbol.as_str()).collect();
    let prices: Vec<f64> = detections.iter().map(|x| x.today.price).collect();
    let changes: Vec<f64> = detections.iter().map(|x| x.today.change_pct).collect();
    let volumes: Vec<f64> = detections.iter().map(|x| x.today.volume).collect();
    let ratios: Vec<f64> = detections.iter().map(|x| x.today.volume_ratio).collect();
    let means: Vec<f64> = detections.iter().map(|x| x.baseline.mean).collect();
    let cvs: Vec<f64> = detections.iter().map(|x| x.baseline.cv).collect();
    let modes: Vec<String> = detections
        .iter()
        .map(|x| {
            x.modes
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join("|")
        })
        .collect();
    let stability: Vec<f64> = detections.iter().map(|x| x.scores.stability).collect();
    let novelty: Vec<f64> = detections.iter().map(|x| x.scores.novelty).collect();
    let magnitude: Vec<f64> = detections.iter().map(|x| x.scores.magnitude).collect();
    let change_scores: Vec<f64> = detections.iter().map(|x| x.scores.change).collect();
    let totals: Vec<f64> = detections.iter().map(|x| x.scores.total).collect();

    df!(
        "symbol" => symbols,
        "price" => prices,
        "change_pct" => changes,
        "volume" => volumes,
        "volume_ratio" => ratios,
        "baseline_mean" => means,
        "baseline_cv" => cvs,
        "modes" => modes,
        "stability_score" => stability,
        "novelty_score" => novelty,
        "magnitude_score" => magnitude,
        "change_score" => change_scores,
        "total_score" => totals
    )
    .expect("failed to build detections dataframe")
}
