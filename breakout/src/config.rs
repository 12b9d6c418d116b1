use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::classify::{NoveltyRule, SimilarDayConfig, TierModeConfig};
use crate::constant::ConfigError;
use crate::score::{Band, ModeBonuses, ScoreConfig, ScoreCurve};
use crate::threshold::ThresholdTier;

/// Full engine configuration. Each historical strategy variant is a named
/// preset over this one type, never a code fork.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub stable_days: usize,
    pub recent_days: usize,
    pub long_lookback_days: usize,
    pub min_valid_fraction: f64,

    pub min_avg_volume: f64,
    pub max_cv: f64,

    pub min_price: f64,
    pub max_price: f64,
    pub min_change_pct: f64,
    pub max_change_pct: f64,
    pub min_today_volume: f64,

    pub min_volume_ratio: f64,
    pub max_volume_ratio: f64,

    pub tiers: Vec<ThresholdTier>,
    pub novelty: NoveltyRule,
    pub score: ScoreConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::moderate()
    }
}

impl EngineConfig {
    /// The mild first-surge preset: a long quiet baseline, a moderate
    /// surge band, and the ratio-to-baseline similar-day rule at 80%.
    pub fn moderate() -> Self {
        Self {
            stable_days: 20,
            recent_days: 15,
            long_lookback_days: 60,
            min_valid_fraction: 0.75,

            min_avg_volume: 8.0,
            max_cv: 0.75,

            min_price: 4.0,
            max_price: 40.0,
            min_change_pct: 1.0,
            max_change_pct: 8.0,
            min_today_volume: 8.0,

            min_volume_ratio: 1.8,
            max_volume_ratio: 4.0,

            tiers: default_tiers(),
            novelty: NoveltyRule::SimilarDay(SimilarDayConfig {
                fraction: 0.8,
                max_similar_days: 1,
            }),
            score: ScoreConfig {
                stability_base: 30.0,
                stability_cv_penalty: 40.0,
                novelty_base: 40.0,
                novelty_similar_penalty: 15.0,
                novelty_peak_bonus: 10.0,
                mode_bonuses: default_mode_bonuses(),
                magnitude: ScoreCurve::Banded {
                    ideal: Band {
                        min: 1.8,
                        max: 2.5,
                        score: 20.0,
                    },
                    acceptable: Band {
                        min: 1.5,
                        max: 3.5,
                        score: 15.0,
                    },
                    fallback: 10.0,
                },
                change: ScoreCurve::Banded {
                    ideal: Band {
                        min: 1.5,
                        max: 4.0,
                        score: 10.0,
                    },
                    acceptable: Band {
                        min: 1.0,
                        max: 6.0,
                        score: 7.0,
                    },
                    fallback: 5.0,
                },
                score_threshold: 60.0,
            },
        }
    }

    /// Loosened variant: shorter baseline, wide admissible ranges, the
    /// similar-day rule at 70% with more tolerance, no peak bonus.
    pub fn relaxed() -> Self {
        Self {
            stable_days: 10,
            recent_days: 20,
            long_lookback_days: 60,
            min_valid_fraction: 0.8,

            min_avg_volume: 0.8,
            max_cv: 2.8,

            min_price: 3.0,
            max_price: 150.0,
            min_change_pct: 0.2,
            max_change_pct: 30.0,
            min_today_volume: 0.8,

            min_volume_ratio: 1.1,
            max_volume_ratio: 10.0,

            tiers: default_tiers(),
            novelty: NoveltyRule::SimilarDay(SimilarDayConfig {
                fraction: 0.7,
                max_similar_days: 3,
            }),
            score: ScoreConfig {
                stability_base: 40.0,
                stability_cv_penalty: 45.0,
                novelty_base: 30.0,
                novelty_similar_penalty: 10.0,
                novelty_peak_bonus: 0.0,
                mode_bonuses: default_mode_bonuses(),
                magnitude: ScoreCurve::Banded {
                    ideal: Band {
                        min: 1.5,
                        max: 2.5,
                        score: 20.0,
                    },
                    acceptable: Band {
                        min: 1.2,
                        max: 4.0,
                        score: 15.0,
                    },
                    fallback: 10.0,
                },
                change: ScoreCurve::Banded {
                    ideal: Band {
                        min: 1.0,
                        max: 5.0,
                        score: 10.0,
                    },
                    acceptable: Band {
                        min: 0.5,
                        max: 8.0,
                        score: 7.0,
                    },
                    fallback: 5.0,
                },
                score_threshold: 50.0,
            },
        }
    }

    /// Tier-threshold variant: strict/loose/recent-breakthrough modes over
    /// fractions of today's volume, flat mode bonuses, capped linear
    /// magnitude and change fits, ranking only (no score floor).
    pub fn threshold_breakout() -> Self {
        Self {
            stable_days: 20,
            recent_days: 15,
            long_lookback_days: 60,
            min_valid_fraction: 0.8,

            min_avg_volume: 0.0,
            max_cv: f64::INFINITY,

            min_price: 0.0,
            max_price: f64::INFINITY,
            min_change_pct: 0.3,
            max_change_pct: f64::INFINITY,
            min_today_volume: 5.0,

            min_volume_ratio: 0.0,
            max_volume_ratio: f64::INFINITY,

            tiers: default_tiers(),
            novelty: NoveltyRule::TierModes(TierModeConfig {
                strict_enabled: true,
                loose_enabled: true,
                recent_breakthrough_enabled: true,
                strict_tier: "strict".to_string(),
                loose_tier: "loose".to_string(),
                max_loose_days: 2,
                max_recent_strict_days: 1,
            }),
            score: ScoreConfig {
                stability_base: 0.0,
                stability_cv_penalty: 0.0,
                novelty_base: 0.0,
                novelty_similar_penalty: 0.0,
                novelty_peak_bonus: 0.0,
                mode_bonuses: default_mode_bonuses(),
                magnitude: ScoreCurve::CappedLinear {
                    scale: 10.0,
                    cap: 30.0,
                },
                change: ScoreCurve::CappedLinear {
                    scale: 5.0,
                    cap: 20.0,
                },
                score_threshold: 0.0,
            },
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "moderate" => Some(Self::moderate()),
            "relaxed" => Some(Self::relaxed()),
            "threshold_breakout" => Some(Self::threshold_breakout()),
            _ => None,
        }
    }

    pub fn apply_patch(mut self, patch: EngineConfigPatch) -> Self {
        if let Some(v) = patch.stable_days {
            self.stable_days = v;
        }
        if let Some(v) = patch.recent_days {
            self.recent_days = v;
        }
        if let Some(v) = patch.long_lookback_days {
            self.long_lookback_days = v;
        }
        if let Some(v) = patch.min_valid_fraction {
            self.min_valid_fraction = v;
        }
        if let Some(v) = patch.min_avg_volume {
            self.min_avg_volume = v;
        }
        if let Some(v) = patch.max_cv {
            self.max_cv = v;
        }
        if let Some(v) = patch.min_price {
            self.min_price = v;
        }
        if let Some(v) = patch.max_price {
            self.max_price = v;
        }
        if let Some(v) = patch.min_change_pct {
            self.min_change_pct = v;
        }
        if let Some(v) = patch.max_change_pct {
            self.max_change_pct = v;
        }
        if let Some(v) = patch.min_today_volume {
            self.min_today_volume = v;
        }
        if let Some(v) = patch.min_volume_ratio {
            self.min_volume_ratio = v;
        }
        if let Some(v) = patch.max_volume_ratio {
            self.max_volume_ratio = v;
        }
        if let Some(v) = patch.tiers {
            self.tiers = v;
        }
        if let Some(v) = patch.novelty {
            self.novelty = v;
        }

        let score = patch.score;
        if let Some(v) = score.stability_base {
            self.score.stability_base = v;
        }
        if let Some(v) = score.stability_cv_penalty {
            self.score.stability_cv_penalty = v;
        }
        if let Some(v) = score.novelty_base {
            self.score.novelty_base = v;
        }
        if let Some(v) = score.novelty_similar_penalty {
            self.score.novelty_similar_penalty = v;
        }
        if let Some(v) = score.novelty_peak_bonus {
            self.score.novelty_peak_bonus = v;
        }
        if let Some(v) = score.mode_bonuses {
            self.score.mode_bonuses = v;
        }
        if let Some(v) = score.magnitude {
            self.score.magnitude = v;
        }
        if let Some(v) = score.change {
            self.score.change = v;
        }
        if let Some(v) = score.score_threshold {
            self.score.score_threshold = v;
        }

        self
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let patch: EngineConfigPatch = serde_yaml::from_str(yaml)?;
        Ok(Self::default().apply_patch(patch))
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&raw)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stable_days == 0 {
            return Err(ConfigError::InvalidWindow("stable_days must be > 0".to_string()));
        }
        if self.recent_days == 0 {
            return Err(ConfigError::InvalidWindow("recent_days must be > 0".to_string()));
        }
        if self.long_lookback_days < self.recent_days {
            return Err(ConfigError::InvalidWindow(
                "long_lookback_days must cover the recent window".to_string(),
            ));
        }
        if !(self.min_valid_fraction > 0.0 && self.min_valid_fraction <= 1.0) {
            return Err(ConfigError::InvalidFraction(format!(
                "min_valid_fraction {} outside (0, 1]",
                self.min_valid_fraction
            )));
        }
        if self.min_price > self.max_price {
            return Err(ConfigError::InvalidBand("price range inverted".to_string()));
        }
        if self.min_change_pct > self.max_change_pct {
            return Err(ConfigError::InvalidBand("change range inverted".to_string()));
        }
        if self.min_volume_ratio > self.max_volume_ratio {
            return Err(ConfigError::InvalidBand("volume ratio range inverted".to_string()));
        }
        if self.min_today_volume < 0.0 || self.min_avg_volume < 0.0 {
            return Err(ConfigError::InvalidBand("volume floors must be >= 0".to_string()));
        }

        if self.tiers.is_empty() {
            return Err(ConfigError::EmptyTierSet);
        }
        for tier in &self.tiers {
            if !(tier.fraction > 0.0 && tier.fraction < 1.0) {
                return Err(ConfigError::InvalidFraction(format!(
                    "tier {} fraction {} outside (0, 1)",
                    tier.name, tier.fraction
                )));
            }
        }

        match &self.novelty {
            NoveltyRule::TierModes(modes) => {
                for name in [&modes.strict_tier, &modes.loose_tier] {
                    if !self.tiers.iter().any(|tier| &tier.name == name) {
                        return Err(ConfigError::UnknownTier(name.clone()));
                    }
                }
            }
            NoveltyRule::SimilarDay(similar) => {
                if !(similar.fraction > 0.0 && similar.fraction < 1.0) {
                    return Err(ConfigError::InvalidFraction(format!(
                        "similar-day fraction {} outside (0, 1)",
                        similar.fraction
                    )));
                }
            }
        }

        for curve in [&self.score.magnitude, &self.score.change] {
            if let ScoreCurve::Banded { ideal, acceptable, .. } = curve {
                if ideal.min > ideal.max || acceptable.min > acceptable.max {
                    return Err(ConfigError::InvalidBand("score band inverted".to_string()));
                }
            }
        }

        Ok(())
    }
}

fn default_tiers() -> Vec<ThresholdTier> {
    vec![
        ThresholdTier::new("strict", 0.5),
        ThresholdTier::new("loose", 0.6),
    ]
}

fn default_mode_bonuses() -> ModeBonuses {
    ModeBonuses {
        strict: 50.0,
        recent_breakthrough: 30.0,
        loose: 20.0,
    }
}

/// Sparse overlay over a preset; any field left out keeps the base value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfigPatch {
    pub stable_days: Option<usize>,
    pub recent_days: Option<usize>,
    pub long_lookback_days: Option<usize>,
    pub min_valid_fraction: Option<f64>,

    pub min_avg_volume: Option<f64>,
    pub max_cv: Option<f64>,

    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_change_pct: Option<f64>,
    pub max_change_pct: Option<f64>,
    pub min_today_volume: Option<f64>,

    pub min_volume_ratio: Option<f64>,
    pub max_volume_ratio: Option<f64>,

    pub tiers: Option<Vec<ThresholdTier>>,
    pub novelty: Option<NoveltyRule>,

    #[serde(default)]
    pub score: ScoreConfigPatch,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreConfigPatch {
    pub stability_base: Option<f64>,
    pub stability_cv_penalty: Option<f64>,
    pub novelty_base: Option<f64>,
    pub novelty_similar_penalty: Option<f64>,
    pub novelty_peak_bonus: Option<f64>,
    pub mode_bonuses: Option<ModeBonuses>,
    pub magnitude: Option<ScoreCurve>,
    pub change: Option<ScoreCurve>,
    pub score_threshold: Option<f64>,
}

/// Layered profile: a preset name, a default patch, and per-symbol
/// overrides with case-insensitive keys.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineProfileConfig {
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub default: EngineConfigPatch,
    #[serde(default)]
    pub symbol: HashMap<String, EngineConfigPatch>,
}

impl EngineProfileConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = fs::read_to_string(path)?;
        let profile = Self::from_yaml_str(&raw)?;
        Ok(profile)
    }

    pub fn resolve_for(&self, symbol: &str) -> EngineConfig {
        let base = self
            .preset
            .as_deref()
            .and_then(EngineConfig::preset)
            .unwrap_or_default();

        let mut config = base.apply_patch(self.default.clone());
        if let Some(patch) = find_patch(&self.symbol, symbol) {
            config = config.apply_patch(patch.clone());
        }
        config
    }
}

fn normalize_key(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

fn find_patch<'a>(
    map: &'a HashMap<String, EngineConfigPatch>,
    key: &str,
) -> Option<&'a EngineConfigPatch> {
    let key_norm = normalize_key(key);
    map.iter()
        .find(|(k, _)| normalize_key(k) == key_norm)
        .map(|(_, v)| v)
}
