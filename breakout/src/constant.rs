use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Classification modes that can let a surge through as a first occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakoutMode {
    Strict,
    RecentBreakthrough,
    Loose,
    FirstSurge,
}

impl BreakoutMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::RecentBreakthrough => "recent_breakthrough",
            Self::Loose => "loose",
            Self::FirstSurge => "first_surge",
        }
    }
}

/// Per-symbol rejection causes. Every stage of the pipeline has its own
/// reason so a batch run stays diagnosable symbol by symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    InsufficientHistory,
    InsufficientStableSamples,
    BaselineTooThin,
    BaselineUnstable,
    PriceOutOfRange,
    ChangeOutOfRange,
    VolumeOutOfRange,
    VolumeRatioOutOfRange,
    NotFirstOccurrence,
    ScoreBelowThreshold,
    Feed(String),
}

impl Display for RejectReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientHistory => write!(f, "insufficient bar history"),
            Self::InsufficientStableSamples => write!(f, "too few valid stable-window samples"),
            Self::BaselineTooThin => write!(f, "stable-window mean volume below minimum"),
            Self::BaselineUnstable => write!(f, "stable-window volume too volatile"),
            Self::PriceOutOfRange => write!(f, "price outside admissible range"),
            Self::ChangeOutOfRange => write!(f, "percent change outside admissible range"),
            Self::VolumeOutOfRange => write!(f, "today volume below minimum"),
            Self::VolumeRatioOutOfRange => write!(f, "volume ratio outside breakout band"),
            Self::NotFirstOccurrence => write!(f, "surge already seen in lookback"),
            Self::ScoreBelowThreshold => write!(f, "composite score below threshold"),
            Self::Feed(msg) => write!(f, "feed error: {msg}"),
        }
    }
}

/// Invalid configuration is a programmer error and fatal at startup; it is
/// never surfaced as a per-symbol rejection.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidWindow(String),
    InvalidFraction(String),
    InvalidBand(String),
    EmptyTierSet,
    UnknownTier(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidWindow(msg) => write!(f, "invalid window config: {msg}"),
            Self::InvalidFraction(msg) => write!(f, "invalid fraction: {msg}"),
            Self::InvalidBand(msg) => write!(f, "invalid band: {msg}"),
            Self::EmptyTierSet => write!(f, "threshold tier set is empty"),
            Self::UnknownTier(name) => write!(f, "mode references unknown tier: {name}"),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Const;

impl Const {
    /// Extra days requested from the feed beyond the analytical minimum, so
    /// holidays and halts do not starve the windows.
    pub const HISTORY_PADDING_DAYS: usize = 10;
}
