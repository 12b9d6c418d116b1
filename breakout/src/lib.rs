pub mod bar;
pub mod baseline;
pub mod classify;
pub mod config;
pub mod constant;
pub mod detection;
pub mod engine;
pub mod export;
pub mod logging;
pub mod score;
pub mod threshold;
pub mod window;

pub use bar::{DailyBar, Snapshot};
pub use baseline::{BaselineConfig, BaselineStats};
pub use classify::{NoveltyOutcome, NoveltyRule, SimilarDayConfig, TierModeConfig};
pub use config::{EngineConfig, EngineConfigPatch, EngineProfileConfig, ScoreConfigPatch};
pub use constant::{BreakoutMode, ConfigError, Const, RejectReason};
pub use detection::{Detection, Diagnostics, Evaluation, Rejection, TodayStats};
pub use engine::BreakoutEngine;
pub use export::detections_dataframe;
pub use logging::init_logging;
pub use score::{Band, ModeBonuses, ScoreBreakdown, ScoreConfig, ScoreCurve};
pub use threshold::{ThresholdTier, TierBreach};
pub use window::{partition, WindowSpec, Windows};
