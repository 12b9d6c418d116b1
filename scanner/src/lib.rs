//! `scanner` crate 入口。
//!
//! 职责：把单标的检测引擎扩展成全市场批量扫描——预筛、任务分发、
//! 工作线程池、结果汇集与最终排序。
//!
//! 模块分工：
//! - `scan`：扫描编排器、取消令牌与扫描报告。
//! - `rank`：确定性的结果排序。

pub mod rank;
pub mod scan;

pub use rank::sort_detections;
pub use scan::{CancelToken, ScanConfig, ScanJob, ScanReport, Scanner};
