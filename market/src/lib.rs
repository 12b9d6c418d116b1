//! `market` crate 入口。
//!
//! 职责：为放量检测提供统一的数据接入层——日线历史、当日快照、
//! 重试包装与 CSV 仓库。该文件只做模块装配与统一导出。
//!
//! 模块分工：
//! - `error`：`FeedError` 错误分类。
//! - `provider`：`BarProvider` / `SnapshotProvider` 抽象、重试包装与内存实现。
//! - `history`：目录式 CSV 日线仓库。

pub mod error;
pub mod history;
pub mod provider;

pub use error::FeedError;
pub use history::CsvBarStore;
pub use provider::{BarProvider, MemoryProvider, RetryPolicy, RetryingProvider, SnapshotProvider};
