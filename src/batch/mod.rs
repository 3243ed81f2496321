//! # 批量处理模块
//!
//! 提供统一的文件批量处理能力。
//!
//! ## 功能
//! - 递归收集文件列表（单次遍历）
//! - 按扩展名过滤
//! - 顺序处理，单文件错误隔离
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 使用
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod filter;
pub mod runner;

pub use collector::FileCollector;
pub use runner::{BatchResult, BatchRunner};
