//! # 统一错误处理模块
//!
//! 定义 mdbatch 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 包装各格式解析库的错误类型

use thiserror::Error;

/// mdbatch 统一错误类型
#[derive(Error, Debug)]
pub enum MdBatchError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} content: {reason}")]
    ParseError { format: String, reason: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    // ─────────────────────────────────────────────────────────────
    // 转换错误
    // ─────────────────────────────────────────────────────────────
    #[error("Converter panicked: {0}")]
    Panicked(String),

    // ─────────────────────────────────────────────────────────────
    // 交互错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read input: {0}")]
    Prompt(String),
}

impl MdBatchError {
    /// 构造格式解析错误
    pub fn parse(format: &str, reason: impl std::fmt::Display) -> Self {
        MdBatchError::ParseError {
            format: format.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, MdBatchError>;
