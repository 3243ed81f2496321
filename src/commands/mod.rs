//! # 命令执行模块
//!
//! 读取交互输入并执行批量转换。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/` 读取输入目录
//! - 子模块: convert

pub mod convert;

use crate::cli::{self, Cli};
use crate::error::Result;
use crate::utils::output;

/// 执行命令
pub fn run(_cli: Cli) -> Result<()> {
    output::print_header("Document to Markdown batch converter");

    let input_dir = cli::prompt_input_dir()?;
    convert::execute(&input_dir)
}
