//! # CLI 模块
//!
//! 使用 `clap` 提供 `--help` / `--version`，源目录通过交互方式输入。
//!
//! ## 依赖关系
//! - 被 `main.rs` 与 `commands/` 使用
//! - 终端下使用 `dialoguer` 提示输入，否则从标准输入读取一行

use crate::error::{MdBatchError, Result};

use clap::Parser;
use dialoguer::Input;
use std::io::BufRead;
use std::path::PathBuf;

/// mdbatch - 文档批量转换为 Markdown
#[derive(Parser)]
#[command(name = "mdbatch")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "Recursively convert documents in a folder to Markdown files",
    long_about = "Recursively convert documents in a folder to Markdown files.\n\n\
                  The source folder is entered interactively. Each supported file \
                  (docx, pdf, pptx, xlsx, xls, html, htm, msg, jpg, jpeg, png, json, \
                  xml, csv, zip) gets a sibling <name>.md file."
)]
pub struct Cli {}

/// 读取源文件夹路径
pub fn prompt_input_dir() -> Result<PathBuf> {
    let line = if console::user_attended() {
        Input::<String>::new()
            .with_prompt("Enter the source folder path")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| MdBatchError::Prompt(e.to_string()))?
    } else {
        read_line(std::io::stdin().lock())?
    };

    Ok(PathBuf::from(line.trim()))
}

/// 读取一行（EOF 时返回空串）
fn read_line<R: BufRead>(mut reader: R) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|e| MdBatchError::Prompt(e.to_string()))?;
    Ok(line)
}
