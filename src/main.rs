//! # mdbatch - 文档批量转换为 Markdown
//!
//! 递归遍历目录，将受支持的文档逐个转换为同名 `.md` 文件。
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/          (命令行定义与交互输入)
//!   ├── commands/     (命令执行逻辑)
//!   │     ├── batch/      (文件收集、过滤与顺序执行)
//!   │     └── converters/ (各格式转换器)
//!   ├── utils/        (输出与进度条)
//!   └── error.rs      (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod converters;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
